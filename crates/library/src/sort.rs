//! The sort engine: the last stage of a pass.

use crate::context::RankingSource;
use crate::error::{ErrorKind, Result};
use crate::models::{Category, LibraryItem, LibraryMap, LibrarySort, SortMode};
use exn::{OptionExt, ResultExt};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::instrument;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Manga ID → position in a ranking query.
type Ranks = HashMap<u64, usize>;

/// Sort every category's items by that category's own sort setting.
///
/// Ranking queries (read history, latest chapters, fetch dates) are only
/// made if some category with items actually sorts by them, and then only
/// once: every category in this pass shares the same answer.
///
/// # Errors
/// - [`ErrorKind::InvalidSortMode`] if any category's flags are invalid.
/// - [`ErrorKind::UnknownCategory`] if the map has a category that isn't in
///   `categories`.
/// - [`ErrorKind::Lookup`] if a ranking query fails.
#[instrument(level = "trace", skip_all, fields(categories = categories.len()))]
pub fn apply(categories: &[Category], map: LibraryMap, rankings: &dyn RankingSource) -> Result<LibraryMap> {
    let sorts = categories
        .iter()
        .map(|category| Ok((category.id, category.sort()?)))
        .collect::<Result<HashMap<_, _>>>()?;
    let rankings = LazyRankings::new(rankings);
    map.into_iter()
        .map(|(category, mut items)| {
            let sort = sorts.get(&category).copied().ok_or_raise(|| ErrorKind::UnknownCategory(category))?;
            sort_items(&mut items, sort, &rankings)?;
            Ok((category, items))
        })
        .collect()
}

/// Stable-sort one category's items.
fn sort_items(items: &mut [LibraryItem], sort: LibrarySort, rankings: &LazyRankings<'_>) -> Result<()> {
    if items.len() < 2 {
        return Ok(());
    }
    let ranks = match sort.mode {
        SortMode::LastRead => Some((rankings.last_read()?, 0)),
        SortMode::LatestChapter => {
            let ranks = rankings.latest_chapter()?;
            // Manga without any ranked chapter go after every ranked one.
            Some((ranks, ranks.len()))
        },
        SortMode::ChapterFetchDate => Some((rankings.chapter_fetch_date()?, 0)),
        _ => None,
    };
    match (sort.mode, ranks) {
        (SortMode::Alphabetical, _) => {
            let keys: HashMap<u64, String> =
                items.iter().map(|item| (item.manga_id(), collation_key(item.title()))).collect();
            items.sort_by(|a, b| sort.direction.apply(keys[&a.manga_id()].cmp(&keys[&b.manga_id()])));
        },
        (_, Some((ranks, missing))) => {
            let rank = |item: &LibraryItem| ranks.get(&item.manga_id()).copied().unwrap_or(missing);
            items.sort_by(|a, b| sort.direction.apply(rank(a).cmp(&rank(b))));
        },
        (SortMode::UnreadCount, None) => {
            items.sort_by(|a, b| sort.direction.apply(compare_unread(a, b, sort)));
        },
        (mode, None) => {
            items.sort_by(|a, b| sort.direction.apply(compare_fields(a, b, mode)));
        },
    }
    Ok(())
}

/// Unread counts, except that manga with nothing left to read always come
/// last: the result is pre-inverted for descending sorts, so reversing it
/// keeps zeroes at the end.
fn compare_unread(a: &LibraryItem, b: &LibraryItem, sort: LibrarySort) -> Ordering {
    let (a, b) = (a.entry.unread_count, b.entry.unread_count);
    let zero_last = if sort.direction.is_ascending() { Ordering::Greater } else { Ordering::Less };
    match (a, b) {
        _ if a == b => Ordering::Equal,
        (0, _) => zero_last,
        (_, 0) => zero_last.reverse(),
        _ => a.cmp(&b),
    }
}

fn compare_fields(a: &LibraryItem, b: &LibraryItem, mode: SortMode) -> Ordering {
    let (a, b) = (&a.entry, &b.entry);
    match mode {
        SortMode::LastUpdate => a.last_update.cmp(&b.last_update),
        SortMode::TotalChapters => a.total_chapters.cmp(&b.total_chapters),
        SortMode::DateAdded => a.date_added.cmp(&b.date_added),
        // Handled by the caller.
        SortMode::Alphabetical
        | SortMode::UnreadCount
        | SortMode::LastRead
        | SortMode::LatestChapter
        | SortMode::ChapterFetchDate => Ordering::Equal,
    }
}

/// A primary-strength collation key: compatibility-decomposed, stripped of
/// combining marks (accents) and lower-cased, so that "Éclair", "eclair"
/// and "ECLAIR" compare equal.
pub fn collation_key(title: &str) -> String {
    title.nfkd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Ranking queries, made on first use and kept for the rest of the pass.
struct LazyRankings<'a> {
    source: &'a dyn RankingSource,
    last_read: OnceCell<Ranks>,
    latest_chapter: OnceCell<Ranks>,
    chapter_fetch_date: OnceCell<Ranks>,
}
impl<'a> LazyRankings<'a> {
    fn new(source: &'a dyn RankingSource) -> Self {
        Self {
            source,
            last_read: OnceCell::new(),
            latest_chapter: OnceCell::new(),
            chapter_fetch_date: OnceCell::new(),
        }
    }

    fn last_read(&self) -> Result<&Ranks> {
        Self::get_or_query(&self.last_read, || self.source.last_read())
    }

    fn latest_chapter(&self) -> Result<&Ranks> {
        Self::get_or_query(&self.latest_chapter, || self.source.latest_chapter())
    }

    fn chapter_fetch_date(&self) -> Result<&Ranks> {
        Self::get_or_query(&self.chapter_fetch_date, || self.source.chapter_fetch_date())
    }

    fn get_or_query(cell: &OnceCell<Ranks>, query: impl FnOnce() -> Result<Vec<u64>>) -> Result<&Ranks> {
        if let Some(ranks) = cell.get() {
            return Ok(ranks);
        }
        let ids = query().or_raise(|| ErrorKind::Lookup)?;
        // First occurrence wins if a query returns a manga more than once.
        let mut ranks = Ranks::with_capacity(ids.len());
        for (rank, id) in ids.into_iter().enumerate() {
            ranks.entry(id).or_insert(rank);
        }
        Ok(cell.get_or_init(|| ranks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCollaborators, entry, ids, items};
    use crate::models::{LibraryEntry, SortDirection};
    use rstest::rstest;
    use std::ops::Deref;

    fn category(id: u64, mode: SortMode, direction: SortDirection) -> Category {
        Category::new(id, format!("Category {id}")).with_sort(LibrarySort::new(mode, direction))
    }

    fn titles(map: &LibraryMap, category: u64) -> Vec<&str> {
        map[&category].iter().map(LibraryItem::title).collect()
    }

    #[rstest]
    #[case(SortDirection::Ascending, vec!["apple", "Banana", "cherry"])]
    #[case(SortDirection::Descending, vec!["cherry", "Banana", "apple"])]
    fn test_alphabetical_ignores_case(#[case] direction: SortDirection, #[case] expected: Vec<&str>) {
        let map = items([entry(1, 1, "Banana"), entry(2, 1, "cherry"), entry(3, 1, "apple")]);
        let categories = [category(1, SortMode::Alphabetical, direction)];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(titles(&sorted, 1), expected);
    }

    #[test]
    fn test_alphabetical_ignores_accents() {
        let map = items([entry(1, 1, "Ezra"), entry(2, 1, "Éclair"), entry(3, 1, "eden")]);
        let categories = [category(1, SortMode::Alphabetical, SortDirection::Ascending)];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(titles(&sorted, 1), vec!["Éclair", "eden", "Ezra"]);
    }

    #[rstest]
    #[case("Éclair", "eclair")]
    #[case("ÅNGSTRÖM", "angstrom")]
    #[case("Ｆｕｌｌｗｉｄｔｈ", "fullwidth")]
    #[case("plain", "plain")]
    fn test_collation_key(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(collation_key(title), expected);
    }

    #[rstest]
    #[case(SortDirection::Ascending, vec![1, 3, 2, 4])]
    #[case(SortDirection::Descending, vec![2, 3, 1, 4])]
    fn test_unread_zero_always_last(#[case] direction: SortDirection, #[case] expected: Vec<u64>) {
        let map = items([
            LibraryEntry { unread_count: 1, ..entry(1, 1, "One") },
            LibraryEntry { unread_count: 9, ..entry(2, 1, "Nine") },
            LibraryEntry { unread_count: 4, ..entry(3, 1, "Four") },
            LibraryEntry { unread_count: 0, ..entry(4, 1, "Zero") },
        ]);
        let categories = [category(1, SortMode::UnreadCount, direction)];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(ids(&sorted, 1), expected);
    }

    #[rstest]
    #[case(SortMode::LastUpdate, vec![2, 3, 1])]
    #[case(SortMode::TotalChapters, vec![3, 1, 2])]
    #[case(SortMode::DateAdded, vec![1, 2, 3])]
    fn test_numeric_fields(#[case] mode: SortMode, #[case] expected: Vec<u64>) {
        let map = items([
            LibraryEntry { last_update: 300, total_chapters: 20, date_added: 1, ..entry(1, 1, "A") },
            LibraryEntry { last_update: 100, total_chapters: 30, date_added: 2, ..entry(2, 1, "B") },
            LibraryEntry { last_update: 200, total_chapters: 10, date_added: 3, ..entry(3, 1, "C") },
        ]);
        let categories = [category(1, mode, SortDirection::Ascending)];
        let sorted = apply(&categories, map.clone(), &MockCollaborators::default()).unwrap();
        assert_eq!(ids(&sorted, 1), expected);
        // Descending is the exact reverse (no ties here).
        let categories = [category(1, mode, SortDirection::Descending)];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(ids(&sorted, 1), expected.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let map = items([entry(1, 1, "Same"), entry(2, 1, "same"), entry(3, 1, "SAME")]);
        let categories = [category(1, SortMode::Alphabetical, SortDirection::Descending)];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(ids(&sorted, 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_ranked_modes_use_default_ranks() {
        let rankings = MockCollaborators {
            last_read: vec![3, 1],
            latest_chapter: vec![3, 1],
            chapter_fetch_date: vec![3, 1],
            ..Default::default()
        };
        let map = items([entry(1, 1, "A"), entry(2, 1, "B"), entry(3, 1, "C")]);
        // Missing from the last-read ranking: rank 0, tied with the most recent.
        let categories = [category(1, SortMode::LastRead, SortDirection::Ascending)];
        assert_eq!(ids(&apply(&categories, map.clone(), &rankings).unwrap(), 1), vec![2, 3, 1]);
        // Missing from the latest-chapter ranking: after every ranked manga.
        let categories = [category(1, SortMode::LatestChapter, SortDirection::Ascending)];
        assert_eq!(ids(&apply(&categories, map.clone(), &rankings).unwrap(), 1), vec![3, 1, 2]);
        let categories = [category(1, SortMode::ChapterFetchDate, SortDirection::Descending)];
        assert_eq!(ids(&apply(&categories, map, &rankings).unwrap(), 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_rankings_are_queried_once_per_pass() {
        let rankings = MockCollaborators { last_read: vec![2, 1, 4, 3], ..Default::default() };
        let map = items([entry(1, 1, "A"), entry(2, 1, "B"), entry(3, 2, "C"), entry(4, 2, "D")]);
        let categories = [
            category(1, SortMode::LastRead, SortDirection::Ascending),
            category(2, SortMode::LastRead, SortDirection::Descending),
        ];
        let sorted = apply(&categories, map, &rankings).unwrap();
        assert_eq!(ids(&sorted, 1), vec![2, 1]);
        assert_eq!(ids(&sorted, 2), vec![3, 4]);
        assert_eq!(rankings.lookups(), 1);
    }

    #[test]
    fn test_rankings_not_queried_when_unused() {
        let rankings = MockCollaborators::default();
        let map = items([entry(1, 1, "A"), entry(2, 1, "B"), entry(3, 2, "C")]);
        let categories = [
            category(1, SortMode::Alphabetical, SortDirection::Ascending),
            // Ranked, but a single item never needs comparing.
            category(2, SortMode::LatestChapter, SortDirection::Ascending),
        ];
        apply(&categories, map, &rankings).unwrap();
        assert_eq!(rankings.lookups(), 0);
    }

    #[test]
    fn test_failed_lookup() {
        let rankings = MockCollaborators { fail_rankings: true, ..Default::default() };
        let map = items([entry(1, 1, "A"), entry(2, 1, "B")]);
        let categories = [category(1, SortMode::ChapterFetchDate, SortDirection::Ascending)];
        let err = apply(&categories, map, &rankings).unwrap_err();
        assert_eq!(err.deref(), &ErrorKind::Lookup);
    }

    #[test]
    fn test_invalid_sort_mode_is_fatal() {
        let broken = Category { flags: 0b0010_0000, ..Category::new(2, "Broken") };
        let map = items([entry(1, 1, "A")]);
        let categories = [category(1, SortMode::Alphabetical, SortDirection::Ascending), broken];
        let err = apply(&categories, map, &MockCollaborators::default()).unwrap_err();
        assert_eq!(err.deref(), &ErrorKind::InvalidSortMode(0b0010_0000));
    }

    #[test]
    fn test_each_category_uses_its_own_sort() {
        let map = items([
            LibraryEntry { unread_count: 5, ..entry(1, 1, "Zeta") },
            LibraryEntry { unread_count: 0, ..entry(2, 1, "Alpha") },
            LibraryEntry { unread_count: 0, ..entry(3, 2, "Zeta") },
            LibraryEntry { unread_count: 5, ..entry(4, 2, "Alpha") },
        ]);
        let categories = [
            category(1, SortMode::Alphabetical, SortDirection::Ascending),
            category(2, SortMode::UnreadCount, SortDirection::Ascending),
        ];
        let sorted = apply(&categories, map, &MockCollaborators::default()).unwrap();
        assert_eq!(titles(&sorted, 1), vec!["Alpha", "Zeta"]);
        assert_eq!(titles(&sorted, 2), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_switching_to_unread_count_pushes_zero_last() {
        let map = items([
            LibraryEntry { unread_count: 5, ..entry(1, 1, "Zeta") },
            LibraryEntry { unread_count: 0, ..entry(2, 1, "Alpha") },
        ]);
        let completed = Category::new(2, "Completed");
        let rankings = MockCollaborators::default();

        let categories = [category(1, SortMode::Alphabetical, SortDirection::Ascending), completed.clone()];
        let sorted = apply(&categories, map, &rankings).unwrap();
        assert_eq!(titles(&sorted, 1), vec!["Alpha", "Zeta"]);

        let categories = [category(1, SortMode::UnreadCount, SortDirection::Ascending), completed];
        let sorted = apply(&categories, sorted, &rankings).unwrap();
        assert_eq!(titles(&sorted, 1), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_unlisted_category_in_map() {
        let map = items([entry(1, 4, "A")]);
        let categories = [category(1, SortMode::Alphabetical, SortDirection::Ascending)];
        let err = apply(&categories, map, &MockCollaborators::default()).unwrap_err();
        assert_eq!(err.deref(), &ErrorKind::UnknownCategory(4));
    }
}
