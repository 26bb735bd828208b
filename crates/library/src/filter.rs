//! The filter engine: the second stage of a pass.
//!
//! An item survives when it satisfies *every* configured filter:
//!
//! | Filter     | Property tested                                        |
//! |------------|--------------------------------------------------------|
//! | downloaded | local manga, or at least one downloaded chapter        |
//! | unread     | at least one unread chapter                            |
//! | started    | at least one chapter read                              |
//! | completed  | publication status is "completed"                      |
//! | tracking   | see [`Filter::matches_tracking`]                       |
//!
//! Each filter is a [`TriState`]; the global "downloaded only" mode forces
//! the downloaded filter to [`TriState::Include`].

use crate::Context;
use crate::models::{LibraryItem, LibraryMap, TrackPresence};
use shelf_config::{Preferences, TriState};
use std::collections::HashMap;
use tracing::instrument;

/// Filter settings resolved against the set of logged-in tracking services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    downloaded: TriState,
    unread: TriState,
    started: TriState,
    completed: TriState,
    any_logged_in: bool,
    excluded_services: Vec<u64>,
    included_services: Vec<u64>,
}
impl Filter {
    pub fn new(prefs: &Preferences, logged_in: &[u64]) -> Self {
        let filters = &prefs.filters;
        let (mut excluded_services, mut included_services) = (Vec::new(), Vec::new());
        for &service in logged_in {
            match filters.tracking(service) {
                TriState::Exclude => excluded_services.push(service),
                TriState::Include => included_services.push(service),
                TriState::Ignore => (),
            }
        }
        Self {
            downloaded: if prefs.downloaded_only { TriState::Include } else { filters.downloaded },
            unread: filters.unread,
            started: filters.started,
            completed: filters.completed,
            any_logged_in: !logged_in.is_empty(),
            excluded_services,
            included_services,
        }
    }

    /// Keep only the items that pass every filter.
    ///
    /// Categories are never removed, even when they end up empty, and the
    /// relative order of surviving items is preserved.
    #[instrument(level = "trace", skip_all)]
    pub fn apply(&self, map: LibraryMap, presence: &TrackPresence, ctx: &Context) -> LibraryMap {
        map.into_iter()
            .map(|(category, items)| {
                let items = items.into_iter().filter(|item| self.matches(item, presence, ctx)).collect();
                (category, items)
            })
            .collect()
    }

    pub fn matches(&self, item: &LibraryItem, presence: &TrackPresence, ctx: &Context) -> bool {
        let entry = &item.entry;
        // Cheapest checks first; the downloaded check may hit the filesystem.
        self.unread.matches(|| entry.unread_count > 0)
            && self.started.matches(|| entry.has_started)
            && self.completed.matches(|| entry.is_completed())
            && self.matches_tracking(presence.get(&entry.manga_id))
            && self.downloaded.matches(|| ctx.is_downloaded(entry))
    }

    /// The tracking filter, aggregated over every logged-in service.
    ///
    /// Services configured as [`TriState::Ignore`] play no part. With only
    /// excluding services, an item passes when none of them track it; with
    /// only including services, when at least one does. With both, an item
    /// must be tracked by an including service *and* by no excluding one.
    pub fn matches_tracking(&self, tracks: Option<&HashMap<u64, bool>>) -> bool {
        if !self.any_logged_in {
            return true;
        }
        let tracked_by = |service: &u64| tracks.and_then(|t| t.get(service)).copied().unwrap_or(false);
        let excluded = || self.excluded_services.iter().any(tracked_by);
        let included = || self.included_services.iter().any(tracked_by);
        match (self.excluded_services.is_empty(), self.included_services.is_empty()) {
            (true, true) => true,
            (false, true) => !excluded(),
            (true, false) => included(),
            (false, false) => !excluded() && included(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCollaborators, entry, ids, items};
    use crate::models::{LibraryEntry, MangaStatus};
    use crate::tracks::{TrackRecord, presence};
    use rstest::rstest;
    use std::sync::Arc;

    const SERVICE_A: u64 = 1;
    const SERVICE_B: u64 = 2;

    fn context() -> Context {
        Context::new(Arc::new(MockCollaborators {
            downloads: HashMap::from([(1, 2)]),
            local: [2].into(),
            ..Default::default()
        }))
    }

    /// 1: downloaded, unread, started.
    /// 2: local, completed.
    /// 3: neither downloaded nor local, started, completed.
    fn library() -> LibraryMap {
        items([
            LibraryEntry { unread_count: 5, has_started: true, ..entry(1, 1, "One") },
            LibraryEntry { status: MangaStatus::Completed, ..entry(2, 1, "Two") },
            LibraryEntry {
                has_started: true,
                status: MangaStatus::Completed,
                ..entry(3, 1, "Three")
            },
        ])
    }

    #[test]
    fn test_everything_ignored_is_identity() {
        let map = library();
        let filtered = Filter::new(&Preferences::default(), &[]).apply(map.clone(), &TrackPresence::new(), &context());
        assert_eq!(filtered, map);
    }

    #[rstest]
    #[case::downloaded_include(|p: &mut Preferences| p.filters.downloaded = TriState::Include, vec![1, 2])]
    #[case::downloaded_exclude(|p: &mut Preferences| p.filters.downloaded = TriState::Exclude, vec![3])]
    #[case::unread_include(|p: &mut Preferences| p.filters.unread = TriState::Include, vec![1])]
    #[case::unread_exclude(|p: &mut Preferences| p.filters.unread = TriState::Exclude, vec![2, 3])]
    #[case::started_include(|p: &mut Preferences| p.filters.started = TriState::Include, vec![1, 3])]
    #[case::started_exclude(|p: &mut Preferences| p.filters.started = TriState::Exclude, vec![2])]
    #[case::completed_include(|p: &mut Preferences| p.filters.completed = TriState::Include, vec![2, 3])]
    #[case::completed_exclude(|p: &mut Preferences| p.filters.completed = TriState::Exclude, vec![1])]
    #[case::conjunction(
        |p: &mut Preferences| {
            p.filters.completed = TriState::Include;
            p.filters.started = TriState::Include;
        },
        vec![3]
    )]
    fn test_single_filters(#[case] configure: fn(&mut Preferences), #[case] expected: Vec<u64>) {
        let mut prefs = Preferences::default();
        configure(&mut prefs);
        let filtered = Filter::new(&prefs, &[]).apply(library(), &TrackPresence::new(), &context());
        assert_eq!(ids(&filtered, 1), expected);
    }

    #[rstest]
    #[case(TriState::Ignore)]
    #[case(TriState::Include)]
    #[case(TriState::Exclude)]
    fn test_downloaded_only_overrides_downloaded_filter(#[case] downloaded: TriState) {
        let mut prefs = Preferences { downloaded_only: true, ..Default::default() };
        prefs.filters.downloaded = downloaded;
        let filtered = Filter::new(&prefs, &[]).apply(library(), &TrackPresence::new(), &context());
        assert_eq!(ids(&filtered, 1), vec![1, 2]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut prefs = Preferences::default();
        prefs.filters.unread = TriState::Exclude;
        prefs.filters.downloaded = TriState::Include;
        let filter = Filter::new(&prefs, &[]);
        let once = filter.apply(library(), &TrackPresence::new(), &context());
        let twice = filter.apply(once.clone(), &TrackPresence::new(), &context());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_categories_are_kept() {
        let mut prefs = Preferences::default();
        prefs.filters.unread = TriState::Include;
        prefs.filters.completed = TriState::Include;
        let filtered = Filter::new(&prefs, &[]).apply(library(), &TrackPresence::new(), &context());
        assert_eq!(filtered.get(&1), Some(&vec![]));
    }

    /// Manga 1 tracked by A only, 2 by B only, 3 by neither, 4 by both.
    fn tracked() -> (LibraryMap, TrackPresence) {
        let map = items([entry(1, 1, "M1"), entry(2, 1, "M2"), entry(3, 1, "M3"), entry(4, 1, "M4")]);
        let records = [
            TrackRecord { manga_id: 1, service_id: SERVICE_A },
            TrackRecord { manga_id: 2, service_id: SERVICE_B },
            TrackRecord { manga_id: 4, service_id: SERVICE_A },
            TrackRecord { manga_id: 4, service_id: SERVICE_B },
        ];
        (map, presence(&records, &[SERVICE_A, SERVICE_B]))
    }

    #[rstest]
    #[case::both_ignored(TriState::Ignore, TriState::Ignore, vec![1, 2, 3, 4])]
    #[case::exclude_and_include(TriState::Exclude, TriState::Include, vec![2])]
    #[case::only_exclude(TriState::Exclude, TriState::Ignore, vec![2, 3])]
    #[case::only_include(TriState::Ignore, TriState::Include, vec![2, 4])]
    #[case::both_include(TriState::Include, TriState::Include, vec![1, 2, 4])]
    #[case::both_exclude(TriState::Exclude, TriState::Exclude, vec![3])]
    fn test_tracking_filter(#[case] a: TriState, #[case] b: TriState, #[case] expected: Vec<u64>) {
        let (map, presence) = tracked();
        let mut prefs = Preferences::default();
        prefs.filters.set_tracking(SERVICE_A, a);
        prefs.filters.set_tracking(SERVICE_B, b);
        let filtered = Filter::new(&prefs, &[SERVICE_A, SERVICE_B]).apply(map, &presence, &context());
        assert_eq!(ids(&filtered, 1), expected);
    }

    #[test]
    fn test_tracking_filter_needs_a_login() {
        let (map, _) = tracked();
        let mut prefs = Preferences::default();
        prefs.filters.set_tracking(SERVICE_A, TriState::Include);
        // Nobody logged in: presence is empty and the filter is skipped.
        let filtered = Filter::new(&prefs, &[]).apply(map.clone(), &TrackPresence::new(), &context());
        assert_eq!(filtered, map);
    }

    #[test]
    fn test_tracking_filter_ignores_logged_out_services() {
        let (map, presence) = tracked();
        let mut prefs = Preferences::default();
        prefs.filters.set_tracking(SERVICE_A, TriState::Exclude);
        prefs.filters.set_tracking(SERVICE_B, TriState::Include);
        // Only B is logged in, so A's exclusion has no effect.
        let filtered = Filter::new(&prefs, &[SERVICE_B]).apply(map, &presence, &context());
        assert_eq!(ids(&filtered, 1), vec![2, 4]);
    }
}
