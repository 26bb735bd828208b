//! Small presentation values derived from a published [`Library`].

use crate::models::{Library, LibraryMap};
use shelf_config::DisplayPreferences;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Number of items per category.
pub fn category_counts(map: &LibraryMap) -> BTreeMap<u64, usize> {
    map.iter().map(|(category, items)| (*category, items.len())).collect()
}

/// Text for the library screen's toolbar, with an optional item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarTitle {
    pub text: String,
    pub count: Option<usize>,
}
impl Display for ToolbarTitle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.count {
            Some(count) => write!(f, "{} ({count})", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// The toolbar title for the given page.
///
/// With category tabs shown, the tabs already name the category, so the
/// toolbar shows `default_title` and counts every distinct manga in the
/// library. Without tabs it names the current category (the system category
/// is shown as `default_category_title`) and counts only its items.
///
/// Counts are only included when `manga_count` is enabled. A page with no
/// category falls back to `default_title` without a count.
pub fn toolbar_title(
    library: &Library,
    page: usize,
    display: &DisplayPreferences,
    default_title: &str,
    default_category_title: &str,
) -> ToolbarTitle {
    let Some(category) = library.category(page) else {
        return ToolbarTitle { text: default_title.to_string(), count: None };
    };
    let (text, count) = if display.category_tabs {
        let distinct: HashSet<u64> = library.items.values().flatten().map(|item| item.manga_id()).collect();
        (default_title, distinct.len())
    } else if category.is_system() {
        (default_category_title, library.items(category.id).len())
    } else {
        (category.name.as_str(), library.items(category.id).len())
    };
    ToolbarTitle {
        text: text.to_string(),
        count: display.manga_count.then_some(count),
    }
}
