//! Category list shaping and initial grouping of entries.

use crate::models::{Category, LibraryEntry, LibraryItem, LibraryMap};
use std::sync::Arc;
use tracing::instrument;

/// The category list, ordered by [`Category::order`], with the system
/// category added when some entry is uncategorised and the list doesn't
/// already contain it. Categories with equal order keep their input order.
pub fn with_system_category(categories: &[Category], entries: &[Arc<LibraryEntry>]) -> Vec<Category> {
    let mut categories = categories.to_vec();
    let uncategorised = entries.iter().any(|entry| entry.category == crate::models::SYSTEM_CATEGORY);
    if uncategorised && !categories.iter().any(Category::is_system) {
        categories.insert(0, Category::system());
    }
    categories.sort_by_key(|category| category.order);
    categories
}

/// Group entries by category into fresh, badge-less items.
///
/// Every category in `categories` gets a key, even if it ends up empty. Each
/// item inherits its category's display mode.
///
/// Entries and categories arrive on separate feeds, so an entry can name a
/// category the list doesn't have yet (or any more). Such entries are left
/// out until the two agree again.
#[instrument(level = "trace", skip_all, fields(entries = entries.len(), categories = categories.len()))]
pub fn group_entries(entries: &[Arc<LibraryEntry>], categories: &[Category]) -> LibraryMap {
    let mut map: LibraryMap = categories.iter().map(|category| (category.id, Vec::new())).collect();
    for entry in entries {
        let Some(category) = categories.iter().find(|c| c.id == entry.category) else {
            tracing::debug!(manga = entry.manga_id, category = entry.category, "skipping entry in unlisted category");
            continue;
        };
        map.entry(category.id)
            .or_default()
            .push(LibraryItem::new(Arc::clone(entry), category.display_mode()));
    }
    map
}

/// The categories a library screen should show.
///
/// System categories are hidden when the library has entries but none of
/// them are uncategorised; an empty library still shows the system
/// category so there is something to land on.
pub fn visible_categories(categories: Vec<Category>, map: &LibraryMap) -> Vec<Category> {
    let library_is_empty = map.values().all(Vec::is_empty);
    let has_uncategorised = map.get(&crate::models::SYSTEM_CATEGORY).is_some_and(|items| !items.is_empty());
    if library_is_empty || has_uncategorised {
        return categories;
    }
    categories.into_iter().filter(|category| !category.is_system()).collect()
}
