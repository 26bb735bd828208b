use crate::models::{Category, LibraryItem, LibraryMap};

/// The published result of one pass: the categories to show, in order, and
/// their (filtered, sorted) items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    pub categories: Vec<Category>,
    pub items: LibraryMap,
}
impl Library {
    /// Items for a category; empty for categories with nothing in them (or
    /// that don't exist).
    pub fn items(&self, category: u64) -> &[LibraryItem] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// The category shown on the given page (tab index).
    pub fn category(&self, page: usize) -> Option<&Category> {
        self.categories.get(page)
    }

    pub fn titles(&self, category: u64) -> Vec<&str> {
        self.items(category).iter().map(LibraryItem::title).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(Vec::is_empty)
    }
}
