use crate::models::{DisplayMode, LibraryEntry};
use std::sync::Arc;

/// Sentinel stored in a count badge that has been switched off.
pub const BADGE_DISABLED: i64 = -1;

/// A [`LibraryEntry`] plus the badges computed for it during one pass.
///
/// Disabled badges hold a sentinel rather than being absent, so renderers
/// never need to branch on configuration: `-1` for counts, `false` for the
/// local flag and an empty string for the language.
///
/// Items are values: every pass builds its own from the upstream snapshot,
/// and nothing carries over between passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    pub entry: Arc<LibraryEntry>,
    pub download_count: i64,
    /// Badge value; independent of the entry's own
    /// [`unread_count`](LibraryEntry::unread_count), which filters and sorts use.
    pub unread_count: i64,
    pub is_local: bool,
    pub source_language: String,
    /// Inherited from the item's category.
    pub display_mode: DisplayMode,
}
impl LibraryItem {
    /// A new item with every badge disabled.
    pub fn new(entry: Arc<LibraryEntry>, display_mode: DisplayMode) -> Self {
        Self {
            entry,
            download_count: BADGE_DISABLED,
            unread_count: BADGE_DISABLED,
            is_local: false,
            source_language: String::new(),
            display_mode,
        }
    }

    pub fn manga_id(&self) -> u64 {
        self.entry.manga_id
    }

    pub fn category(&self) -> u64 {
        self.entry.category
    }

    pub fn title(&self) -> &str {
        &self.entry.title
    }
}
