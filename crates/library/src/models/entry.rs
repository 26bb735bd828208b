use serde::{Deserialize, Serialize};

/// Publication status reported by a manga's source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    #[default]
    Unknown,
    Ongoing,
    Completed,
    Licensed,
    PublishingFinished,
    Cancelled,
    OnHiatus,
}

/// One manga as stored in the library, in one category.
///
/// Owned by the persistence layer; the pipeline never modifies it. A manga
/// in several categories appears as several entries, one per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub manga_id: u64,
    /// `0` for uncategorised entries (the system category).
    #[serde(default)]
    pub category: u64,
    pub title: String,
    #[serde(default = "default_favorite")]
    pub favorite: bool,
    #[serde(default)]
    pub status: MangaStatus,
    #[serde(default)]
    pub source: u64,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub last_update: i64,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub date_added: i64,
    #[serde(default)]
    pub total_chapters: u64,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub has_started: bool,
}
fn default_favorite() -> bool {
    true
}
impl LibraryEntry {
    /// An uncategorised, unread, favourite entry with every counter at zero.
    pub fn new(manga_id: u64, title: impl Into<String>) -> Self {
        Self {
            manga_id,
            category: 0,
            title: title.into(),
            favorite: true,
            status: MangaStatus::Unknown,
            source: 0,
            last_update: 0,
            date_added: 0,
            total_chapters: 0,
            unread_count: 0,
            has_started: false,
        }
    }

    pub fn in_category(mut self, category: u64) -> Self {
        self.category = category;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == MangaStatus::Completed
    }
}
