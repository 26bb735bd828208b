//! External collaborators of the pipeline.
//!
//! The pipeline only decides *when* to ask these questions and *where* the
//! answers go; answering them (scanning the download directory, resolving a
//! source's language, querying read history) is somebody else's job.
//!
//! Lookups are synchronous. The pipeline calls them from a blocking task, so
//! implementations are free to hit a database or the filesystem directly.

use crate::error::Result;
use crate::models::LibraryEntry;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

pub trait DownloadCounter: Send + Sync {
    /// Number of chapters of this manga downloaded to the device.
    fn download_count(&self, entry: &LibraryEntry) -> u64;
}

pub trait MangaClassifier: Send + Sync {
    /// Whether the manga comes from the local (on-device) source.
    fn is_local(&self, entry: &LibraryEntry) -> bool;
}

pub trait SourceRegistry: Send + Sync {
    /// Language code of a source, `None` if the source isn't installed.
    fn language(&self, source: u64) -> Option<String>;
}

pub trait TrackerRegistry: Send + Sync {
    /// IDs of the tracking services the user is currently logged in to.
    fn logged_in(&self) -> Vec<u64>;
}

/// Ranking queries used by the history-dependent sort modes.
///
/// Each query returns manga IDs in rank order; a manga's rank is its
/// position in the list. Manga missing from a list get that sort mode's
/// default rank.
pub trait RankingSource: Send + Sync {
    /// Most recently read first.
    fn last_read(&self) -> Result<Vec<u64>>;
    /// Ordered by the upload date of each manga's newest chapter.
    fn latest_chapter(&self) -> Result<Vec<u64>>;
    /// Ordered by when each manga's newest chapter was fetched.
    fn chapter_fetch_date(&self) -> Result<Vec<u64>>;
}

/// Handles to every collaborator the pipeline consults during a pass.
///
/// Cheap to clone: every field is reference-counted.
#[derive(Clone)]
pub struct Context {
    pub downloads: Arc<dyn DownloadCounter>,
    pub classifier: Arc<dyn MangaClassifier>,
    pub registry: Arc<dyn SourceRegistry>,
    pub trackers: Arc<dyn TrackerRegistry>,
    pub rankings: Arc<dyn RankingSource>,
}
impl Context {
    /// Build a context where one value answers every kind of lookup.
    pub fn new<T>(shared: Arc<T>) -> Self
    where
        T: DownloadCounter + MangaClassifier + SourceRegistry + TrackerRegistry + RankingSource + 'static,
    {
        Self {
            downloads: shared.clone(),
            classifier: shared.clone(),
            registry: shared.clone(),
            trackers: shared.clone(),
            rankings: shared,
        }
    }

    /// "Downloaded" as far as filters are concerned: a local manga, or one
    /// with at least one downloaded chapter.
    pub fn is_downloaded(&self, entry: &LibraryEntry) -> bool {
        self.classifier.is_local(entry) || self.downloads.download_count(entry) > 0
    }
}
impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
