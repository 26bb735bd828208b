//! Library snapshots stored as JSON files.
//!
//! A snapshot holds everything a pass needs: the library feeds (entries,
//! categories, tracks) and the answers to every collaborator lookup. The
//! [`SnapshotSource`] serves the newest snapshot both as a
//! [`LibraryFeed`] and as the pipeline's [`Context`](shelf_library::Context).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use shelf_asyncutils::Observable;
use shelf_library::context::{DownloadCounter, MangaClassifier, RankingSource, SourceRegistry, TrackerRegistry};
use shelf_library::error::Result as LibraryResult;
use shelf_library::models::{Category, LibraryEntry};
use shelf_library::pipeline::{FeedStream, LibraryFeed};
use shelf_library::tracks::TrackRecord;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::instrument;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub entries: Vec<LibraryEntry>,
    pub categories: Vec<Category>,
    pub tracks: Vec<TrackRecord>,
    /// Tracking services the user is logged in to.
    pub logged_in: Vec<u64>,
    /// Manga ID → downloaded chapters.
    pub downloads: HashMap<u64, u64>,
    /// Manga IDs from the local source.
    pub local: HashSet<u64>,
    /// Source ID → language code.
    pub languages: HashMap<u64, String>,
    /// Manga IDs, most recently read first.
    pub last_read: Vec<u64>,
    pub latest_chapter: Vec<u64>,
    pub chapter_fetch_date: Vec<u64>,
}
impl Snapshot {
    pub fn parse(json: &[u8], path: &Path) -> Result<Self> {
        serde_json::from_slice(json).or_raise(|| ErrorKind::Parse(path.to_path_buf()))
    }

    #[instrument(level = "debug")]
    pub async fn read(path: &Path) -> Result<Self> {
        let json = tokio::fs::read(path).await.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
        Self::parse(&json, path)
    }
}

/// Serves the newest [`Snapshot`] to a running pipeline.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    current: Observable<Arc<Snapshot>>,
}
impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { current: Observable::new(Arc::new(snapshot)) }
    }

    /// Publish a new snapshot; every feed emits its part of it.
    pub fn replace(&self, snapshot: Snapshot) {
        self.current.set(Arc::new(snapshot));
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current.get()
    }

    fn feed<T: Send + 'static>(&self, part: impl Fn(&Snapshot) -> Vec<T> + Send + 'static) -> FeedStream<T> {
        Box::pin(self.current.changes().map(move |snapshot| -> LibraryResult<Vec<T>> { Ok(part(&snapshot)) }))
    }
}
impl LibraryFeed for SnapshotSource {
    fn entries(&self) -> FeedStream<LibraryEntry> {
        self.feed(|snapshot| snapshot.entries.clone())
    }

    fn categories(&self) -> FeedStream<Category> {
        self.feed(|snapshot| snapshot.categories.clone())
    }

    fn tracks(&self) -> FeedStream<TrackRecord> {
        self.feed(|snapshot| snapshot.tracks.clone())
    }
}
impl DownloadCounter for SnapshotSource {
    fn download_count(&self, entry: &LibraryEntry) -> u64 {
        self.snapshot().downloads.get(&entry.manga_id).copied().unwrap_or(0)
    }
}
impl MangaClassifier for SnapshotSource {
    fn is_local(&self, entry: &LibraryEntry) -> bool {
        self.snapshot().local.contains(&entry.manga_id)
    }
}
impl SourceRegistry for SnapshotSource {
    fn language(&self, source: u64) -> Option<String> {
        self.snapshot().languages.get(&source).cloned()
    }
}
impl TrackerRegistry for SnapshotSource {
    fn logged_in(&self) -> Vec<u64> {
        self.snapshot().logged_in.clone()
    }
}
impl RankingSource for SnapshotSource {
    fn last_read(&self) -> LibraryResult<Vec<u64>> {
        Ok(self.snapshot().last_read.clone())
    }

    fn latest_chapter(&self) -> LibraryResult<Vec<u64>> {
        Ok(self.snapshot().latest_chapter.clone())
    }

    fn chapter_fetch_date(&self) -> LibraryResult<Vec<u64>> {
        Ok(self.snapshot().chapter_fetch_date.clone())
    }
}

async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.and_then(|meta| meta.modified()).ok()
}

/// Reload the snapshot into `source` whenever the file's modification time
/// changes. Runs until cancelled.
///
/// A snapshot that fails to load is logged and skipped; the previous one
/// stays current.
pub async fn watch(path: PathBuf, source: SnapshotSource, every: Duration) {
    let mut last = modified(&path).await;
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let current = modified(&path).await;
        if current == last {
            continue;
        }
        last = current;
        match Snapshot::read(&path).await {
            Ok(snapshot) => {
                tracing::debug!(path = %path.display(), "snapshot changed");
                source.replace(snapshot);
            },
            Err(err) => tracing::warn!(error = ?err, "ignoring unreadable snapshot"),
        }
    }
}
