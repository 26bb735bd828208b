//! In-memory collaborators and feeds for tests.
//!
//! Compiled for this crate's own tests and, through the `mock` feature, for
//! other crates' dev dependencies.

use crate::context::{DownloadCounter, MangaClassifier, RankingSource, SourceRegistry, TrackerRegistry};
use crate::error::{Error, ErrorKind, Result};
use crate::models::{Category, DisplayMode, LibraryEntry, LibraryItem, LibraryMap};
use crate::pipeline::{FeedStream, LibraryFeed};
use crate::tracks::TrackRecord;
use futures::{StreamExt, stream};
use shelf_asyncutils::Observable;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every collaborator lookup from plain collections.
///
/// Ranking queries are counted, so tests can assert how often the pipeline
/// asked. Set `fail_rankings` to make every ranking query fail.
#[derive(Debug, Default)]
pub struct MockCollaborators {
    /// Manga ID → downloaded chapters.
    pub downloads: HashMap<u64, u64>,
    /// Manga IDs from the local source.
    pub local: HashSet<u64>,
    /// Source ID → language code.
    pub languages: HashMap<u64, String>,
    pub logged_in: Vec<u64>,
    pub last_read: Vec<u64>,
    pub latest_chapter: Vec<u64>,
    pub chapter_fetch_date: Vec<u64>,
    pub fail_rankings: bool,
    /// Ranking queries answered so far; read it through [`lookups()`](Self::lookups).
    pub lookups: AtomicUsize,
}
impl MockCollaborators {
    /// Number of ranking queries answered so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn rank(&self, ranking: &[u64]) -> Result<Vec<u64>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_rankings {
            exn::bail!(ErrorKind::Lookup);
        }
        Ok(ranking.to_vec())
    }
}
impl DownloadCounter for MockCollaborators {
    fn download_count(&self, entry: &LibraryEntry) -> u64 {
        self.downloads.get(&entry.manga_id).copied().unwrap_or(0)
    }
}
impl MangaClassifier for MockCollaborators {
    fn is_local(&self, entry: &LibraryEntry) -> bool {
        self.local.contains(&entry.manga_id)
    }
}
impl SourceRegistry for MockCollaborators {
    fn language(&self, source: u64) -> Option<String> {
        self.languages.get(&source).cloned()
    }
}
impl TrackerRegistry for MockCollaborators {
    fn logged_in(&self) -> Vec<u64> {
        self.logged_in.clone()
    }
}
impl RankingSource for MockCollaborators {
    fn last_read(&self) -> Result<Vec<u64>> {
        self.rank(&self.last_read)
    }

    fn latest_chapter(&self) -> Result<Vec<u64>> {
        self.rank(&self.latest_chapter)
    }

    fn chapter_fetch_date(&self) -> Result<Vec<u64>> {
        self.rank(&self.chapter_fetch_date)
    }
}

/// A [`LibraryFeed`] backed by [`Observable`]s: set a new snapshot and every
/// running pipeline sees it.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    pub entries: Observable<Vec<LibraryEntry>>,
    pub categories: Observable<Vec<Category>>,
    pub tracks: Observable<Vec<TrackRecord>>,
    /// When set, the tracks feed fails instead of producing snapshots.
    pub fail_tracks: Observable<bool>,
}
impl MemoryFeed {
    pub fn new(entries: Vec<LibraryEntry>, categories: Vec<Category>) -> Self {
        Self {
            entries: Observable::new(entries),
            categories: Observable::new(categories),
            ..Self::default()
        }
    }
}
impl LibraryFeed for MemoryFeed {
    fn entries(&self) -> FeedStream<LibraryEntry> {
        Box::pin(self.entries.changes().map(Ok::<_, Error>))
    }

    fn categories(&self) -> FeedStream<Category> {
        Box::pin(self.categories.changes().map(Ok::<_, Error>))
    }

    fn tracks(&self) -> FeedStream<TrackRecord> {
        let (tracks, fail) = (self.tracks.clone(), self.fail_tracks.clone());
        let changed = stream::select(self.tracks.changes().map(|_| ()), self.fail_tracks.changes().map(|_| ()));
        Box::pin(changed.map(move |()| -> Result<Vec<TrackRecord>> {
            if fail.get() {
                exn::bail!(ErrorKind::Source);
            }
            Ok(tracks.get())
        }))
    }
}

/// An uncategorised entry; adjust with struct update syntax.
pub fn entry(manga_id: u64, category: u64, title: &str) -> LibraryEntry {
    LibraryEntry::new(manga_id, title).in_category(category)
}

/// Group entries into a [`LibraryMap`] by their category, badges disabled.
pub fn items(entries: impl IntoIterator<Item = LibraryEntry>) -> LibraryMap {
    let mut map = LibraryMap::new();
    for entry in entries {
        map.entry(entry.category)
            .or_default()
            .push(LibraryItem::new(Arc::new(entry), DisplayMode::default()));
    }
    map
}

/// Manga IDs of a category, in order.
pub fn ids(map: &LibraryMap, category: u64) -> Vec<u64> {
    map.get(&category).map(|items| items.iter().map(LibraryItem::manga_id).collect()).unwrap_or_default()
}
