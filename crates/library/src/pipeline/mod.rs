//! Composes the upstream feeds and re-run triggers into a continuously
//! updated [`Library`].
//!
//! Three stages run in a fixed order (badges, filter, sort) and each caches
//! its output. Every upstream event marks the earliest stage it affects as
//! dirty; the next pass recomputes from there and reuses what came before:
//!
//! | Event                           | Recomputes from |
//! |---------------------------------|-----------------|
//! | entries, categories, badges     | badges          |
//! | tracks, filter                  | filter          |
//! | sort                            | sort            |

mod pass;
mod subscription;

pub use self::subscription::{LibraryPipeline, Status};

use self::pass::{Inputs, Stage, Stages};
use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::models::{Category, Library, LibraryEntry};
use crate::tracks::TrackRecord;
use async_stream::stream;
use exn::ResultExt;
use futures::stream::{BoxStream, select_all};
use futures::{Stream, StreamExt};
use shelf_asyncutils::{Observable, Trigger};
use shelf_config::Preferences;
use std::pin::Pin;
use std::sync::Arc;

/// Upper bound on events folded into a single pass.
const EVENT_BATCH: usize = 64;

/// A stream of full snapshots: every item replaces the previous one.
pub type FeedStream<T> = Pin<Box<dyn Stream<Item = Result<Vec<T>>> + Send + 'static>>;

/// Where the library's raw contents come from.
///
/// Each stream yields the current snapshot as soon as it is polled and then a
/// new snapshot whenever the underlying data changes. An error ends the
/// pipeline.
pub trait LibraryFeed: Send + Sync {
    fn entries(&self) -> FeedStream<LibraryEntry>;
    fn categories(&self) -> FeedStream<Category>;
    fn tracks(&self) -> FeedStream<TrackRecord>;
}

/// Manual re-run requests, one per stage.
///
/// Fire one after changing the [`Preferences`] that stage reads (or when a
/// collaborator's answers change) so the next pass picks it up.
#[derive(Debug, Clone, Default)]
pub struct Triggers {
    pub badges: Trigger,
    pub filter: Trigger,
    pub sort: Trigger,
}

enum Event {
    Entries(Result<Vec<LibraryEntry>>),
    Categories(Result<Vec<Category>>),
    Tracks(Result<Vec<TrackRecord>>),
    Badges,
    Filter,
    Sort,
}

/// The newest snapshot from each feed, once it has produced one.
#[derive(Default)]
struct Latest {
    entries: Option<Arc<[Arc<LibraryEntry>]>>,
    categories: Option<Arc<[Category]>>,
    tracks: Option<Arc<[TrackRecord]>>,
}
impl Latest {
    /// Record an event, returning the earliest stage it invalidates.
    fn apply(&mut self, event: Event) -> Result<Stage> {
        Ok(match event {
            Event::Entries(entries) => {
                let entries = entries.or_raise(|| ErrorKind::Source)?;
                self.entries = Some(entries.into_iter().map(Arc::new).collect());
                Stage::Badges
            },
            Event::Categories(categories) => {
                self.categories = Some(categories.or_raise(|| ErrorKind::Source)?.into());
                Stage::Badges
            },
            Event::Tracks(tracks) => {
                self.tracks = Some(tracks.or_raise(|| ErrorKind::Source)?.into());
                Stage::Filter
            },
            Event::Badges => Stage::Badges,
            Event::Filter => Stage::Filter,
            Event::Sort => Stage::Sort,
        })
    }

    fn inputs(&self) -> Option<Inputs> {
        Some(Inputs {
            entries: Arc::clone(self.entries.as_ref()?),
            categories: Arc::clone(self.categories.as_ref()?),
            tracks: Arc::clone(self.tracks.as_ref()?),
        })
    }
}

/// Run the pipeline as a stream of libraries.
///
/// Nothing is emitted until entries, categories and tracks have each
/// produced a snapshot. After that, every batch of pending events results in
/// exactly one pass and one emitted [`Library`]. Preferences are read at the
/// start of each pass.
///
/// The first error (from a feed or from a pass) is yielded and ends the
/// stream. Passes run on Tokio's blocking pool so that ranking lookups can
/// block; dropping the stream discards the result of a pass in flight.
pub fn library_stream(
    feed: &dyn LibraryFeed,
    ctx: Context,
    prefs: Observable<Preferences>,
    triggers: &Triggers,
) -> impl Stream<Item = Result<Library>> + Send + 'static {
    let sources: [BoxStream<'static, Event>; 6] = [
        feed.entries().map(Event::Entries).boxed(),
        feed.categories().map(Event::Categories).boxed(),
        feed.tracks().map(Event::Tracks).boxed(),
        triggers.badges.changes().map(|()| Event::Badges).boxed(),
        triggers.filter.changes().map(|()| Event::Filter).boxed(),
        triggers.sort.changes().map(|()| Event::Sort).boxed(),
    ];
    let mut events = select_all(sources).ready_chunks(EVENT_BATCH);

    stream! {
        let mut latest = Latest::default();
        let mut stages = Stages::default();
        let mut dirty: Option<Stage> = None;

        while let Some(batch) = events.next().await {
            for event in batch {
                match latest.apply(event) {
                    Ok(stage) => dirty = Some(dirty.map_or(stage, |d| d.min(stage))),
                    Err(err) => {
                        tracing::warn!(error = ?err, "library feed failed");
                        yield Err(err);
                        return;
                    },
                }
            }
            // Keep accumulating until every feed has reported in.
            let (Some(stage), Some(inputs)) = (dirty, latest.inputs()) else {
                continue;
            };
            dirty = None;
            tracing::debug!(?stage, "recomputing library");
            stages.invalidate(stage);

            let prefs = prefs.get();
            let ctx = ctx.clone();
            let mut owned = std::mem::take(&mut stages);
            let joined = tokio::task::spawn_blocking(move || {
                let library = pass::run(&inputs, &mut owned, &prefs, &ctx);
                (library, owned)
            })
            .await
            .or_raise(|| ErrorKind::Pass);

            let library = match joined {
                Ok((library, returned)) => {
                    stages = returned;
                    library
                },
                Err(err) => Err(err),
            };
            match library {
                Ok(library) => yield Ok(library),
                Err(err) => {
                    tracing::warn!(error = ?err, "library pass failed");
                    yield Err(err);
                    return;
                },
            }
        }
    }
}
