use super::{LibraryFeed, Triggers, library_stream};
use crate::context::Context;
use crate::error::Error;
use crate::models::Library;
use futures::StreamExt;
use shelf_asyncutils::Observable;
use shelf_config::Preferences;
use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Lifecycle of a [`LibraryPipeline`]'s subscription.
#[derive(Debug, Clone, Default)]
pub enum Status {
    #[default]
    Idle,
    Subscribed,
    /// The subscription ended with an error. Subscribing again starts over.
    Failed(Arc<Error>),
}
impl Status {
    pub fn is_subscribed(&self) -> bool {
        matches!(self, Self::Subscribed)
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The observables a subscription publishes to, stamped with a generation.
///
/// Every [`start()`](Self::start) and [`stop()`](Self::stop) bumps the
/// generation. A task only publishes while its own generation is current, so
/// an aborted task that is still mid-poll can't overwrite the state of the
/// subscription that replaced it. The generation is checked and the output
/// written while the status lock is held.
#[derive(Clone, Default)]
struct Outputs {
    generation: Arc<AtomicU64>,
    library: Observable<Option<Arc<Library>>>,
    status: Observable<Status>,
}
impl Outputs {
    /// Mark a new subscription live and return its generation.
    fn start(&self) -> u64 {
        let mut id = 0;
        self.status.update(|status| {
            id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *status = Status::Subscribed;
        });
        id
    }

    /// Retire whichever subscription is current.
    fn stop(&self) {
        self.status.update(|status| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *status = Status::Idle;
        });
    }

    fn is_current(&self, id: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == id
    }

    /// Publish `library` if subscription `id` is still current.
    fn publish(&self, id: u64, library: Library) -> bool {
        let mut published = false;
        self.status.update_if(|_| {
            if self.is_current(id) {
                self.library.set(Some(Arc::new(library)));
                published = true;
            }
            false
        });
        published
    }

    /// Record how subscription `id` ended, if it is still current.
    fn finish(&self, id: u64, ended: Status) -> bool {
        self.status.update_if(|status| {
            if !self.is_current(id) {
                return false;
            }
            *status = ended;
            true
        })
    }
}

/// Owns a running [`library_stream`] and publishes its results.
///
/// Consumers read [`library()`](Self::library) for the newest library and
/// [`status()`](Self::status) for the subscription state; neither ever holds
/// more than the latest value. Dropping the pipeline cancels the
/// subscription.
pub struct LibraryPipeline {
    feed: Arc<dyn LibraryFeed>,
    ctx: Context,
    prefs: Observable<Preferences>,
    triggers: Triggers,
    outputs: Outputs,
    task: Mutex<Option<JoinHandle<()>>>,
}
impl LibraryPipeline {
    pub fn new(feed: Arc<dyn LibraryFeed>, ctx: Context, prefs: Observable<Preferences>) -> Self {
        Self {
            feed,
            ctx,
            prefs,
            triggers: Triggers::default(),
            outputs: Outputs::default(),
            task: Mutex::new(None),
        }
    }

    /// Shared handle to the preferences read at the start of each pass.
    pub fn preferences(&self) -> &Observable<Preferences> {
        &self.prefs
    }

    /// The most recently published library; `None` until the first pass of
    /// the first subscription completes. Kept after unsubscribing.
    pub fn library(&self) -> &Observable<Option<Arc<Library>>> {
        &self.outputs.library
    }

    pub fn status(&self) -> &Observable<Status> {
        &self.outputs.status
    }

    /// Start the pipeline on the current Tokio runtime.
    ///
    /// Returns `false` (and does nothing) if a subscription is already live.
    ///
    /// # Panics
    /// If called outside a Tokio runtime.
    pub fn subscribe(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        let stream = library_stream(self.feed.as_ref(), self.ctx.clone(), self.prefs.clone(), &self.triggers);
        let outputs = self.outputs.clone();
        let id = outputs.start();
        tracing::debug!(generation = id, "library pipeline subscribed");
        *task = Some(tokio::spawn(async move {
            let mut stream = pin!(stream);
            while let Some(result) = stream.next().await {
                match result {
                    Ok(next) => {
                        if !outputs.publish(id, next) {
                            return;
                        }
                    },
                    Err(err) => {
                        outputs.finish(id, Status::Failed(Arc::new(err)));
                        return;
                    },
                }
            }
            tracing::debug!("library feeds closed");
            outputs.finish(id, Status::Idle);
        }));
        true
    }

    /// Cancel the live subscription, if any. The last published library is
    /// kept. Returns `false` if nothing was running.
    pub fn unsubscribe(&self) -> bool {
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(handle) = handle else {
            return false;
        };
        let was_live = !handle.is_finished();
        handle.abort();
        if was_live {
            self.outputs.stop();
            tracing::debug!("library pipeline unsubscribed");
        }
        was_live
    }

    pub fn is_subscribed(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Re-run the filter and sort stages on the next pass.
    pub fn request_filter_update(&self) {
        self.triggers.filter.fire();
    }

    /// Re-run every stage on the next pass.
    pub fn request_badges_update(&self) {
        self.triggers.badges.fire();
    }

    /// Re-run the sort stage on the next pass.
    pub fn request_sort_update(&self) {
        self.triggers.sort.fire();
    }
}
impl Drop for LibraryPipeline {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }
}
