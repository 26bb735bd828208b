use crate::Observable;
use futures::{Stream, StreamExt};

/// A re-run signal with no payload.
///
/// Subscribers receive one `()` immediately (so that a consumer combining
/// several triggers can run its first pass without waiting for anybody to
/// fire), then at least one `()` after every [`fire()`](Self::fire). Several
/// fires in quick succession may be collapsed into a single notification.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    generation: Observable<u64>,
}
impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.generation.update(|n| *n = n.wrapping_add(1));
    }

    /// How many times this trigger has fired since it was created.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn changes(&self) -> impl Stream<Item = ()> + Send + 'static {
        self.generation.changes().map(|_| ())
    }
}
