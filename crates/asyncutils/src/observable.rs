use async_stream::stream;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;

/// A continuously-updated value with change notification.
///
/// Cloning an [`Observable`] yields another handle to the *same* value. The
/// change stream returned by [`changes()`](Self::changes) ends once every
/// handle has been dropped.
///
/// # Examples
///
/// ```
/// use shelf_asyncutils::Observable;
///
/// let counter = Observable::new(1);
/// counter.update(|n| *n += 1);
/// assert_eq!(counter.get(), 2);
/// ```
#[derive(Debug)]
pub struct Observable<T> {
    sender: Arc<watch::Sender<T>>,
}
impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { sender: Arc::clone(&self.sender) }
    }
}
impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        // The initial receiver is dropped straight away; `send_replace` and
        // `send_modify` don't care whether anybody is listening.
        let (sender, _) = watch::channel(value);
        Self { sender: Arc::new(sender) }
    }

    /// Replace the current value and notify subscribers.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Modify the current value in place and notify subscribers.
    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        self.sender.send_modify(modify);
    }

    /// Modify the current value in place, notifying subscribers only if
    /// `modify` returns `true`. Returns whatever `modify` returned.
    ///
    /// `modify` runs while the value is locked, so a decision it makes
    /// can't be overtaken by a concurrent [`set()`](Self::set).
    pub fn update_if(&self, modify: impl FnOnce(&mut T) -> bool) -> bool {
        self.sender.send_if_modified(modify)
    }

    /// Number of live change streams.
    pub fn subscribers(&self) -> usize {
        self.sender.receiver_count()
    }
}
impl<T: Clone> Observable<T> {
    /// Clone of the latest value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}
impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Stream the current value, followed by every later change.
    ///
    /// The subscription is registered when this method is called, not when
    /// the stream is first polled, so changes made in between are not lost:
    /// the first item is always the value current at the time of the first
    /// poll. A consumer that polls slower than the value changes sees only
    /// the newest value on its next poll.
    pub fn changes(&self) -> impl Stream<Item = T> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        stream! {
            loop {
                // Clone out of the borrow guard before yielding; holding a
                // `watch::Ref` across an await point would block writers.
                let value = receiver.borrow_and_update().clone();
                yield value;
                if receiver.changed().await.is_err() {
                    break;
                }
            }
        }
    }
}
