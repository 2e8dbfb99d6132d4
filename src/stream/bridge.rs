//! Bridging a pull-based fold to background producer tasks.
//!
//! Every concurrent combinator follows the same shape: each source stream
//! is folded inside a spawned task that offers its outcomes onto a bounded
//! queue as [`Take`] envelopes, and the consumer loop drives the downstream
//! step from the queue side. Producers post `End` repeatedly after
//! completion so late takers always observe termination; a closed queue is
//! the backstop when a producer has been aborted.
//!
//! Producer tasks are owned by a [`TaskGuard`], which aborts them when the
//! enclosing scope is dropped: on normal completion, early stop, failure,
//! panic, or cancellation of the consumer.

use tokio::task::JoinHandle;

use super::core::Stream;
use crate::queue::Queue;
use crate::step::Step;
use crate::take::Take;

/// Aborts the guarded task on drop.
pub(crate) struct TaskGuard {
    handle: JoinHandle<()>,
}

impl TaskGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        TaskGuard { handle }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fold `stream` in a background task, offering every outcome onto `queue`
/// through `wrap`. Values first, then either a single `Fail` or nothing,
/// then `End` forever.
pub(crate) fn spawn_source<S, T, W>(stream: S, queue: Queue<T>, wrap: W) -> TaskGuard
where
    S: Stream + 'static,
    T: Send + 'static,
    W: Fn(Take<S::Error, S::Item>) -> T + Send + Sync + 'static,
{
    let handle = tokio::spawn(async move {
        let outcome = stream
            .fold((), |(), a| {
                let item = wrap(Take::Value(a));
                let q = queue.clone();
                async move {
                    match q.offer(item).await {
                        Ok(()) => Ok(Step::Cont(())),
                        // The consumer is gone; stop producing.
                        Err(_) => Ok(Step::Stop(())),
                    }
                }
            })
            .await;
        if let Err(e) = outcome {
            log::debug!("stream source failed; forwarding failure to consumer");
            if queue.offer(wrap(Take::Fail(e))).await.is_err() {
                return;
            }
        }
        // Post End indefinitely so a taker arriving after termination reads
        // End instead of suspending on an empty queue.
        loop {
            if queue.offer(wrap(Take::End)).await.is_err() {
                break;
            }
        }
    });
    TaskGuard::new(handle)
}

/// The scoped result of [`to_queue`](super::ConcurrentStreamExt::to_queue):
/// a bounded queue of [`Take`] envelopes fed by a background task.
///
/// Dropping this value aborts the producer and closes the scope; the queue
/// then reports `End` to any further takers.
pub struct StreamQueue<E, A> {
    queue: Queue<Take<E, A>>,
    _guard: TaskGuard,
}

impl<E, A> StreamQueue<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// Take the next envelope. After the source terminates this keeps
    /// answering `End`.
    pub async fn take(&self) -> Take<E, A> {
        match self.queue.take().await {
            Some(take) => take,
            None => Take::End,
        }
    }

    /// Take the next envelope in `Option` form: `End` becomes `None` and a
    /// failure is re-raised.
    pub async fn take_option(&self) -> Result<Option<A>, E> {
        self.take().await.option()
    }

    /// The underlying queue.
    pub fn queue(&self) -> &Queue<Take<E, A>> {
        &self.queue
    }
}

pub(crate) fn to_queue<S>(stream: S, capacity: usize) -> StreamQueue<S::Error, S::Item>
where
    S: Stream + 'static,
{
    let queue = Queue::bounded(capacity);
    let guard = spawn_source(stream, queue.clone(), |take| take);
    StreamQueue {
        queue,
        _guard: guard,
    }
}

/// A pull handle over one side's queue, used by `zip_with` and handed to
/// the joiner of `join_with`.
///
/// Once `End`, a failure, or queue closure has been observed the handle is
/// latched done and keeps answering `None`.
pub struct Pull<E, A> {
    queue: Queue<Take<E, A>>,
    done: bool,
}

impl<E, A> Pull<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    pub(crate) fn new(queue: Queue<Take<E, A>>) -> Self {
        Pull { queue, done: false }
    }

    /// Pull the next element from this side.
    pub async fn pull(&mut self) -> Result<Option<A>, E> {
        if self.done {
            return Ok(None);
        }
        match self.queue.take().await {
            None | Some(Take::End) => {
                self.done = true;
                Ok(None)
            }
            Some(Take::Value(a)) => Ok(Some(a)),
            Some(Take::Fail(e)) => {
                self.done = true;
                Err(e)
            }
        }
    }

    /// Whether this side has terminated.
    pub fn is_done(&self) -> bool {
        self.done
    }
}
