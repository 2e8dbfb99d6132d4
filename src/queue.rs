//! Asynchronous FIFO queues used to bridge producers and consumers.
//!
//! Concurrent combinators move elements between fibers through these
//! queues: `offer` suspends while a bounded queue is full, `take` suspends
//! while it is empty. A queue whose producers are all gone reports `None`
//! from `take` once drained, so late consumers never block forever.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Error types for queue operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Queue has been closed.
    Closed,
    /// Queue is full (bounded queues with `try_offer`).
    Full,
    /// Channel disconnected.
    Disconnected,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Closed => write!(f, "queue is closed"),
            QueueError::Full => write!(f, "queue is full"),
            QueueError::Disconnected => write!(f, "queue channel disconnected"),
        }
    }
}

impl std::error::Error for QueueError {}

/// A concurrent FIFO queue with suspending `offer` and `take`.
pub enum Queue<T> {
    Bounded {
        sender: Arc<Mutex<Option<mpsc::Sender<T>>>>,
        receiver: Arc<Mutex<Option<mpsc::Receiver<T>>>>,
        capacity: usize,
    },
    Unbounded {
        sender: Arc<Mutex<Option<mpsc::UnboundedSender<T>>>>,
        receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<T>>>>,
    },
}

// Handles are Arc-backed, so clones share the queue regardless of `T`.
impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        match self {
            Queue::Bounded {
                sender,
                receiver,
                capacity,
            } => Queue::Bounded {
                sender: Arc::clone(sender),
                receiver: Arc::clone(receiver),
                capacity: *capacity,
            },
            Queue::Unbounded { sender, receiver } => Queue::Unbounded {
                sender: Arc::clone(sender),
                receiver: Arc::clone(receiver),
            },
        }
    }
}

impl<T> Queue<T>
where
    T: Send + 'static,
{
    /// Create a new bounded queue with the given capacity.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Queue::Bounded {
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver: Arc::new(Mutex::new(Some(receiver))),
            capacity,
        }
    }

    /// Create a new unbounded queue.
    pub fn unbounded() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Queue::Unbounded {
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver: Arc::new(Mutex::new(Some(receiver))),
        }
    }

    /// Offer an item, suspending while a bounded queue is full.
    pub async fn offer(&self, item: T) -> Result<(), QueueError> {
        match self {
            Queue::Bounded { sender, .. } => {
                // Clone the sender out of the lock so a producer suspended
                // on a full queue does not hold the lock.
                let sender = {
                    let guard = sender.lock().await;
                    match &*guard {
                        Some(sender) => sender.clone(),
                        None => return Err(QueueError::Closed),
                    }
                };
                sender.send(item).await.map_err(|_| QueueError::Disconnected)
            }
            Queue::Unbounded { sender, .. } => {
                let guard = sender.lock().await;
                match &*guard {
                    Some(sender) => sender.send(item).map_err(|_| QueueError::Disconnected),
                    None => Err(QueueError::Closed),
                }
            }
        }
    }

    /// Offer an item without suspending.
    pub async fn try_offer(&self, item: T) -> Result<(), QueueError> {
        match self {
            Queue::Bounded { sender, .. } => {
                let guard = sender.lock().await;
                match &*guard {
                    Some(sender) => match sender.try_send(item) {
                        Ok(_) => Ok(()),
                        Err(mpsc::error::TrySendError::Full(_)) => Err(QueueError::Full),
                        Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Disconnected),
                    },
                    None => Err(QueueError::Closed),
                }
            }
            Queue::Unbounded { sender, .. } => {
                let guard = sender.lock().await;
                match &*guard {
                    Some(sender) => sender.send(item).map_err(|_| QueueError::Disconnected),
                    None => Err(QueueError::Closed),
                }
            }
        }
    }

    /// Take the next item, suspending while the queue is empty.
    ///
    /// Returns `None` once every producer handle is gone and the buffer is
    /// drained.
    pub async fn take(&self) -> Option<T> {
        match self {
            Queue::Bounded { receiver, .. } => {
                let mut guard = receiver.lock().await;
                match &mut *guard {
                    Some(rx) => rx.recv().await,
                    None => None,
                }
            }
            Queue::Unbounded { receiver, .. } => {
                let mut guard = receiver.lock().await;
                match &mut *guard {
                    Some(rx) => rx.recv().await,
                    None => None,
                }
            }
        }
    }

    /// Close the queue, preventing further offers.
    pub async fn close(&self) {
        match self {
            Queue::Bounded { sender, .. } => {
                let mut guard = sender.lock().await;
                *guard = None;
            }
            Queue::Unbounded { sender, .. } => {
                let mut guard = sender.lock().await;
                *guard = None;
            }
        }
    }

    /// Capacity of the queue (`None` for unbounded).
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Queue::Bounded { capacity, .. } => Some(*capacity),
            Queue::Unbounded { .. } => None,
        }
    }

    /// Current number of buffered items.
    pub async fn len(&self) -> usize {
        match self {
            Queue::Bounded { receiver, .. } => {
                let guard = receiver.lock().await;
                guard.as_ref().map_or(0, |rx| rx.len())
            }
            Queue::Unbounded { receiver, .. } => {
                let guard = receiver.lock().await;
                guard.as_ref().map_or(0, |rx| rx.len())
            }
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Queue::Bounded { capacity, .. } => f
                .debug_struct("Queue::Bounded")
                .field("capacity", capacity)
                .finish(),
            Queue::Unbounded { .. } => f.debug_struct("Queue::Unbounded").finish(),
        }
    }
}
