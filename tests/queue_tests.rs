use foldstream::queue::{Queue, QueueError};

#[tokio::test]
async fn test_offer_take_fifo() {
    let queue = Queue::bounded(4);
    queue.offer(1).await.unwrap();
    queue.offer(2).await.unwrap();
    queue.offer(3).await.unwrap();

    assert_eq!(queue.take().await, Some(1));
    assert_eq!(queue.take().await, Some(2));
    assert_eq!(queue.take().await, Some(3));
}

#[tokio::test]
async fn test_try_offer_full() {
    let queue = Queue::bounded(1);
    queue.offer(1).await.unwrap();
    assert_eq!(queue.try_offer(2).await, Err(QueueError::Full));
}

#[tokio::test]
async fn test_offer_suspends_until_taken() {
    let queue = Queue::bounded(1);
    queue.offer(1).await.unwrap();

    let producer = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.offer(2).await })
    };
    // The producer is parked on the full queue until we take.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(!producer.is_finished());

    assert_eq!(queue.take().await, Some(1));
    producer.await.unwrap().unwrap();
    assert_eq!(queue.take().await, Some(2));
}

#[tokio::test]
async fn test_close_drains_then_ends() {
    let queue = Queue::bounded(4);
    queue.offer(1).await.unwrap();
    queue.offer(2).await.unwrap();
    queue.close().await;

    assert_eq!(queue.offer(3).await, Err(QueueError::Closed));
    assert_eq!(queue.take().await, Some(1));
    assert_eq!(queue.take().await, Some(2));
    assert_eq!(queue.take().await, None);
}

#[tokio::test]
async fn test_capacity() {
    let bounded: Queue<i32> = Queue::bounded(8);
    assert_eq!(bounded.capacity(), Some(8));

    let unbounded: Queue<i32> = Queue::unbounded();
    assert_eq!(unbounded.capacity(), None);
}

#[tokio::test]
async fn test_unbounded_never_blocks() {
    let queue = Queue::unbounded();
    for i in 0..1000 {
        queue.offer(i).await.unwrap();
    }
    assert_eq!(queue.len().await, 1000);
    assert_eq!(queue.take().await, Some(0));
}
