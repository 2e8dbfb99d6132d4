use foldstream::error::StreamError;
use foldstream::queue::Queue;
use foldstream::stream::*;
use tokio::runtime::Runtime;

#[test]
fn test_empty() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = empty::<i32, StreamError>().collect_vec().await.unwrap();
        assert_eq!(result, Vec::<i32>::new());
    });
}

#[test]
fn test_once() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = once::<_, StreamError>(42).collect_vec().await.unwrap();
        assert_eq!(result, vec![42]);
    });
}

#[test]
fn test_from_iter() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2, 3, 4, 5])
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 3, 4, 5]);
    });
}

#[test]
fn test_from_chunk() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_chunk::<_, StreamError>(vec![7, 8, 9])
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![7, 8, 9]);
    });
}

#[test]
fn test_eval() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = eval(async { Ok::<_, StreamError>(42) })
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![42]);
    });
}

#[test]
fn test_eval_failure() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = eval(async { Err::<i32, _>(StreamError::Custom("boom".into())) })
            .collect_vec()
            .await;
        assert_eq!(result, Err(StreamError::Custom("boom".into())));
    });
}

#[test]
fn test_unwrap() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = unwrap(async { Ok(from_iter::<_, StreamError>(vec![1, 2, 3])) })
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    });
}

#[test]
fn test_range_is_inclusive() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = range::<StreamError>(0, 9).collect_vec().await.unwrap();
        assert_eq!(result, (0..=9).collect::<Vec<_>>());

        let empty_range = range::<StreamError>(5, 4).collect_vec().await.unwrap();
        assert_eq!(empty_range, Vec::<i32>::new());
    });
}

#[test]
fn test_unfold() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        // Countdown from 5
        let result = unfold::<_, _, _, StreamError>(5, |n| {
            if n == 0 {
                None
            } else {
                Some((n, n - 1))
            }
        })
        .collect_vec()
        .await
        .unwrap();
        assert_eq!(result, vec![5, 4, 3, 2, 1]);
    });
}

#[test]
fn test_unfold_eval() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = unfold_eval(0, |n| async move {
            if n < 4 {
                Ok::<_, StreamError>(Some((n * 10, n + 1)))
            } else {
                Ok(None)
            }
        })
        .collect_vec()
        .await
        .unwrap();
        assert_eq!(result, vec![0, 10, 20, 30]);
    });
}

#[test]
fn test_from_queue_drains_until_closed() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let queue = Queue::bounded(8);
        queue.offer(1).await.unwrap();
        queue.offer(2).await.unwrap();
        queue.offer(3).await.unwrap();
        queue.close().await;

        let result = from_queue::<_, StreamError>(queue).collect_vec().await.unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    });
}
