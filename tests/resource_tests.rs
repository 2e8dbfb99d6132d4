use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use foldstream::error::StreamError;
use foldstream::stream::*;

fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )
}

#[tokio::test]
async fn test_bracket_releases_on_exhaustion() {
    let (acquired, released) = counters();
    let acq = acquired.clone();
    let rel = released.clone();

    let result = bracket(
        async move {
            acq.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StreamError>(())
        },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move { Ok(None::<i32>) },
    )
    .collect_vec()
    .await
    .unwrap();

    assert_eq!(result, Vec::<i32>::new());
    assert_eq!(acquired.load(Ordering::SeqCst), 1);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bracket_releases_on_early_stop() {
    let (acquired, released) = counters();
    let acq = acquired.clone();
    let rel = released.clone();

    // An endless resource-backed stream, cut short downstream.
    let result = bracket(
        async move {
            acq.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StreamError>(())
        },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move { Ok(Some(7)) },
    )
    .take(3)
    .collect_vec()
    .await
    .unwrap();

    assert_eq!(result, vec![7, 7, 7]);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bracket_releases_on_read_failure() {
    let (acquired, released) = counters();
    let acq = acquired.clone();
    let rel = released.clone();

    let result = bracket(
        async move {
            acq.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StreamError>(())
        },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move { Err::<Option<i32>, _>(StreamError::Custom("read failed".into())) },
    )
    .collect_vec()
    .await;

    assert!(result.is_err());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bracket_releases_on_downstream_failure() {
    let (acquired, released) = counters();
    let acq = acquired.clone();
    let rel = released.clone();

    let result = bracket(
        async move {
            acq.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StreamError>(())
        },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move { Ok(Some(1)) },
    )
    .eval_map(|_| async move { Err::<i32, _>(StreamError::Custom("consumer failed".into())) })
    .collect_vec()
    .await;

    assert!(result.is_err());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bracket_skips_release_when_acquire_fails() {
    let (_, released) = counters();
    let rel = released.clone();

    let result = bracket(
        async move { Err::<(), _>(StreamError::Custom("no resource".into())) },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move { Ok(Some(1)) },
    )
    .collect_vec()
    .await;

    assert!(result.is_err());
    assert_eq!(released.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bracket_releases_on_cancellation() {
    let (acquired, released) = counters();
    let acq = acquired.clone();
    let rel = released.clone();

    let stream = bracket(
        async move {
            acq.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StreamError>(())
        },
        move |_| async move {
            rel.fetch_add(1, Ordering::SeqCst);
        },
        |_| async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Some(1))
        },
    );

    let handle = tokio::spawn(async move { stream.collect_vec().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(acquired.load(Ordering::SeqCst), 1);

    handle.abort();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
