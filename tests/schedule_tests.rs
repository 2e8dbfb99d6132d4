use std::time::{Duration, Instant};

use foldstream::error::StreamError;
use foldstream::schedule::Schedule;
use foldstream::stream::*;
use tokio::runtime::Runtime;

#[test]
fn test_recurs_decisions() {
    let schedule = Schedule::Recurs(2);
    let state = schedule.initial();

    let first = schedule.update(state);
    assert!(first.cont);
    let second = schedule.update(first.state);
    assert!(second.cont);
    let third = schedule.update(second.state);
    assert!(!third.cont);
}

#[test]
fn test_never_decision() {
    let schedule = Schedule::Never;
    assert!(!schedule.update(schedule.initial()).cont);
}

#[test]
fn test_exponential_delays_grow() {
    let schedule = Schedule::Exponential {
        times: 3,
        initial_delay: Duration::from_millis(10),
        multiplier: 2.0,
    };
    let first = schedule.update(schedule.initial());
    assert_eq!(first.delay, Duration::from_millis(10));
    let second = schedule.update(first.state);
    assert_eq!(second.delay, Duration::from_millis(20));
    let third = schedule.update(second.state);
    assert_eq!(third.delay, Duration::from_millis(40));
}

#[test]
fn test_repeat_reruns_whole_stream() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2])
            .repeat(Schedule::Recurs(2))
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 1, 2, 1, 2]);
    });
}

#[test]
fn test_repeat_never_runs_once() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2])
            .repeat(Schedule::Never)
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2]);
    });
}

#[test]
fn test_repeat_forever_cut_by_take() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2])
            .repeat(Schedule::Forever)
            .take(5)
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 1, 2, 1]);
    });
}

#[test]
fn test_repeat_spaced_observes_delay() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let start = Instant::now();
        let result = from_iter::<_, StreamError>(vec![1])
            .repeat(Schedule::Spaced {
                times: 2,
                delay: Duration::from_millis(20),
            })
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 1, 1]);
        assert!(start.elapsed() >= Duration::from_millis(40));
    });
}

#[test]
fn test_repeat_elems_reemits_each_element() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2])
            .repeat_elems(Schedule::Recurs(1))
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 1, 2, 2]);
    });
}

#[test]
fn test_repeat_elems_never_is_identity() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2, 3])
            .repeat_elems(Schedule::Never)
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 2, 3]);
    });
}

#[test]
fn test_repeat_elems_respects_downstream_stop() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2])
            .repeat_elems(Schedule::Forever)
            .take(4)
            .collect_vec()
            .await
            .unwrap();
        assert_eq!(result, vec![1, 1, 1, 1]);
    });
}
