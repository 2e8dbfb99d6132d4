use foldstream::error::StreamError;
use foldstream::step::Step;
use foldstream::stream::*;
use tokio::runtime::Runtime;

#[test]
fn test_step_helpers() {
    let cont: Step<i32> = Step::Cont(1);
    let stop: Step<i32> = Step::Stop(2);

    assert!(cont.is_cont());
    assert!(stop.is_stop());
    assert_eq!(cont.extract(), 1);
    assert_eq!(stop.extract(), 2);

    // map preserves the tag
    assert_eq!(Step::Cont(1).map(|x| x + 1), Step::Cont(2));
    assert_eq!(Step::Stop(1).map(|x| x + 1), Step::Stop(2));

    assert_eq!(Step::Cont(1).fold(|x| x * 10, |x| x * 100), 10);
    assert_eq!(Step::Stop(1).fold(|x| x * 10, |x| x * 100), 100);
}

#[test]
fn test_folding_identity() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let xs = vec![1, 2, 3, 4, 5];
        let folded = from_iter::<_, StreamError>(xs.clone())
            .fold_left(Vec::new(), |mut acc, a| {
                acc.push(a);
                acc
            })
            .await
            .unwrap();
        assert_eq!(folded, xs);
    });
}

#[test]
fn test_fold_stop_is_authoritative() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        // Stop after the second element; nothing further is consumed.
        let end = from_iter::<_, StreamError>(vec![1, 2, 3, 4])
            .fold(Vec::new(), |mut acc, a| async move {
                acc.push(a);
                if acc.len() == 2 {
                    Ok(Step::Stop(acc))
                } else {
                    Ok(Step::Cont(acc))
                }
            })
            .await
            .unwrap();
        assert!(end.is_stop());
        assert_eq!(end.extract(), vec![1, 2]);
    });
}

#[test]
fn test_fold_exhaustion_returns_cont() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let end = from_iter::<_, StreamError>(vec![1, 2])
            .fold(0, |acc, a| async move { Ok(Step::Cont(acc + a)) })
            .await
            .unwrap();
        assert_eq!(end, Step::Cont(3));
    });
}

#[test]
fn test_fold_while_initial_check() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        // cont is false for the seed: no element may be consumed.
        let out = from_iter::<_, StreamError>(vec![1, 2, 3])
            .fold_while(
                100,
                |s| *s < 100,
                |s, a| async move { Ok(s + a) },
            )
            .await
            .unwrap();
        assert_eq!(out, 100);
    });
}

#[test]
fn test_fold_while_stops_when_cont_fails() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let out = from_iter::<_, StreamError>(vec![1, 1, 1, 1, 1, 1])
            .fold_while(0, |s| *s < 3, |s, a| async move { Ok(s + a) })
            .await
            .unwrap();
        assert_eq!(out, 3);
    });
}

#[test]
fn test_fold_failure_short_circuits() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let result = from_iter::<_, StreamError>(vec![1, 2, 3])
            .fold(0, |acc, a| async move {
                if a == 2 {
                    Err(StreamError::Custom("boom".into()))
                } else {
                    Ok(Step::Cont(acc + a))
                }
            })
            .await;
        assert_eq!(result, Err(StreamError::Custom("boom".into())));
    });
}

#[test]
fn test_pure_and_effectful_folds_agree() {
    let rt = Runtime::new().unwrap();
    rt.block_on(async {
        let effectful = range::<StreamError>(0, 20).collect_vec().await.unwrap();
        let pure = range::<StreamError>(0, 20).collect_pure();
        assert_eq!(effectful, pure);

        let effectful = from_iter::<_, StreamError>(vec![3, 1, 4, 1, 5])
            .collect_vec()
            .await
            .unwrap();
        let pure = from_iter::<_, StreamError>(vec![3, 1, 4, 1, 5]).collect_pure();
        assert_eq!(effectful, pure);

        let countdown = |n: i32| if n == 0 { None } else { Some((n, n - 1)) };
        let effectful = unfold::<_, _, _, StreamError>(5, countdown)
            .collect_vec()
            .await
            .unwrap();
        let pure = unfold::<_, _, _, StreamError>(5, countdown).collect_pure();
        assert_eq!(effectful, pure);
    });
}

#[test]
fn test_pure_fold_honours_stop() {
    let end = from_iter::<_, StreamError>(vec![1, 2, 3, 4]).fold_pure(0, |acc, a| {
        if acc + a > 3 {
            Step::Stop(acc)
        } else {
            Step::Cont(acc + a)
        }
    });
    assert_eq!(end, Step::Stop(3));
}

#[test]
fn test_pure_collect_on_constructors() {
    assert_eq!(empty::<i32, StreamError>().collect_pure(), Vec::<i32>::new());
    assert_eq!(once::<_, StreamError>(9).collect_pure(), vec![9]);
    assert_eq!(range::<StreamError>(1, 3).collect_pure(), vec![1, 2, 3]);
}
