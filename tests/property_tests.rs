use foldstream::error::StreamError;
use foldstream::stream::*;
use quickcheck::quickcheck;
use tokio::runtime::Runtime;

#[test]
fn prop_folding_identity() {
    fn prop(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let folded = from_iter::<_, StreamError>(xs.clone())
                .fold_left(Vec::new(), |mut acc, a| {
                    acc.push(a);
                    acc
                })
                .await
                .unwrap();
            folded == xs
        })
    }
    quickcheck(prop as fn(Vec<i32>) -> bool);
}

#[test]
fn prop_map_fusion() {
    fn prop(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let composed = from_iter::<_, StreamError>(xs.clone())
                .map(|x| x.wrapping_add(1))
                .map(|x| x.wrapping_mul(3))
                .collect_vec()
                .await
                .unwrap();
            let fused = from_iter::<_, StreamError>(xs)
                .map(|x| x.wrapping_add(1).wrapping_mul(3))
                .collect_vec()
                .await
                .unwrap();
            composed == fused
        })
    }
    quickcheck(prop as fn(Vec<i32>) -> bool);
}

#[test]
fn prop_chain_is_associative() {
    fn prop(a: Vec<i32>, b: Vec<i32>, c: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let left = from_iter::<_, StreamError>(a.clone())
                .chain(from_iter(b.clone()))
                .chain(from_iter(c.clone()))
                .collect_vec()
                .await
                .unwrap();
            let right = from_iter::<_, StreamError>(a)
                .chain(from_iter(b).chain(from_iter(c)))
                .collect_vec()
                .await
                .unwrap();
            left == right
        })
    }
    quickcheck(prop as fn(Vec<i32>, Vec<i32>, Vec<i32>) -> bool);
}

#[test]
fn prop_take_skip_complement() {
    fn prop(xs: Vec<i32>, n: usize) -> bool {
        let n = if xs.is_empty() { 0 } else { n % (xs.len() + 1) };
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let taken = from_iter::<_, StreamError>(xs.clone())
                .take(n)
                .collect_vec()
                .await
                .unwrap();
            let skipped = from_iter::<_, StreamError>(xs.clone())
                .skip(n)
                .collect_vec()
                .await
                .unwrap();
            let mut recombined = taken;
            recombined.extend(skipped);
            recombined == xs
        })
    }
    quickcheck(prop as fn(Vec<i32>, usize) -> bool);
}

#[test]
fn prop_zip_with_index_enumerates() {
    fn prop(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let indexed = from_iter::<_, StreamError>(xs.clone())
                .zip_with_index()
                .collect_vec()
                .await
                .unwrap();
            let expected: Vec<(i32, usize)> =
                xs.into_iter().enumerate().map(|(i, a)| (a, i)).collect();
            indexed == expected
        })
    }
    quickcheck(prop as fn(Vec<i32>) -> bool);
}

#[test]
fn prop_zip_truncates_to_min_length() {
    fn prop(a: Vec<i32>, b: Vec<i32>) -> bool {
        let expected = a.len().min(b.len());
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let pairs = from_iter::<_, StreamError>(a)
                .zip(from_iter::<_, StreamError>(b))
                .collect_vec()
                .await
                .unwrap();
            pairs.len() == expected
        })
    }
    quickcheck(prop as fn(Vec<i32>, Vec<i32>) -> bool);
}

#[test]
fn prop_merge_is_a_multiset_union() {
    fn prop(a: Vec<i32>, b: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let mut merged = from_iter::<_, StreamError>(a.clone())
                .merge(from_iter::<_, StreamError>(b.clone()))
                .collect_vec()
                .await
                .unwrap();
            let mut expected = a;
            expected.extend(b);
            merged.sort_unstable();
            expected.sort_unstable();
            merged == expected
        })
    }
    quickcheck(prop as fn(Vec<i32>, Vec<i32>) -> bool);
}

#[test]
fn prop_filter_partitions_with_filter_not() {
    fn prop(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let kept = from_iter::<_, StreamError>(xs.clone())
                .filter(|x| x % 2 == 0)
                .collect_vec()
                .await
                .unwrap();
            let dropped = from_iter::<_, StreamError>(xs.clone())
                .filter_not(|x| x % 2 == 0)
                .collect_vec()
                .await
                .unwrap();
            kept.len() + dropped.len() == xs.len()
        })
    }
    quickcheck(prop as fn(Vec<i32>) -> bool);
}

#[test]
fn prop_pure_fold_agrees_with_effectful() {
    fn prop(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let effectful = from_iter::<_, StreamError>(xs.clone())
                .collect_vec()
                .await
                .unwrap();
            let pure = from_iter::<_, StreamError>(xs).collect_pure();
            effectful == pure
        })
    }
    quickcheck(prop as fn(Vec<i32>) -> bool);
}
