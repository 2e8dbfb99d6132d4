//! Pure-stream specialization.
//!
//! Streams built from pure constructors can answer a synchronous,
//! non-failing fold in addition to the effectful one. Both folds are
//! required to produce the same element sequence; consumers may fast-path
//! on `fold_pure` to skip the async machinery entirely.

use super::constructors::{Empty, Iter, Once, Range, Unfold};
use super::core::Stream;
use crate::step::Step;

/// A stream whose elements can also be folded synchronously, with no
/// suspension and no failure.
pub trait StreamPure: Stream {
    /// Synchronous fold, producing the same element sequence as
    /// [`Stream::fold`].
    fn fold_pure<S, F>(self, init: S, step: F) -> Step<S>
    where
        F: FnMut(S, Self::Item) -> Step<S>;

    /// Collect every element without touching the effect runtime.
    fn collect_pure(self) -> Vec<Self::Item> {
        self.fold_pure(Vec::new(), |mut acc, a| {
            acc.push(a);
            Step::Cont(acc)
        })
        .extract()
    }
}

impl<A, E> StreamPure for Empty<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    fn fold_pure<S, F>(self, init: S, _step: F) -> Step<S>
    where
        F: FnMut(S, A) -> Step<S>,
    {
        Step::Cont(init)
    }
}

impl<A, E> StreamPure for Once<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    fn fold_pure<S, F>(self, init: S, mut step: F) -> Step<S>
    where
        F: FnMut(S, A) -> Step<S>,
    {
        step(init, self.value)
    }
}

impl<I, E> StreamPure for Iter<I, E>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
    E: Send + 'static,
{
    fn fold_pure<S, F>(self, init: S, mut step: F) -> Step<S>
    where
        F: FnMut(S, I::Item) -> Step<S>,
    {
        let mut state = Step::Cont(init);
        for a in self.iter {
            match state {
                Step::Cont(s) => state = step(s, a),
                Step::Stop(_) => break,
            }
        }
        state
    }
}

impl<Z, A, F0, E> StreamPure for Unfold<Z, F0, E>
where
    Z: Send,
    A: Send + 'static,
    F0: FnMut(Z) -> Option<(A, Z)> + Send,
    E: Send + 'static,
{
    fn fold_pure<S, F>(self, init: S, mut step: F) -> Step<S>
    where
        F: FnMut(S, A) -> Step<S>,
    {
        let mut f = self.f;
        let mut z = self.state;
        let mut state = Step::Cont(init);
        loop {
            match state {
                stopped @ Step::Stop(_) => return stopped,
                Step::Cont(s) => match f(z) {
                    None => return Step::Cont(s),
                    Some((a, next)) => {
                        z = next;
                        state = step(s, a);
                    }
                },
            }
        }
    }
}

impl<E> StreamPure for Range<E>
where
    E: Send + 'static,
{
    fn fold_pure<S, F>(self, init: S, mut step: F) -> Step<S>
    where
        F: FnMut(S, i32) -> Step<S>,
    {
        let mut state = Step::Cont(init);
        let mut i = self.current;
        while i <= self.max {
            match state {
                Step::Cont(s) => {
                    state = step(s, i);
                    i += 1;
                }
                Step::Stop(_) => break,
            }
        }
        state
    }
}
