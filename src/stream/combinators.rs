//! Sequential stream combinators.
//!
//! Every combinator here is a plain struct delegating to its source's fold.
//! None of them fork; emission order is always preserved, a downstream
//! `Stop` is always authoritative, and a failure in any effectful step
//! short-circuits the whole fold with the same error.

use std::future::Future;
use std::marker::PhantomData;

use futures_util::future::{self, Either};

use super::core::{feed, Stream};
use crate::step::Step;

// ================================
// Combinator structs
// ================================

#[derive(Clone)]
pub struct Map<S, B, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<B>,
}

impl<S, B, F> Stream for Map<S, B, F>
where
    S: Stream,
    B: Send + 'static,
    F: FnMut(S::Item) -> B + Send,
{
    type Item = B;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        self.stream.fold(init, move |s, a| step(s, f(a))).await
    }
}

#[derive(Clone)]
pub struct Filter<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, F> Stream for Filter<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool + Send,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut p = self.f;
        self.stream
            .fold(init, move |s, a| {
                if p(&a) {
                    Either::Left(step(s, a))
                } else {
                    Either::Right(future::ready(Ok(Step::Cont(s))))
                }
            })
            .await
    }
}

#[derive(Clone)]
pub struct FilterNot<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, F> Stream for FilterNot<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool + Send,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut p = self.f;
        self.stream
            .fold(init, move |s, a| {
                if p(&a) {
                    Either::Right(future::ready(Ok(Step::Cont(s))))
                } else {
                    Either::Left(step(s, a))
                }
            })
            .await
    }
}

#[derive(Clone)]
pub struct FilterMap<S, B, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<B>,
}

impl<S, B, F> Stream for FilterMap<S, B, F>
where
    S: Stream,
    B: Send + 'static,
    F: FnMut(S::Item) -> Option<B> + Send,
{
    type Item = B;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        self.stream
            .fold(init, move |s, a| match f(a) {
                Some(b) => Either::Left(step(s, b)),
                None => Either::Right(future::ready(Ok(Step::Cont(s)))),
            })
            .await
    }
}

#[derive(Clone)]
pub struct MapConcat<S, I, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<I>,
}

impl<S, I, F> Stream for MapConcat<S, I, F>
where
    S: Stream,
    I: IntoIterator + Send,
    I::IntoIter: Send,
    I::Item: Send + 'static,
    F: FnMut(S::Item) -> I + Send,
{
    type Item = I::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, I::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((init, step), move |(s, mut step), a| {
                let items = f(a).into_iter();
                async move {
                    let mut current = Step::Cont(s);
                    for b in items {
                        match current {
                            Step::Cont(s1) => current = step(s1, b).await?,
                            Step::Stop(s1) => {
                                current = Step::Stop(s1);
                                break;
                            }
                        }
                    }
                    Ok(current.map(|s| (s, step)))
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct FlatMap<S, R, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<R>,
}

impl<S, R, F> Stream for FlatMap<S, R, F>
where
    S: Stream,
    R: Stream<Error = S::Error>,
    F: FnMut(S::Item) -> R + Send,
{
    type Item = R::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, R::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((init, step), move |(s, step), a| {
                let inner = f(a);
                async move {
                    let (done, step) = feed(inner, s, step).await?;
                    Ok(done.map(|s| (s, step)))
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct Chain<S1, S2> {
    pub(crate) first: S1,
    pub(crate) second: S2,
}

impl<S1, S2> Stream for Chain<S1, S2>
where
    S1: Stream,
    S2: Stream<Item = S1::Item, Error = S1::Error>,
{
    type Item = S1::Item;
    type Error = S1::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S1::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let (first, step) = feed(self.first, init, step).await?;
        match first {
            // Stop in the first stream short-circuits the second.
            Step::Stop(s) => Ok(Step::Stop(s)),
            Step::Cont(s) => {
                let (second, _) = feed(self.second, s, step).await?;
                Ok(second)
            }
        }
    }
}

#[derive(Clone)]
pub struct Flatten<S> {
    pub(crate) stream: S,
}

impl<S> Stream for Flatten<S>
where
    S: Stream,
    S::Item: Stream<Error = S::Error>,
{
    type Item = <S::Item as Stream>::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let end = self
            .stream
            .fold((init, step), |(s, step), inner| async move {
                let (done, step) = feed(inner, s, step).await?;
                Ok(done.map(|s| (s, step)))
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct SkipWhile<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, F> Stream for SkipWhile<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool + Send,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut p = self.f;
        let end = self
            .stream
            .fold(
                (true, init, step),
                move |(skipping, s, mut step), a| {
                    if skipping && p(&a) {
                        Either::Left(future::ready(Ok(Step::Cont((true, s, step)))))
                    } else {
                        // Once disabled, skipping never re-enables.
                        Either::Right(async move {
                            Ok(step(s, a).await?.map(|s| (false, s, step)))
                        })
                    }
                },
            )
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct TakeWhile<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, F> Stream for TakeWhile<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> bool + Send,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut p = self.f;
        let end = self
            .stream
            .fold((init, step), move |(s, mut step), a| {
                if p(&a) {
                    Either::Left(async move { Ok(step(s, a).await?.map(|s| (s, step))) })
                } else {
                    Either::Right(future::ready(Ok(Step::Stop((s, step)))))
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct Skip<S> {
    pub(crate) stream: S,
    pub(crate) n: usize,
}

impl<S> Stream for Skip<S>
where
    S: Stream,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let end = self
            .stream
            .fold(
                (self.n, init, step),
                |(remaining, s, mut step), a| {
                    if remaining > 0 {
                        Either::Left(future::ready(Ok(Step::Cont((remaining - 1, s, step)))))
                    } else {
                        Either::Right(async move {
                            Ok(step(s, a).await?.map(|s| (0usize, s, step)))
                        })
                    }
                },
            )
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct Take<S> {
    pub(crate) stream: S,
    pub(crate) n: usize,
}

impl<S> Stream for Take<S>
where
    S: Stream,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let n = self.n;
        if n == 0 {
            // Stop on the first arrival without consuming it.
            return self.stream.fold(init, |s, _| future::ready(Ok(Step::Stop(s)))).await;
        }
        let end = self
            .stream
            .fold((0usize, init, step), move |(taken, s, mut step), a| async move {
                let next = step(s, a).await?;
                Ok(match next {
                    Step::Stop(s) => Step::Stop((taken, s, step)),
                    Step::Cont(s) => {
                        // Stop right after the n-th element; no over-pull.
                        if taken + 1 >= n {
                            Step::Stop((taken + 1, s, step))
                        } else {
                            Step::Cont((taken + 1, s, step))
                        }
                    }
                })
            })
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct ZipWithIndex<S> {
    pub(crate) stream: S,
}

impl<S> Stream for ZipWithIndex<S>
where
    S: Stream,
{
    type Item = (S::Item, usize);
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, (S::Item, usize)) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let end = self
            .stream
            .fold((0usize, init, step), |(i, s, mut step), a| async move {
                Ok(step(s, (a, i)).await?.map(|s| (i + 1, s, step)))
            })
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct Scan<S, Z, F> {
    pub(crate) stream: S,
    pub(crate) init: Z,
    pub(crate) f: F,
}

impl<S, Z, B, F> Stream for Scan<S, Z, F>
where
    S: Stream,
    Z: Send,
    B: Send + 'static,
    F: FnMut(Z, S::Item) -> (Z, B) + Send,
{
    type Item = B;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((self.init, init, step), move |(z, s, mut step), a| {
                let (z, b) = f(z, a);
                async move { Ok(step(s, b).await?.map(|s| (z, s, step))) }
            })
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct EvalScan<S, Z, F> {
    pub(crate) stream: S,
    pub(crate) init: Z,
    pub(crate) f: F,
}

impl<S, Z, B, F, Fut0> Stream for EvalScan<S, Z, F>
where
    S: Stream,
    Z: Send,
    B: Send + 'static,
    F: FnMut(Z, S::Item) -> Fut0 + Send,
    Fut0: Future<Output = Result<(Z, B), S::Error>> + Send,
{
    type Item = B;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((self.init, init, step), move |(z, s, mut step), a| {
                let fut = f(z, a);
                async move {
                    let (z, b) = fut.await?;
                    Ok(step(s, b).await?.map(|s| (z, s, step)))
                }
            })
            .await?;
        Ok(end.map(|(_, s, _)| s))
    }
}

#[derive(Clone)]
pub struct EvalMap<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, B, F, Fut0> Stream for EvalMap<S, F>
where
    S: Stream,
    B: Send + 'static,
    F: FnMut(S::Item) -> Fut0 + Send,
    Fut0: Future<Output = Result<B, S::Error>> + Send,
{
    type Item = B;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((init, step), move |(s, mut step), a| {
                let fut = f(a);
                async move {
                    let b = fut.await?;
                    Ok(step(s, b).await?.map(|s| (s, step)))
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct EvalTap<S, F> {
    pub(crate) stream: S,
    pub(crate) f: F,
}

impl<S, F, Fut0> Stream for EvalTap<S, F>
where
    S: Stream,
    F: FnMut(&S::Item) -> Fut0 + Send,
    Fut0: Future<Output = Result<(), S::Error>> + Send,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut f = self.f;
        let end = self
            .stream
            .fold((init, step), move |(s, mut step), a| {
                // The effect runs before the element reaches downstream.
                let fut = f(&a);
                async move {
                    fut.await?;
                    Ok(step(s, a).await?.map(|s| (s, step)))
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

#[derive(Clone)]
pub struct Forever<S> {
    pub(crate) stream: S,
}

impl<S> Stream for Forever<S>
where
    S: Stream + Clone,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let mut s = init;
        let mut step = step;
        loop {
            let (done, next_step) = feed(self.stream.clone(), s, step).await?;
            step = next_step;
            match done {
                Step::Cont(s1) => s = s1,
                Step::Stop(s1) => return Ok(Step::Stop(s1)),
            }
        }
    }
}

// ================================
// Extension Trait
// ================================

/// Sequential combinators on any [`Stream`].
pub trait StreamExt: Stream {
    /// Transform every element with `f`, in order.
    fn map<B, F>(self, f: F) -> Map<Self, B, F>
    where
        B: Send + 'static,
        F: FnMut(Self::Item) -> B + Send,
    {
        Map {
            stream: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Keep only elements satisfying `f`.
    fn filter<F>(self, f: F) -> Filter<Self, F>
    where
        F: FnMut(&Self::Item) -> bool + Send,
    {
        Filter { stream: self, f }
    }

    /// Keep only elements *not* satisfying `f`.
    fn filter_not<F>(self, f: F) -> FilterNot<Self, F>
    where
        F: FnMut(&Self::Item) -> bool + Send,
    {
        FilterNot { stream: self, f }
    }

    /// Filter and map in one partial projection.
    fn filter_map<B, F>(self, f: F) -> FilterMap<Self, B, F>
    where
        B: Send + 'static,
        F: FnMut(Self::Item) -> Option<B> + Send,
    {
        FilterMap {
            stream: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Emit every element of `f(a)` in order, for each upstream `a`.
    fn map_concat<I, F>(self, f: F) -> MapConcat<Self, I, F>
    where
        I: IntoIterator,
        I::IntoIter: Send,
        I::Item: Send + 'static,
        F: FnMut(Self::Item) -> I + Send,
    {
        MapConcat {
            stream: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Concatenate the streams produced by `f`, each run to completion or
    /// early stop.
    fn flat_map<R, F>(self, f: F) -> FlatMap<Self, R, F>
    where
        R: Stream<Error = Self::Error>,
        F: FnMut(Self::Item) -> R + Send,
    {
        FlatMap {
            stream: self,
            f,
            _phantom: PhantomData,
        }
    }

    /// Emit this stream, then `other`. A stop in this stream
    /// short-circuits `other`.
    fn chain<S2>(self, other: S2) -> Chain<Self, S2>
    where
        S2: Stream<Item = Self::Item, Error = Self::Error>,
    {
        Chain {
            first: self,
            second: other,
        }
    }

    /// Concatenate a stream of streams.
    fn flatten(self) -> Flatten<Self>
    where
        Self::Item: Stream<Error = Self::Error>,
    {
        Flatten { stream: self }
    }

    /// Drop the longest prefix satisfying `f`; once an element fails the
    /// predicate, everything after it is emitted.
    fn skip_while<F>(self, f: F) -> SkipWhile<Self, F>
    where
        F: FnMut(&Self::Item) -> bool + Send,
    {
        SkipWhile { stream: self, f }
    }

    /// Emit the longest prefix satisfying `f`; the first failing element
    /// stops the stream and is not emitted.
    fn take_while<F>(self, f: F) -> TakeWhile<Self, F>
    where
        F: FnMut(&Self::Item) -> bool + Send,
    {
        TakeWhile { stream: self, f }
    }

    /// Drop exactly the first `n` elements. `skip(0)` drops none.
    fn skip(self, n: usize) -> Skip<Self> {
        Skip { stream: self, n }
    }

    /// Emit the first `n` elements, then stop. `take(0)` is empty.
    fn take(self, n: usize) -> Take<Self> {
        Take { stream: self, n }
    }

    /// Pair every element with its 0-based emission index.
    fn zip_with_index(self) -> ZipWithIndex<Self> {
        ZipWithIndex { stream: self }
    }

    /// Stateful map: thread `Z` through `f`, emitting the produced values.
    fn scan<Z, B, F>(self, init: Z, f: F) -> Scan<Self, Z, F>
    where
        Z: Send,
        B: Send + 'static,
        F: FnMut(Z, Self::Item) -> (Z, B) + Send,
    {
        Scan {
            stream: self,
            init,
            f,
        }
    }

    /// Effectful [`scan`](StreamExt::scan).
    fn eval_scan<Z, B, F, Fut>(self, init: Z, f: F) -> EvalScan<Self, Z, F>
    where
        Z: Send,
        B: Send + 'static,
        F: FnMut(Z, Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<(Z, B), Self::Error>> + Send,
    {
        EvalScan {
            stream: self,
            init,
            f,
        }
    }

    /// Transform every element through an effect, preserving order.
    fn eval_map<B, F, Fut>(self, f: F) -> EvalMap<Self, F>
    where
        B: Send + 'static,
        F: FnMut(Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<B, Self::Error>> + Send,
    {
        EvalMap { stream: self, f }
    }

    /// Run an effect for every element before it is passed downstream.
    fn eval_tap<F, Fut>(self, f: F) -> EvalTap<Self, F>
    where
        F: FnMut(&Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<(), Self::Error>> + Send,
    {
        EvalTap { stream: self, f }
    }

    /// Replay the stream indefinitely; only a downstream stop or a failure
    /// terminates it.
    fn forever(self) -> Forever<Self>
    where
        Self: Clone,
    {
        Forever { stream: self }
    }
}

impl<S> StreamExt for S where S: Stream {}
