//! The fold protocol: the single contract every stream answers.
//!
//! A stream is any value that can drive an effectful fold: given a caller-
//! chosen carrier and a step function, it passes every produced element
//! through the step in emission order, threading the carrier, and honours
//! the step's early-exit signal. Every combinator in this crate is written
//! against this one method; there is no `poll_next` and no buffering behind
//! the caller's back.
//!
//! The carrier is polymorphic per fold invocation, so a stream can never
//! inspect or retain it. Combinators that need to run their own effects
//! between the upstream element and the downstream step thread the step
//! function *through the carrier* (see `feed`); this keeps every closure's
//! returned future self-contained, which is what the `fold` signature
//! demands.

use std::future::Future;

use futures_util::future::{self, Either};
use futures_util::TryFutureExt;

use crate::sink::{Sink, SinkStep};
use crate::step::Step;

/// An effectful, pull-based stream of `Item`s with typed error channel
/// `Error`, defined by its fold.
///
/// Contract:
/// - every produced element is passed to the step function in emission
///   order;
/// - emission ceases and `Stop(s)` is returned as soon as any step returns
///   [`Step::Stop`];
/// - on end-of-stream the fold returns `Cont(s)` and nothing is emitted
///   afterwards;
/// - resources acquired to produce elements are released on every exit:
///   early stop, exhaustion, failure, or cancellation.
pub trait Stream: Sized + Send {
    type Item: Send + 'static;
    type Error: Send + 'static;

    /// Drive the stream with seed `init`, passing each element to `step`.
    fn fold<S, F, Fut>(
        self,
        init: S,
        step: F,
    ) -> impl Future<Output = Result<Step<S>, Self::Error>> + Send
    where
        S: Send,
        F: FnMut(S, Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<S>, Self::Error>> + Send;

    /// Early-exit fold: elements are consumed only while `cont` holds for
    /// the current carrier. The moment it returns false the fold stops and
    /// the carrier is returned; the element that triggered the check is not
    /// consumed.
    fn fold_while<S, C, F, Fut>(
        self,
        init: S,
        mut cont: C,
        mut step: F,
    ) -> impl Future<Output = Result<S, Self::Error>> + Send
    where
        S: Send,
        C: FnMut(&S) -> bool + Send,
        F: FnMut(S, Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<S, Self::Error>> + Send,
    {
        async move {
            if !cont(&init) {
                return Ok(init);
            }
            let end = self
                .fold(init, move |s, a| {
                    if cont(&s) {
                        Either::Left(step(s, a).map_ok(Step::Cont))
                    } else {
                        Either::Right(future::ready(Ok(Step::Stop(s))))
                    }
                })
                .await?;
            Ok(end.extract())
        }
    }

    /// Pure, non-failing accumulation over the whole stream.
    fn fold_left<S, F>(
        self,
        init: S,
        mut f: F,
    ) -> impl Future<Output = Result<S, Self::Error>> + Send
    where
        S: Send,
        F: FnMut(S, Self::Item) -> S + Send,
    {
        self.fold_while(init, |_| true, move |s, a| future::ready(Ok(f(s, a))))
    }

    /// Run `f` for every element, in order.
    fn for_each<F, Fut>(self, mut f: F) -> impl Future<Output = Result<(), Self::Error>> + Send
    where
        F: FnMut(Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<(), Self::Error>> + Send,
    {
        async move {
            self.fold((), move |(), a| f(a).map_ok(|()| Step::Cont(())))
                .await?;
            Ok(())
        }
    }

    /// Run `f` for every element until it answers `false`; the stream is
    /// stopped at that point.
    fn for_each_while<F, Fut>(
        self,
        mut f: F,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send
    where
        F: FnMut(Self::Item) -> Fut + Send,
        Fut: Future<Output = Result<bool, Self::Error>> + Send,
    {
        async move {
            self.fold((), move |(), a| {
                f(a).map_ok(|more| if more { Step::Cont(()) } else { Step::Stop(()) })
            })
            .await?;
            Ok(())
        }
    }

    /// Collect every element into a `Vec`.
    fn collect_vec(self) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send {
        self.fold_left(Vec::new(), |mut acc, a| {
            acc.push(a);
            acc
        })
    }

    /// Run the stream against a sink, stopping as soon as the sink is done,
    /// and extract its result. Leftovers reported by the sink are dropped;
    /// use [`peel`](super::SinkStreamExt::peel) to keep the remainder.
    fn run<K>(self, sink: K) -> impl Future<Output = Result<K::Output, Self::Error>> + Send
    where
        K: Sink<Input = Self::Item, Error = Self::Error>,
    {
        async move {
            let init = sink.initial()?;
            let sink_ref = &sink;
            let end = self
                .fold_while(init, SinkStep::is_cont, move |sink_step, a| {
                    sink_ref.step(sink_step.into_state(), a)
                })
                .await?;
            sink.extract(end.into_state())
        }
    }
}

/// Run `source` to completion (or early stop) against a downstream step
/// function, threading the step through the carrier so it can be handed
/// back to the caller for further use.
pub(crate) async fn feed<Src, T, St, Fut>(
    source: Src,
    init: T,
    step: St,
) -> Result<(Step<T>, St), Src::Error>
where
    Src: Stream,
    T: Send,
    St: FnMut(T, Src::Item) -> Fut + Send,
    Fut: Future<Output = Result<Step<T>, Src::Error>> + Send,
{
    let end = source
        .fold((init, step), |(s, mut step), a| async move {
            Ok(step(s, a).await?.map(|s| (s, step)))
        })
        .await?;
    Ok(match end {
        Step::Cont((s, step)) => (Step::Cont(s), step),
        Step::Stop((s, step)) => (Step::Stop(s), step),
    })
}
