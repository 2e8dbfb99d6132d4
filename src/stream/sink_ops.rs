//! Sink integration: transduce and peel.

use std::future::Future;

use super::bridge::{spawn_source, TaskGuard};
use super::core::Stream;
use crate::queue::Queue;
use crate::sink::{Sink, SinkStep};
use crate::step::Step;
use crate::take::Take;

/// Runs a sink repeatedly over the stream, emitting one output per sink
/// completion.
pub struct Transduce<S, K> {
    pub(crate) stream: S,
    pub(crate) sink: K,
}

impl<S, K> Stream for Transduce<S, K>
where
    S: Stream,
    K: Sink<Input = S::Item, Error = S::Error>,
{
    type Item = K::Output;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, K::Output) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let sink = self.sink;
        let sink_ref = &sink;
        let sink_init = sink_ref.initial()?;
        let end = self
            .stream
            .fold(
                (sink_init, init, step),
                move |(sink_state, s, mut step), a| async move {
                    let mut s = s;
                    let mut sink_state = sink_state;
                    let mut pending = Some(a);
                    loop {
                        match sink_state {
                            SinkStep::Cont(state) => match pending.take() {
                                Some(a) => sink_state = sink_ref.step(state, a).await?,
                                None => {
                                    return Ok(Step::Cont((SinkStep::Cont(state), s, step)))
                                }
                            },
                            SinkStep::Done(state, leftover) => {
                                let output = sink_ref.extract(state)?;
                                match step(s, output).await? {
                                    Step::Stop(next) => {
                                        return Ok(Step::Stop((sink_ref.initial()?, next, step)))
                                    }
                                    Step::Cont(next) => {
                                        // Restart the sink, seeded with the
                                        // leftovers of the completed run.
                                        s = next;
                                        sink_state = match sink_ref.initial()? {
                                            SinkStep::Cont(state) => {
                                                sink_ref.step_chunk(state, leftover).await?
                                            }
                                            SinkStep::Done(state, mut rest) => {
                                                rest.extend(leftover);
                                                SinkStep::Done(state, rest)
                                            }
                                        };
                                    }
                                }
                            }
                        }
                    }
                },
            )
            .await?;
        // A sink still mid-accumulation when the source runs out is
        // discarded: no partial output is emitted.
        Ok(end.map(|(_, s, _)| s))
    }
}

/// The tail of a peeled stream: the sink's leftovers followed by whatever
/// the source produces next.
///
/// Valid only while it is alive: dropping it (or finishing its fold) aborts
/// the background producer. It can be attached exactly once, which is what
/// consuming `self` in `fold` enforces.
pub struct PeelTail<E, A> {
    pub(crate) leftover: std::vec::IntoIter<A>,
    pub(crate) queue: Queue<Take<E, A>>,
    pub(crate) _guard: TaskGuard,
}

impl<E, A> Stream for PeelTail<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut state = Step::Cont(init);
        for a in self.leftover {
            match state {
                Step::Cont(s) => state = step(s, a).await?,
                Step::Stop(_) => return Ok(state),
            }
        }
        loop {
            match state {
                stopped @ Step::Stop(_) => return Ok(stopped),
                Step::Cont(s) => match self.queue.take().await {
                    None | Some(Take::End) => return Ok(Step::Cont(s)),
                    Some(Take::Value(a)) => state = step(s, a).await?,
                    Some(Take::Fail(e)) => return Err(e),
                },
            }
        }
    }
}

pub(crate) async fn peel<S, K>(
    stream: S,
    sink: K,
) -> Result<(K::Output, PeelTail<S::Error, S::Item>), S::Error>
where
    S: Stream + 'static,
    K: Sink<Input = S::Item, Error = S::Error>,
{
    let queue: Queue<Take<S::Error, S::Item>> = Queue::bounded(1);
    let guard = spawn_source(stream, queue.clone(), |take| take);
    let mut state = sink.initial()?;
    let (output, leftover) = loop {
        match state {
            SinkStep::Done(s, leftover) => break (sink.extract(s)?, leftover),
            SinkStep::Cont(s) => match queue.take().await {
                // Source exhausted before the sink completed: extract what
                // it has, leaving an empty tail.
                None | Some(Take::End) => break (sink.extract(s)?, Vec::new()),
                Some(Take::Fail(e)) => return Err(e),
                Some(Take::Value(a)) => state = sink.step(s, a).await?,
            },
        }
    };
    Ok((
        output,
        PeelTail {
            leftover: leftover.into_iter(),
            queue,
            _guard: guard,
        },
    ))
}

/// Sink-driven stream surgery.
pub trait SinkStreamExt: Stream {
    /// Feed elements through `sink` over and over, emitting one output per
    /// completed sink run; each run restarts seeded with the previous run's
    /// leftovers. A run still in progress when the stream ends is discarded
    /// without emitting.
    fn transduce<K>(self, sink: K) -> Transduce<Self, K>
    where
        K: Sink<Input = Self::Item, Error = Self::Error>,
    {
        Transduce { stream: self, sink }
    }

    /// Split the stream: the head is consumed by `sink` until it completes,
    /// and the remainder (the sink's leftovers plus everything unread) is
    /// handed back as a new stream. No element is duplicated or dropped
    /// across the handover.
    fn peel<K>(
        self,
        sink: K,
    ) -> impl Future<Output = Result<(K::Output, PeelTail<Self::Error, Self::Item>), Self::Error>> + Send
    where
        Self: 'static,
        K: Sink<Input = Self::Item, Error = Self::Error>,
    {
        peel(self, sink)
    }
}

impl<S> SinkStreamExt for S where S: Stream {}
