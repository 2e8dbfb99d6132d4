//! Incremental consumers.
//!
//! A `Sink` folds elements into a state until it declares itself done,
//! possibly returning leftover inputs it did not consume. Streams are run
//! against sinks with [`run`](crate::stream::Stream::run), chunk-wise with
//! [`transduce`](crate::stream::SinkStreamExt::transduce), or split with
//! [`peel`](crate::stream::SinkStreamExt::peel).

use std::future::Future;
use std::marker::PhantomData;

/// Outcome of feeding one input to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkStep<S, A> {
    /// The sink wants more input.
    Cont(S),
    /// The sink is complete; unconsumed inputs are returned as leftovers.
    Done(S, Vec<A>),
}

impl<S, A> SinkStep<S, A> {
    pub fn is_cont(&self) -> bool {
        matches!(self, SinkStep::Cont(_))
    }

    pub fn is_done(&self) -> bool {
        matches!(self, SinkStep::Done(..))
    }

    /// Project the state, discarding leftovers.
    pub fn into_state(self) -> S {
        match self {
            SinkStep::Cont(s) => s,
            SinkStep::Done(s, _) => s,
        }
    }
}

/// An incremental consumer with state `State`, producing `Output`.
pub trait Sink: Send + Sync {
    type Input: Send + 'static;
    type Output: Send + 'static;
    type Error: Send + 'static;
    type State: Send + 'static;

    /// The state the sink starts from. A sink may be born complete.
    fn initial(&self) -> Result<SinkStep<Self::State, Self::Input>, Self::Error>;

    /// Feed one input.
    fn step(
        &self,
        state: Self::State,
        input: Self::Input,
    ) -> impl Future<Output = Result<SinkStep<Self::State, Self::Input>, Self::Error>> + Send;

    /// Produce the result from a final state.
    fn extract(&self, state: Self::State) -> Result<Self::Output, Self::Error>;

    /// Feed a chunk of inputs, stopping at the first `Done`. Inputs left
    /// unconsumed are appended to the sink's own leftovers.
    fn step_chunk(
        &self,
        state: Self::State,
        chunk: Vec<Self::Input>,
    ) -> impl Future<Output = Result<SinkStep<Self::State, Self::Input>, Self::Error>> + Send {
        async move {
            let mut current = SinkStep::Cont(state);
            let mut inputs = chunk.into_iter();
            loop {
                match current {
                    SinkStep::Cont(s) => match inputs.next() {
                        Some(a) => current = self.step(s, a).await?,
                        None => return Ok(SinkStep::Cont(s)),
                    },
                    SinkStep::Done(s, mut leftover) => {
                        leftover.extend(inputs);
                        return Ok(SinkStep::Done(s, leftover));
                    }
                }
            }
        }
    }
}

// ================================
// Basic Sinks
// ================================

/// Collects every input into a `Vec`. Never completes early.
pub struct CollectAll<A, E> {
    _marker: PhantomData<fn() -> (A, E)>,
}

/// Collect every input into a `Vec`.
pub fn collect_all<A, E>() -> CollectAll<A, E> {
    CollectAll {
        _marker: PhantomData,
    }
}

impl<A, E> Sink for CollectAll<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Input = A;
    type Output = Vec<A>;
    type Error = E;
    type State = Vec<A>;

    fn initial(&self) -> Result<SinkStep<Vec<A>, A>, E> {
        Ok(SinkStep::Cont(Vec::new()))
    }

    async fn step(&self, mut state: Vec<A>, input: A) -> Result<SinkStep<Vec<A>, A>, E> {
        state.push(input);
        Ok(SinkStep::Cont(state))
    }

    fn extract(&self, state: Vec<A>) -> Result<Vec<A>, E> {
        Ok(state)
    }
}

/// Collects exactly `n` inputs, then completes with no leftover.
pub struct CollectN<A, E> {
    n: usize,
    _marker: PhantomData<fn() -> (A, E)>,
}

/// Collect the first `n` inputs into a `Vec`.
pub fn collect_n<A, E>(n: usize) -> CollectN<A, E> {
    CollectN {
        n,
        _marker: PhantomData,
    }
}

impl<A, E> Sink for CollectN<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Input = A;
    type Output = Vec<A>;
    type Error = E;
    type State = Vec<A>;

    fn initial(&self) -> Result<SinkStep<Vec<A>, A>, E> {
        if self.n == 0 {
            Ok(SinkStep::Done(Vec::new(), Vec::new()))
        } else {
            Ok(SinkStep::Cont(Vec::new()))
        }
    }

    async fn step(&self, mut state: Vec<A>, input: A) -> Result<SinkStep<Vec<A>, A>, E> {
        state.push(input);
        if state.len() >= self.n {
            Ok(SinkStep::Done(state, Vec::new()))
        } else {
            Ok(SinkStep::Cont(state))
        }
    }

    fn extract(&self, state: Vec<A>) -> Result<Vec<A>, E> {
        Ok(state)
    }
}

/// Completes on the first input.
pub struct Head<A, E> {
    _marker: PhantomData<fn() -> (A, E)>,
}

/// Take the first input, if any.
pub fn head<A, E>() -> Head<A, E> {
    Head {
        _marker: PhantomData,
    }
}

impl<A, E> Sink for Head<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Input = A;
    type Output = Option<A>;
    type Error = E;
    type State = Option<A>;

    fn initial(&self) -> Result<SinkStep<Option<A>, A>, E> {
        Ok(SinkStep::Cont(None))
    }

    async fn step(&self, _state: Option<A>, input: A) -> Result<SinkStep<Option<A>, A>, E> {
        Ok(SinkStep::Done(Some(input), Vec::new()))
    }

    fn extract(&self, state: Option<A>) -> Result<Option<A>, E> {
        Ok(state)
    }
}

/// Discards every input.
pub struct Drain<A, E> {
    _marker: PhantomData<fn() -> (A, E)>,
}

/// Consume and discard every input.
pub fn drain<A, E>() -> Drain<A, E> {
    Drain {
        _marker: PhantomData,
    }
}

impl<A, E> Sink for Drain<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Input = A;
    type Output = ();
    type Error = E;
    type State = ();

    fn initial(&self) -> Result<SinkStep<(), A>, E> {
        Ok(SinkStep::Cont(()))
    }

    async fn step(&self, _state: (), _input: A) -> Result<SinkStep<(), A>, E> {
        Ok(SinkStep::Cont(()))
    }

    fn extract(&self, _state: ()) -> Result<(), E> {
        Ok(())
    }
}
