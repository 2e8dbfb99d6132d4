//! Schedule-driven repetition.

use std::future::Future;

use tokio::time::sleep;

use super::core::{feed, Stream};
use crate::schedule::Schedule;
use crate::step::Step;

/// Replays the whole stream as long as the schedule allows, pausing between
/// runs as the schedule prescribes.
#[derive(Clone)]
pub struct Repeat<S> {
    pub(crate) stream: S,
    pub(crate) schedule: Schedule,
}

impl<S> Stream for Repeat<S>
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
        let mut schedule_state = self.schedule.initial();
        loop {
            let (done, next_step) = feed(self.stream.clone(), s, step).await?;
            step = next_step;
            match done {
                Step::Stop(next) => return Ok(Step::Stop(next)),
                Step::Cont(next) => {
                    s = next;
                    let decision = self.schedule.update(schedule_state);
                    if !decision.cont {
                        return Ok(Step::Cont(s));
                    }
                    if !decision.delay.is_zero() {
                        sleep(decision.delay).await;
                    }
                    schedule_state = decision.state;
                }
            }
        }
    }
}

/// Re-emits every upstream element as long as the schedule allows, pausing
/// before each re-emission. The schedule restarts for each element.
#[derive(Clone)]
pub struct RepeatElems<S> {
    pub(crate) stream: S,
    pub(crate) schedule: Schedule,
}

impl<S> Stream for RepeatElems<S>
where
    S: Stream,
    S::Item: Clone,
{
    type Item = S::Item;
    type Error = S::Error;

    async fn fold<T, St, Fut>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, S::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let schedule = self.schedule;
        let schedule_ref = &schedule;
        let end = self
            .stream
            .fold((init, step), move |(s, mut step), a| async move {
                let mut state = step(s, a.clone()).await?;
                let mut schedule_state = schedule_ref.initial();
                loop {
                    match state {
                        Step::Stop(s) => return Ok(Step::Stop((s, step))),
                        Step::Cont(s) => {
                            let decision = schedule_ref.update(schedule_state);
                            if !decision.cont {
                                return Ok(Step::Cont((s, step)));
                            }
                            schedule_state = decision.state;
                            if !decision.delay.is_zero() {
                                sleep(decision.delay).await;
                            }
                            state = step(s, a.clone()).await?;
                        }
                    }
                }
            })
            .await?;
        Ok(end.map(|(s, _)| s))
    }
}

/// Schedule-driven combinators.
pub trait RepeatStreamExt: Stream {
    /// Rerun the entire stream per `schedule`. A downstream stop ends the
    /// repetition immediately.
    fn repeat(self, schedule: Schedule) -> Repeat<Self>
    where
        Self: Clone,
    {
        Repeat {
            stream: self,
            schedule,
        }
    }

    /// Re-emit each element per `schedule` before moving to the next one.
    fn repeat_elems(self, schedule: Schedule) -> RepeatElems<Self>
    where
        Self::Item: Clone,
    {
        RepeatElems {
            stream: self,
            schedule,
        }
    }
}

impl<S> RepeatStreamExt for S where S: Stream {}
