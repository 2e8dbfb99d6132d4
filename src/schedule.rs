//! Recurrence schedules driving `repeat` and `repeat_elems`.
//!
//! A `Schedule` is consulted after each completed run (or each emitted
//! element): it answers whether to recur, how long to pause first, and what
//! state the next consultation starts from. Delays are served by the tokio
//! timer.

use std::time::Duration;

/// Recurrence policy.
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    /// Never recur.
    Never,
    /// Recur without bound or delay.
    Forever,
    /// Recur `n` more times, immediately.
    Recurs(usize),
    /// Recur `times` more times with a fixed pause between runs.
    Spaced { times: usize, delay: Duration },
    /// Recur `times` more times, pausing with exponential backoff.
    Exponential {
        times: usize,
        initial_delay: Duration,
        multiplier: f64,
    },
}

/// State threaded between consultations of a [`Schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    /// Completed recurrences so far.
    pub iteration: usize,
    /// Pause the next recurrence should observe.
    pub delay: Duration,
}

/// One schedule decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether to recur at all.
    pub cont: bool,
    /// Pause to observe before recurring. Meaningless when `cont` is false.
    pub delay: Duration,
    /// State for the next consultation.
    pub state: ScheduleState,
}

impl Schedule {
    /// Initial consultation state.
    pub fn initial(&self) -> ScheduleState {
        let delay = match self {
            Schedule::Spaced { delay, .. } => *delay,
            Schedule::Exponential { initial_delay, .. } => *initial_delay,
            _ => Duration::ZERO,
        };
        ScheduleState {
            iteration: 0,
            delay,
        }
    }

    /// Decide whether to recur given the current state.
    pub fn update(&self, state: ScheduleState) -> Decision {
        match self {
            Schedule::Never => Decision {
                cont: false,
                delay: Duration::ZERO,
                state,
            },
            Schedule::Forever => Decision {
                cont: true,
                delay: Duration::ZERO,
                state: ScheduleState {
                    iteration: state.iteration + 1,
                    delay: Duration::ZERO,
                },
            },
            Schedule::Recurs(times) => Decision {
                cont: state.iteration < *times,
                delay: Duration::ZERO,
                state: ScheduleState {
                    iteration: state.iteration + 1,
                    delay: Duration::ZERO,
                },
            },
            Schedule::Spaced { times, delay } => Decision {
                cont: state.iteration < *times,
                delay: *delay,
                state: ScheduleState {
                    iteration: state.iteration + 1,
                    delay: *delay,
                },
            },
            Schedule::Exponential {
                times, multiplier, ..
            } => {
                let next = state.delay.mul_f64(*multiplier);
                Decision {
                    cont: state.iteration < *times,
                    delay: state.delay,
                    state: ScheduleState {
                        iteration: state.iteration + 1,
                        delay: next,
                    },
                }
            }
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Never
    }
}
