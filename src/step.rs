//! Early-exit signalling for the fold protocol.
//!
//! Every fold threads a user-chosen carrier through a step function; the
//! step answers with a `Step` that either continues the fold or terminates
//! it early. `Stop` is authoritative: once a step returns it, no further
//! element may be passed downstream by any enclosing combinator.

/// Outcome of a single fold step over carrier `S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<S> {
    /// Keep folding with this carrier.
    Cont(S),
    /// Terminate the fold early, returning this carrier.
    Stop(S),
}

impl<S> Step<S> {
    /// Project the carrier, ignoring the tag.
    pub fn extract(self) -> S {
        match self {
            Step::Cont(s) => s,
            Step::Stop(s) => s,
        }
    }

    /// Apply `f` to the carrier. The tag is preserved.
    pub fn map<T, F>(self, f: F) -> Step<T>
    where
        F: FnOnce(S) -> T,
    {
        match self {
            Step::Cont(s) => Step::Cont(f(s)),
            Step::Stop(s) => Step::Stop(f(s)),
        }
    }

    /// Eliminate the step with one handler per tag.
    pub fn fold<T, FC, FS>(self, on_cont: FC, on_stop: FS) -> T
    where
        FC: FnOnce(S) -> T,
        FS: FnOnce(S) -> T,
    {
        match self {
            Step::Cont(s) => on_cont(s),
            Step::Stop(s) => on_stop(s),
        }
    }

    pub fn is_cont(&self) -> bool {
        matches!(self, Step::Cont(_))
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Step::Stop(_))
    }

    /// Borrow the carrier.
    pub fn as_ref(&self) -> &S {
        match self {
            Step::Cont(s) => s,
            Step::Stop(s) => s,
        }
    }
}
