//! Fold-driven stream combinators.
//!
//! This module provides the [`Stream`] trait, a pull-based effectful
//! stream defined entirely by its fold, together with the combinators,
//! constructors, and concurrent bridges built on it.

pub mod bridge;
pub mod combinators;
pub mod concurrent;
pub mod constructors;
pub mod core;
pub mod pure;
pub mod repeat;
pub mod sink_ops;

// Re-export the protocol
pub use self::core::Stream;

// Re-export sequential combinators
pub use combinators::{
    Chain, EvalMap, EvalScan, EvalTap, Filter, FilterMap, FilterNot, FlatMap, Flatten, Forever,
    Map, MapConcat, Scan, Skip, SkipWhile, StreamExt, Take, TakeWhile, ZipWithIndex,
};

// Re-export constructors
pub use constructors::{
    bracket, empty, eval, from_chunk, from_iter, from_queue, once, range, unfold, unfold_eval,
    unwrap, Bracket, Empty, Eval, FromQueue, Iter, Once, Range, Unfold, UnfoldEval, Unwrap,
};

// Re-export the pure specialization
pub use pure::StreamPure;

// Re-export concurrent combinators and the queue bridge
pub use bridge::{Pull, StreamQueue};
pub use concurrent::{
    ConcurrentStreamExt, JoinWith, Merge, MergeEither, MergeWith, Zip, ZipWith,
};

// Re-export schedule-driven repetition
pub use repeat::{Repeat, RepeatElems, RepeatStreamExt};

// Re-export sink integration
pub use sink_ops::{PeelTail, SinkStreamExt, Transduce};
