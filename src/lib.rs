pub mod error;
pub mod queue;
pub mod schedule;
pub mod sink;
pub mod step;
pub mod stream;
pub mod take;

// Re-export the stream surface at the crate root
pub use step::Step;
pub use stream::*;
