//! Windowed legacy evaluator.
//!
//! A frozen, unmemoized rendition of the core metric set, computed over
//! circular sample windows. It exists as an oracle for differential tests
//! and benchmarks against the memoized engine; new metrics are added to the
//! engine only.

mod evaluator;
mod window;

pub use evaluator::{LEGACY_METRICS, LegacyEvaluator};
pub use window::SlidingWindow;
