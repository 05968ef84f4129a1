//! Parallel evaluation of many independent series using Rayon.
//!
//! Each job gets its own [`CalculationContext`](crate::CalculationContext),
//! built and dropped on the worker thread that evaluates it, so no cache is
//! ever shared between threads.
//!
//! # Thread Pool Configuration
//!
//! Rayon's global pool defaults to one thread per CPU. Set
//! `batch.max_threads` and call [`BatchEvaluator::configure_thread_pool`]
//! once at startup to cap it.
//!
//! # Example
//!
//! ```
//! use performance_engine::batch::{BatchEvaluator, SeriesJob};
//! use performance_engine::config::BatchConfig;
//!
//! let evaluator = BatchEvaluator::new(BatchConfig::default());
//! let jobs = vec![
//!     SeriesJob::new("fund-a", vec![100.0, 110.0, 99.0, 121.0]),
//!     SeriesJob::new("fund-b", vec![100.0, 95.0, 97.0, 101.0]),
//! ];
//!
//! let result = evaluator.run(&jobs, &["MaxDrawdown", "Annualized"])?;
//! assert_eq!(result.jobs_succeeded, 2);
//! # Ok::<(), performance_engine::batch::BatchError>(())
//! ```

mod error;
mod executor;
mod progress;
mod result;
mod types;

pub use error::BatchError;
pub use executor::BatchEvaluator;
pub use result::BatchResult;
pub use types::{JobReport, SeriesJob};
