//! Return series and the numeric primitives metrics are built from.
//!
//! - [`returns`]: value series to discrete or log returns
//! - [`vector`]: elementwise algebra with shorter-length truncation
//! - [`stats`]: variance, annualization, higher moments, partial moments

mod returns;
pub mod stats;
pub mod vector;

pub use returns::{ReturnMethod, returns};
