//! # hp-core
//!
//! Shared building blocks for histoplot: the error taxonomy, the raw
//! histogram input contract and small value types used across crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::HistogramSource;
pub use types::Measurement;

/// Version of the histoplot workspace, embedded into emitted artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
