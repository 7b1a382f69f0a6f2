//! Shared primitives for the haplomap crates.
//!
//! - **Error types** — [`HaplomapError`] and [`Result`] for structured error handling
//! - **Traits** — [`Scored`], [`Located`], [`Summarizable`]

pub mod error;
pub mod traits;

pub use error::{HaplomapError, Result};
pub use traits::*;
