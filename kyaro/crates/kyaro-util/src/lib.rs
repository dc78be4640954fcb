//! kyaro-util - Shared infrastructure for the Kyaro interpreter.
//!
//! This crate holds the pieces every phase of the pipeline needs:
//! source locations ([`Span`], [`Position`]) and the unified error type
//! ([`KyaroError`]) surfaced to users by the driver.

pub mod error;
pub mod span;

pub use error::{KyaroError, Result};
pub use span::{Position, Span};
