//! # frotzer-core
//!
//! Core types for Frotzer.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other frotzer crates. It provides:
//!
//! - Configuration (defaults, partial options, merging, validation)
//! - Session state
//! - Command sequences and `@filename` substitution
//! - Output filters applied to captured process output
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other frotzer crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod filter;
pub mod sequence;
pub mod state;

// Re-export commonly used types
pub use config::{FrotzerConfig, FrotzerOptions, SequenceOptions, TimingOptions, TimingSettings};
pub use error::{Error, Result};
pub use filter::OutputFilter;
pub use sequence::{CommandSequences, FILENAME_PLACEHOLDER};
pub use state::SessionState;
