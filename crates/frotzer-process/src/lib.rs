//! # frotzer-process
//!
//! Child process handling for Frotzer.
//!
//! This crate provides:
//! - Spawning the interpreter with piped standard streams
//! - Writing commands to its stdin
//! - Turning its stdout into "output available" notifications and drains
//! - Terminating and reaping the process
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on frotzer-core and
//! knows nothing about sessions or command correlation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod process;
pub mod stream;

// Re-export commonly used types
pub use process::ProcessHandle;
pub use stream::OutputStream;
