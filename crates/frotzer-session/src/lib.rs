//! # frotzer-session
//!
//! Session lifecycle and response correlation for Frotzer.
//!
//! This crate provides:
//! - The session state machine (idle, ready, running)
//! - Starting, quitting and killing the interpreter
//! - Correlating each command with the output it produced
//! - Save and restore through the configured command sequences
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on frotzer-core and
//! frotzer-process to manage the lifecycle of one interpreter process.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod correlator;
pub mod session;

// Re-export commonly used types
pub use correlator::Correlator;
pub use session::Session;
