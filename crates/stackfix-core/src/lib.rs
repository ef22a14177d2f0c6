//! # stackfix-core
//!
//! Reconstruction of call stacks corrupted by exceptions escaping `noexcept`
//! functions.
//!
//! When an exception unwinds into a function that promised not to throw,
//! the debugger's stack listing goes wrong right after the SEH dispatcher
//! and prints "Following frames may be wrong.". This crate recovers the real
//! caller chain by combining:
//! - the trusted part of the listing above the warning
//! - a manual walk of the saved frame-pointer chain, read from memory
//! - the frames the listing printed *below* the dispatcher, which are spliced
//!   back in once the manual walk meets one of them
//!
//! ## Pipeline
//!
//! ```text
//! classify -> segment -> FrameDictionary -> FrameWalker -> Reconstruction
//! ```
//!
//! The engine performs no I/O of its own; every debugger command goes
//! through a [`CommandHost`], so it runs equally against a live session or a
//! recorded transcript.
//!
//! Frame-pointer-less calling conventions are not supported, and the engine
//! never resolves symbols itself: it trusts what the debugger prints.

pub mod classify;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod host;
pub mod prelude;
pub mod segment;
pub mod types;
pub mod walker;

// Re-export commonly used types
pub use config::FixStackConfig;
pub use engine::{reconstruct, reconstruct_listing, Reconstruction};
pub use error::{FixStackError, FixStackResult};
pub use host::{CommandHost, ScriptedHost};
pub use types::{Frame, HexWord};
pub use walker::WalkOutcome;
