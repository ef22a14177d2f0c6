//! # Error Types
//!
//! Error handling for stack reconstruction.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::HexWord;

/// Main error type for stack reconstruction
///
/// Each variant corresponds to one point at which reconstruction gives up.
/// None of them are retried: the engine stops at the first one and keeps
/// whatever output it had already produced.
///
/// ## Error Categories
///
/// 1. **Detection errors**: NoCorruptionDetected
/// 2. **Walk errors**: MemoryReadTruncated, FramePointerUnresolvable, SymbolResolutionFailed
/// 3. **Host errors**: CommandFailed, Transcript, Io
#[derive(Error, Debug)]
pub enum FixStackError
{
    /// The stack listing does not contain the corruption warning (or the
    /// dispatcher marker, or any frame to start walking from).
    #[error("nothing to fix")]
    NoCorruptionDetected,

    /// The two-word memory dump at a frame pointer came back short
    ///
    /// This happens when:
    /// - The frame pointer points into unmapped memory
    /// - The debugger printed an error instead of a dump
    #[error("nothing to parse: reading {pointer} returned {lines} line(s)")]
    MemoryReadTruncated
    {
        /// Frame pointer that was being read
        pointer: HexWord,
        /// Number of lines the memory command produced
        lines: usize,
    },

    /// The first dump line did not contain an address and a saved frame pointer
    #[error("cannot find next frame: unexpected dump line {line:?} at {pointer}")]
    FramePointerUnresolvable
    {
        /// Frame pointer that was being read
        pointer: HexWord,
        /// The dump line that failed to parse
        line: String,
    },

    /// The second dump line did not contain a return address
    #[error("cannot find next symbol: unexpected dump line {line:?} at {pointer}")]
    SymbolResolutionFailed
    {
        /// Frame pointer that was being read
        pointer: HexWord,
        /// The dump line that failed to parse
        line: String,
    },

    /// The host could not run a debugger command at all
    #[error("command {command:?} failed: {reason}")]
    CommandFailed
    {
        /// Command text as sent to the host
        command: String,
        /// Host-provided description of the failure
        reason: String,
    },

    /// A recorded debugger transcript is malformed
    #[error("invalid transcript at line {line}: {reason}")]
    Transcript
    {
        /// 1-based line number in the transcript
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// I/O error (for loading transcripts, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixStackError
{
    /// One-line diagnostic marker appended to partial output.
    ///
    /// Engine errors map to the short fixed texts operators know from the
    /// debugger extension (`Error: nothing to fix` and friends); host errors
    /// use their full message.
    pub fn diagnostic(&self) -> String
    {
        let text = match self {
            FixStackError::NoCorruptionDetected => "nothing to fix".to_string(),
            FixStackError::MemoryReadTruncated { .. } => "nothing to parse".to_string(),
            FixStackError::FramePointerUnresolvable { .. } => "cannot find next frame".to_string(),
            FixStackError::SymbolResolutionFailed { .. } => "cannot find next symbol".to_string(),
            other => other.to_string(),
        };
        format!("Error: {text}")
    }
}

/// Convenience type alias for `Result<T, FixStackError>`
///
/// ```rust
/// use stackfix_core::error::FixStackResult;
/// fn foo() -> FixStackResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type FixStackResult<T> = std::result::Result<T, FixStackError>;
