//! # Backward Frame Walker
//!
//! Follows the saved frame-pointer chain by hand, starting from the last
//! trusted frame, until it meets a frame that the dictionary already knows.
//!
//! Each step dumps two words at the current frame pointer:
//!
//! ```text
//! 0012f980  0012fa10                      <- word 0: caller's frame pointer
//! 0012f984  00401234 app!Worker::Run+0x24 <- word 1: return address + symbol
//! ```
//!
//! The return address read at one frame names the function owning the
//! *next* frame, so each synthesized frame is emitted one step late, paired
//! with the frame pointer it belongs to.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::FixStackConfig;
use crate::dictionary::FrameDictionary;
use crate::error::{FixStackError, FixStackResult};
use crate::host::CommandHost;
use crate::types::{Frame, HexWord};

static FRAME_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)").expect("frame word pattern is valid"));

static CALLER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)\s*(.*)$").expect("caller word pattern is valid")
});

/// How a walk ended.
#[derive(Debug)]
pub enum WalkOutcome
{
    /// Reached a frame pointer present in the dictionary; its tail was spliced.
    Stitched
    {
        /// The frame pointer where the chains met.
        pointer: HexWord,
    },
    /// Reached a zero frame pointer.
    StackBase,
    /// The chain repeated a frame pointer it had already visited.
    Stalled
    {
        /// The repeated frame pointer.
        pointer: HexWord,
    },
    /// Synthesized the configured maximum number of frames.
    DepthLimit,
    /// Gave up at the first parse or host failure.
    Aborted(FixStackError),
}

impl WalkOutcome
{
    /// `false` only for [`WalkOutcome::Aborted`].
    pub fn is_success(&self) -> bool
    {
        !matches!(self, WalkOutcome::Aborted(_))
    }

    /// The abort reason, if any.
    pub fn error(&self) -> Option<&FixStackError>
    {
        match self {
            WalkOutcome::Aborted(err) => Some(err),
            _ => None,
        }
    }
}

/// Frames produced by one walk, in output order.
#[derive(Debug)]
pub struct Walk
{
    /// Frames recovered from memory.
    pub synthesized: Vec<Frame>,
    /// Dictionary frames spliced after a stitch.
    pub spliced: Vec<Frame>,
    pub outcome: WalkOutcome,
}

impl Walk
{
    /// Output lines: synthesized frames, then the spliced tail.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_
    {
        self.synthesized.iter().chain(&self.spliced).map(|frame| frame.raw.as_str())
    }
}

/// The two words dumped at one frame pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameWords
{
    /// Saved frame pointer of the caller.
    pub next_frame: HexWord,
    /// The unparsed second dump line (return address and symbol).
    pub caller_line: String,
}

/// Parse the output of a two-word memory dump taken at `pointer`.
///
/// Only the first line is parsed here; the caller line is parsed by
/// [`parse_caller`] when it is actually needed.
///
/// ## Errors
///
/// - `MemoryReadTruncated` if fewer than two lines came back
/// - `FramePointerUnresolvable` if the first line has no second word
pub fn parse_frame_words(pointer: &HexWord, output: &[String]) -> FixStackResult<FrameWords>
{
    let [first, second, ..] = output else {
        return Err(FixStackError::MemoryReadTruncated {
            pointer: pointer.clone(),
            lines: output.len(),
        });
    };

    let caps = FRAME_WORD
        .captures(first)
        .ok_or_else(|| FixStackError::FramePointerUnresolvable {
            pointer: pointer.clone(),
            line: first.clone(),
        })?;

    Ok(FrameWords {
        next_frame: HexWord::from_matched(&caps[2]),
        caller_line: second.clone(),
    })
}

/// Parse the return address and symbol from the second dump line.
///
/// The symbol may be empty when the debugger cannot name the address.
///
/// ## Errors
///
/// `SymbolResolutionFailed` if the line has no address and word.
pub fn parse_caller(pointer: &HexWord, line: &str) -> FixStackResult<(HexWord, String)>
{
    let caps = CALLER_WORD
        .captures(line)
        .ok_or_else(|| FixStackError::SymbolResolutionFailed {
            pointer: pointer.clone(),
            line: line.to_string(),
        })?;

    Ok((HexWord::from_matched(&caps[2]), caps[3].trim_end().to_string()))
}

/// Manual frame-pointer chain walker.
pub struct FrameWalker<'a, H>
{
    config: &'a FixStackConfig,
    candidates: &'a FrameDictionary,
    host: &'a mut H,
}

impl<'a, H: CommandHost> FrameWalker<'a, H>
{
    pub fn new(config: &'a FixStackConfig, candidates: &'a FrameDictionary, host: &'a mut H) -> Self
    {
        Self {
            config,
            candidates,
            host,
        }
    }

    /// Walk from `start` until a stitch, the stack base, a guard, or an abort.
    ///
    /// Never fails as a whole: an abort is reported in the outcome and the
    /// frames synthesized before it are kept.
    pub fn walk(&mut self, start: &HexWord) -> Walk
    {
        let mut synthesized = Vec::new();
        let mut spliced = Vec::new();
        let outcome = self.walk_into(start, &mut synthesized, &mut spliced);

        match &outcome {
            WalkOutcome::Aborted(err) => warn!(%err, frames = synthesized.len(), "walk aborted"),
            other => info!(outcome = ?other, frames = synthesized.len(), spliced = spliced.len(), "walk finished"),
        }

        Walk {
            synthesized,
            spliced,
            outcome,
        }
    }

    fn walk_into(&mut self, start: &HexWord, synthesized: &mut Vec<Frame>, spliced: &mut Vec<Frame>) -> WalkOutcome
    {
        let mut current = start.clone();
        let mut visited = HashSet::from([current.clone()]);
        let mut pending: Option<(HexWord, String)> = None;

        loop {
            if current.is_zero() {
                return WalkOutcome::StackBase;
            }

            if let Some((return_address, symbol)) = pending.take() {
                if synthesized.len() >= self.config.max_frames {
                    return WalkOutcome::DepthLimit;
                }
                synthesized.push(Frame::synthesized(current.clone(), return_address, symbol));
            }

            let words = match self.read_words(&current) {
                Ok(words) => words,
                Err(err) => return WalkOutcome::Aborted(err),
            };
            debug!(pointer = %current, next = %words.next_frame, "frame words");

            if words.next_frame.is_zero() {
                return WalkOutcome::StackBase;
            }
            if !visited.insert(words.next_frame.clone()) {
                return WalkOutcome::Stalled {
                    pointer: words.next_frame,
                };
            }

            let read_at = std::mem::replace(&mut current, words.next_frame);

            if let Some(tail) = self.candidates.tail_from(&current) {
                spliced.extend(tail.cloned());
                return WalkOutcome::Stitched { pointer: current };
            }

            match parse_caller(&read_at, &words.caller_line) {
                Ok(caller) => pending = Some(caller),
                Err(err) => return WalkOutcome::Aborted(err),
            }
        }
    }

    fn read_words(&mut self, pointer: &HexWord) -> FixStackResult<FrameWords>
    {
        let command = self.config.memory_command_for(pointer.as_str());
        let output = self.host.execute(&command)?;
        parse_frame_words(pointer, &output)
    }
}
