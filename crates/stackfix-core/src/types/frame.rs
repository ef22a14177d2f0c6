//! Stack frame types.

use std::fmt;

use super::HexWord;

/// Placeholder printed for the three argument columns of a synthesized frame.
const SYNTHESIZED_ARG: &str = "00000000";

/// One record of a `kb`-style stack listing.
///
/// Produced by [`crate::classify::classify`]; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame
{
    /// Frame number column (1-4 hex digits). Empty for synthesized frames.
    pub index: String,
    /// Saved frame pointer (`ChildEBP`).
    pub frame_pointer: HexWord,
    /// Return address (`RetAddr`).
    pub return_address: HexWord,
    /// The first three stack arguments.
    pub args: [HexWord; 3],
    /// Free text after the numeric columns, usually `module!function+offset`.
    pub symbol: String,
    /// The line this frame was parsed from (or rendered to, if synthesized).
    pub raw: String,
}

impl Frame
{
    /// Build a frame recovered by walking the frame-pointer chain by hand.
    ///
    /// The rendered line keeps the seven-column shape of the listing, with
    /// `--` in the index column and zeroed arguments, so it is easy to tell
    /// apart from frames the debugger printed itself. An empty symbol leaves
    /// the line ending at the last argument column.
    pub fn synthesized(frame_pointer: HexWord, return_address: HexWord, symbol: String) -> Self
    {
        let zero = HexWord::from_matched(SYNTHESIZED_ARG);
        let mut raw =
            format!("-- {frame_pointer} {return_address} {SYNTHESIZED_ARG} {SYNTHESIZED_ARG} {SYNTHESIZED_ARG}");
        if !symbol.is_empty() {
            raw.push(' ');
            raw.push_str(&symbol);
        }
        Self {
            index: String::new(),
            frame_pointer,
            return_address,
            args: [zero.clone(), zero.clone(), zero],
            symbol,
            raw,
        }
    }

    /// `true` if the debugger could not name the function (`0x...` text).
    pub fn is_unsymbolized(&self) -> bool
    {
        self.symbol.starts_with("0x")
    }

    /// `true` if this frame was produced by the walker rather than parsed.
    pub fn is_synthesized(&self) -> bool
    {
        self.index.is_empty()
    }
}

impl fmt::Display for Frame
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.raw)
    }
}

/// Where a line of the primary listing ended up during segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceSegment
{
    /// Printed before the corruption warning; emitted verbatim.
    Prefix,
    /// The warning, the dispatcher marker, or anything skipped between them.
    Marker,
    /// Printed after both sentinels; a potential stitch anchor.
    Candidate,
}
