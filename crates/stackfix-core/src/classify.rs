//! # Line Classifier
//!
//! Turns one line of a `kb`-style stack listing into a [`Frame`].
//!
//! A frame line has seven whitespace-separated columns:
//!
//! ```text
//! 00 0012fe94 7c90e48a 0012ff00 0012fec8 00000000 app!Worker::Run+0x2c
//! ^  ^        ^        ^        ^        ^        ^
//! |  |        |        +--------+--------+        symbol text (rest of line)
//! |  |        |        arguments
//! |  |        return address
//! |  frame pointer
//! frame number (1-4 hex digits)
//! ```
//!
//! Anything else (headers, warnings, blank lines, architecture-specific
//! noise) is rejected as a whole. Classification never fails loudly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Frame, HexWord};

static FRAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9A-Fa-f]{1,4})\s+([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)\s+([0-9A-Fa-f]+)\s+(.+)$",
    )
    .expect("frame line pattern is valid")
});

/// Parse a stack listing line, or return `None` if it is not a frame.
///
/// ## Example
///
/// ```rust
/// use stackfix_core::classify::classify;
///
/// let frame = classify("01 0012ff00 00401234 00000001 00000002 00000003 app!main+0x14").unwrap();
/// assert_eq!(frame.frame_pointer.as_str(), "0012ff00");
/// assert_eq!(frame.symbol, "app!main+0x14");
///
/// assert!(classify("ChildEBP RetAddr  Args to Child").is_none());
/// ```
pub fn classify(line: &str) -> Option<Frame>
{
    let caps = FRAME_LINE.captures(line)?;
    let hex = |group: usize| HexWord::from_matched(&caps[group]);

    Some(Frame {
        index: caps[1].to_string(),
        frame_pointer: hex(2),
        return_address: hex(3),
        args: [hex(4), hex(5), hex(6)],
        symbol: caps[7].to_string(),
        raw: line.to_string(),
    })
}
