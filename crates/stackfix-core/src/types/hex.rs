//! Hexadecimal word type.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A machine word as printed by the debugger: unprefixed hexadecimal text
///
/// Stack listings and memory dumps identify frames by the *text* of their
/// frame pointers, so the value is kept exactly as printed (no truncation,
/// no re-padding). Comparison and hashing ignore ASCII case, which lets a
/// pointer taken from `kb` output match the same pointer printed by a
/// memory dump in a different case.
///
/// ## Example
///
/// ```rust
/// use stackfix_core::types::HexWord;
///
/// let upper = HexWord::parse("0012FF00").unwrap();
/// let lower = HexWord::parse("0012ff00").unwrap();
/// assert_eq!(upper, lower);
/// assert_eq!(upper.as_str(), "0012FF00");
/// assert!(HexWord::parse("0x12").is_none());
/// ```
#[derive(Debug, Clone, Eq)]
pub struct HexWord(String);

impl HexWord
{
    /// Parse a run of hex digits
    ///
    /// Returns `None` for empty text or text containing anything other than
    /// `[0-9A-Fa-f]` (including a `0x` prefix).
    pub fn parse(text: &str) -> Option<Self>
    {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(HexWord(text.to_string()))
    }

    /// Wrap text already matched by a hex-only regex group.
    pub(crate) fn from_matched(text: &str) -> Self
    {
        debug_assert!(text.bytes().all(|b| b.is_ascii_hexdigit()));
        HexWord(text.to_string())
    }

    /// The digits exactly as printed by the debugger.
    pub fn as_str(&self) -> &str
    {
        &self.0
    }

    /// `true` if every digit is `0`.
    ///
    /// A zero frame pointer marks the base of the stack.
    pub fn is_zero(&self) -> bool
    {
        self.0.bytes().all(|b| b == b'0')
    }
}

impl PartialEq for HexWord
{
    fn eq(&self, other: &Self) -> bool
    {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for HexWord
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_usize(self.0.len());
    }
}

impl fmt::Display for HexWord
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.0)
    }
}
