//! # Types
//!
//! Value types shared by the classifier, the segmenter, and the walker.

pub mod frame;
pub mod hex;

// Re-export all public types
pub use frame::{Frame, TraceSegment};
pub use hex::HexWord;
