//! Common module for library exports

pub use crate::classify::classify;
pub use crate::config::FixStackConfig;
pub use crate::dictionary::FrameDictionary;
pub use crate::engine::{reconstruct, reconstruct_listing, Reconstruction};
pub use crate::error::{FixStackError, FixStackResult};
pub use crate::host::{CommandHost, ScriptedHost};
pub use crate::segment::{segment, ScanState, SegmentedTrace};
pub use crate::types::{Frame, HexWord, TraceSegment};
pub use crate::walker::{FrameWalker, WalkOutcome};
