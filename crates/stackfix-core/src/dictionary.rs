//! # Candidate Frame Dictionary
//!
//! Frames printed after the dispatcher, indexed by frame pointer.
//!
//! The part of the listing below the exception dispatcher was captured from
//! inside the dispatch path and is mostly trustworthy. Once the manual walk
//! reaches a frame pointer that also appears here, everything from that
//! frame onwards can be spliced in as printed. Insertion order is therefore
//! part of the contract, which is why this is an [`IndexMap`] rather than a
//! `HashMap`.

use indexmap::IndexMap;
use tracing::trace;

use crate::config::FixStackConfig;
use crate::types::{Frame, HexWord};

/// Why a candidate frame was not indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection
{
    /// The debugger printed a raw `0x...` address instead of a symbol.
    Unsymbolized,
    /// The frame belongs to the exception dispatch machinery.
    Trampoline,
}

/// Insertion-ordered map from frame pointer to candidate frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDictionary
{
    frames: IndexMap<HexWord, Frame>,
}

impl FrameDictionary
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Index `frame` unless it is useless as a stitch anchor.
    ///
    /// Returns why the frame was skipped, or `None` once it is indexed. A
    /// repeated frame pointer replaces the earlier frame but keeps the
    /// earlier position.
    pub fn offer(&mut self, frame: Frame, config: &FixStackConfig) -> Option<Rejection>
    {
        let rejection = if frame.is_unsymbolized() {
            Some(Rejection::Unsymbolized)
        } else if config.is_trampoline(&frame.symbol) {
            Some(Rejection::Trampoline)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            trace!(pointer = %frame.frame_pointer, ?rejection, "candidate skipped");
            return Some(rejection);
        }

        self.frames.insert(frame.frame_pointer.clone(), frame);
        None
    }

    pub fn contains(&self, pointer: &HexWord) -> bool
    {
        self.frames.contains_key(pointer)
    }

    /// The frame at `pointer` followed by every frame indexed after it.
    ///
    /// Returns `None` on a miss.
    pub fn tail_from(&self, pointer: &HexWord) -> Option<impl Iterator<Item = &Frame> + '_>
    {
        let start = self.frames.get_index_of(pointer)?;
        Some(self.frames.values().skip(start))
    }

    /// Number of indexed frames.
    pub fn len(&self) -> usize
    {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.frames.is_empty()
    }

    /// Indexed frames in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> + '_
    {
        self.frames.values()
    }
}
