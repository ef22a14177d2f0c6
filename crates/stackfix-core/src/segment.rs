//! # Trace Segmenter
//!
//! Splits the primary stack listing into the trusted prefix, the corruption
//! marker, and the pool of candidate frames.
//!
//! ## State machine
//!
//! ```text
//!                 warning (first time): remember it, stay
//!                +----+
//!                v    |
//!            ScanPrefix --- marker, warning already seen ---> FillCandidates
//!                |                                                 ^
//!                +--- marker, no warning yet ---> ScanWarning -----+
//!                                                  (on warning)
//! ```
//!
//! Each state has its own handler; lines are fed once, in listing order,
//! and every line gets exactly one [`TraceSegment`] tag.

use tracing::debug;

use crate::classify::classify;
use crate::config::FixStackConfig;
use crate::dictionary::FrameDictionary;
use crate::error::{FixStackError, FixStackResult};
use crate::types::{HexWord, TraceSegment};

/// Segmenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState
{
    /// Emitting trusted lines until the dispatcher marker shows up.
    ScanPrefix
    {
        /// The warning line has already gone by.
        warning_seen: bool,
    },
    /// Marker seen first; skipping lines until the warning shows up.
    ScanWarning,
    /// Both sentinels seen; every remaining line is a candidate.
    FillCandidates,
}

/// Incremental segmenter over the lines of one listing.
#[derive(Debug)]
pub struct Segmenter<'c>
{
    config: &'c FixStackConfig,
    state: ScanState,
    prefix: Vec<String>,
    start_pointer: Option<HexWord>,
    candidates: FrameDictionary,
    tags: Vec<TraceSegment>,
}

impl<'c> Segmenter<'c>
{
    pub fn new(config: &'c FixStackConfig) -> Self
    {
        Self {
            config,
            state: ScanState::ScanPrefix { warning_seen: false },
            prefix: Vec::new(),
            start_pointer: None,
            candidates: FrameDictionary::new(),
            tags: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ScanState
    {
        self.state
    }

    /// Consume the next listing line.
    pub fn feed(&mut self, line: &str)
    {
        let (tag, next) = match self.state {
            ScanState::ScanPrefix { warning_seen } => self.scan_prefix(line, warning_seen),
            ScanState::ScanWarning => self.scan_warning(line),
            ScanState::FillCandidates => self.fill_candidates(line),
        };

        if next != self.state {
            debug!(from = ?self.state, to = ?next, line, "segmenter transition");
            self.state = next;
        }
        self.tags.push(tag);
    }

    fn scan_prefix(&mut self, line: &str, warning_seen: bool) -> (TraceSegment, ScanState)
    {
        if !warning_seen && line.contains(&self.config.warning_sentinel) {
            return (TraceSegment::Marker, ScanState::ScanPrefix { warning_seen: true });
        }

        if line.contains(&self.config.dispatcher_marker) {
            let next = if warning_seen {
                ScanState::FillCandidates
            } else {
                ScanState::ScanWarning
            };
            return (TraceSegment::Marker, next);
        }

        if let Some(frame) = classify(line) {
            self.start_pointer = Some(frame.frame_pointer);
        }
        self.prefix.push(line.to_string());
        (TraceSegment::Prefix, self.state)
    }

    fn scan_warning(&self, line: &str) -> (TraceSegment, ScanState)
    {
        if line.contains(&self.config.warning_sentinel) {
            (TraceSegment::Marker, ScanState::FillCandidates)
        } else {
            (TraceSegment::Marker, ScanState::ScanWarning)
        }
    }

    fn fill_candidates(&mut self, line: &str) -> (TraceSegment, ScanState)
    {
        if let Some(frame) = classify(line) {
            // Skipped candidates are traced by the dictionary.
            self.candidates.offer(frame, self.config);
        }
        (TraceSegment::Candidate, ScanState::FillCandidates)
    }

    /// Stop feeding and hand over the result.
    pub fn finish(self) -> SegmentedTrace
    {
        SegmentedTrace {
            prefix: self.prefix,
            start_pointer: self.start_pointer,
            candidates: self.candidates,
            tags: self.tags,
            final_state: self.state,
        }
    }
}

/// Output of one segmentation pass.
#[derive(Debug)]
pub struct SegmentedTrace
{
    /// Trusted lines, verbatim and in order.
    pub prefix: Vec<String>,
    /// Frame pointer of the last classifiable prefix line.
    pub start_pointer: Option<HexWord>,
    /// Symbolized, non-trampoline frames printed after both sentinels.
    pub candidates: FrameDictionary,
    /// One tag per input line.
    pub tags: Vec<TraceSegment>,
    /// State the segmenter was in at end of input.
    pub final_state: ScanState,
}

impl SegmentedTrace
{
    /// `true` if both the warning and the dispatcher marker were seen.
    pub fn corruption_detected(&self) -> bool
    {
        self.final_state == ScanState::FillCandidates
    }

    /// Frame pointer to start walking from.
    ///
    /// ## Errors
    ///
    /// `NoCorruptionDetected` if the sentinels were not both seen, or if no
    /// prefix line was a frame.
    pub fn walk_start(&self) -> FixStackResult<&HexWord>
    {
        if !self.corruption_detected() {
            return Err(FixStackError::NoCorruptionDetected);
        }
        self.start_pointer.as_ref().ok_or(FixStackError::NoCorruptionDetected)
    }
}

/// Segment a whole listing in one go.
pub fn segment<I, S>(lines: I, config: &FixStackConfig) -> SegmentedTrace
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new(config);
    for line in lines {
        segmenter.feed(line.as_ref());
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests
{
    use super::*;

    const WARNING: &str = "WARNING: Stack unwind information not available. Following frames may be wrong.";
    const MARKER: &str = "03 0012fa10 7c9032a8 0012fb00 0012ff00 0012fb20 ntdll!ExecuteHandler2+0x26";

    fn prefix_line(n: u8, pointer: &str) -> String
    {
        format!("{n:02x} {pointer} 00401000 00000000 00000000 00000000 app!f{n}+0x10")
    }

    #[test]
    fn test_warning_then_marker()
    {
        let config = FixStackConfig::default();
        let lines = vec![
            "ChildEBP RetAddr  Args to Child".to_string(),
            prefix_line(0, "0012f900"),
            prefix_line(1, "0012f980"),
            WARNING.to_string(),
            MARKER.to_string(),
            "04 0012fa40 7c90e48a 0012fb00 00000000 00000000 ntdll!RtlDispatchException+0x8a".to_string(),
            "05 0012ff00 00401500 00000000 00000000 00000000 app!main+0x20".to_string(),
            "06 0012ff40 00000000 00000000 00000000 00000000 0x401000".to_string(),
        ];

        let trace = segment(&lines, &config);
        assert!(trace.corruption_detected());
        assert_eq!(trace.prefix, lines[..3].to_vec());
        assert_eq!(trace.walk_start().unwrap().as_str(), "0012f980");
        assert_eq!(trace.candidates.len(), 2);
        assert_eq!(
            trace.tags,
            vec![
                TraceSegment::Prefix,
                TraceSegment::Prefix,
                TraceSegment::Prefix,
                TraceSegment::Marker,
                TraceSegment::Marker,
                TraceSegment::Candidate,
                TraceSegment::Candidate,
                TraceSegment::Candidate,
            ]
        );
    }

    #[test]
    fn test_marker_then_warning_skips_between()
    {
        let config = FixStackConfig::default();
        let lines = vec![
            prefix_line(0, "0012f900"),
            MARKER.to_string(),
            prefix_line(4, "0012fa80"),
            WARNING.to_string(),
            "05 0012ff00 00401500 00000000 00000000 00000000 app!main+0x20".to_string(),
        ];

        let mut segmenter = Segmenter::new(&config);
        segmenter.feed(&lines[0]);
        segmenter.feed(&lines[1]);
        assert_eq!(segmenter.state(), ScanState::ScanWarning);
        segmenter.feed(&lines[2]);
        segmenter.feed(&lines[3]);
        assert_eq!(segmenter.state(), ScanState::FillCandidates);
        segmenter.feed(&lines[4]);

        let trace = segmenter.finish();
        assert_eq!(trace.prefix, vec![lines[0].clone()]);
        assert!(!trace.candidates.contains(&HexWord::parse("0012fa80").unwrap()));
        assert!(trace.candidates.contains(&HexWord::parse("0012ff00").unwrap()));
    }

    #[test]
    fn test_second_warning_is_a_prefix_line()
    {
        let config = FixStackConfig::default();
        let lines = [prefix_line(0, "0012f900"), WARNING.to_string(), WARNING.to_string(), MARKER.to_string()];

        let trace = segment(&lines, &config);
        assert_eq!(trace.prefix, vec![lines[0].clone(), lines[2].clone()]);
        assert!(trace.corruption_detected());
    }

    #[test]
    fn test_no_warning_is_nothing_to_fix()
    {
        let config = FixStackConfig::default();
        let lines = [prefix_line(0, "0012f900"), prefix_line(1, "0012f980")];

        let trace = segment(&lines, &config);
        assert!(!trace.corruption_detected());
        assert_eq!(trace.prefix, lines.to_vec());
        assert!(matches!(trace.walk_start(), Err(FixStackError::NoCorruptionDetected)));
    }

    #[test]
    fn test_marker_without_warning_is_nothing_to_fix()
    {
        let config = FixStackConfig::default();
        let lines = [prefix_line(0, "0012f900"), MARKER.to_string(), prefix_line(4, "0012fa80")];

        let trace = segment(&lines, &config);
        assert_eq!(trace.final_state, ScanState::ScanWarning);
        assert!(matches!(trace.walk_start(), Err(FixStackError::NoCorruptionDetected)));
    }

    #[test]
    fn test_no_prefix_frame_is_nothing_to_fix()
    {
        let config = FixStackConfig::default();
        let lines = ["ChildEBP RetAddr  Args to Child", WARNING, MARKER];

        let trace = segment(lines, &config);
        assert!(trace.corruption_detected());
        assert!(matches!(trace.walk_start(), Err(FixStackError::NoCorruptionDetected)));
    }
}
