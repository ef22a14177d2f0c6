//! # Reconstruction
//!
//! Ties the pieces together: fetch the listing, segment it, walk the frame
//! pointer chain, and assemble the corrected trace.
//!
//! ## Example
//!
//! ```rust
//! use stackfix_core::config::FixStackConfig;
//! use stackfix_core::engine::reconstruct;
//! use stackfix_core::host::ScriptedHost;
//!
//! let mut host = ScriptedHost::new()
//!     .with_response("kb", [
//!         "00 0012f900 00401000 00000000 00000000 00000000 app!thrower+0x10",
//!         "WARNING: Stack unwind information not available. Following frames may be wrong.",
//!         "01 0012fa10 7c9032a8 00000000 00000000 00000000 ntdll!ExecuteHandler2+0x26",
//!         "02 0012ff00 00401500 00000000 00000000 00000000 app!main+0x20",
//!     ])
//!     .with_response("dds 0012f900 L2", ["0012f900  0012ff00", "0012f904  00401500 app!main+0x20"]);
//!
//! let fixed = reconstruct(&mut host, &FixStackConfig::default())?;
//! assert!(fixed.is_success());
//! assert_eq!(fixed.lines.len(), 2);
//! # Ok::<(), stackfix_core::error::FixStackError>(())
//! ```

use tracing::{debug, info};

use crate::config::FixStackConfig;
use crate::error::{FixStackError, FixStackResult};
use crate::host::CommandHost;
use crate::segment::segment;
use crate::walker::{FrameWalker, WalkOutcome};

/// Corrected trace plus how reconstruction ended.
#[derive(Debug)]
pub struct Reconstruction
{
    /// Trusted prefix, synthesized frames, then the spliced tail.
    pub lines: Vec<String>,
    /// How many lines came from the trusted prefix.
    pub prefix: usize,
    /// How many lines were synthesized from memory.
    pub synthesized: usize,
    /// How many lines were spliced from the dictionary.
    pub spliced: usize,
    pub outcome: WalkOutcome,
}

impl Reconstruction
{
    /// `true` unless reconstruction stopped on an error.
    pub fn is_success(&self) -> bool
    {
        self.outcome.is_success()
    }

    /// The error that stopped reconstruction, if any.
    pub fn error(&self) -> Option<&FixStackError>
    {
        self.outcome.error()
    }

    /// Output lines followed by the `Error: ...` marker on failure.
    pub fn report(&self) -> Vec<String>
    {
        let mut report = self.lines.clone();
        if let Some(err) = self.error() {
            report.push(err.diagnostic());
        }
        report
    }
}

/// Fetch the stack listing from `host` and reconstruct it.
///
/// ## Errors
///
/// Only a failure to obtain the listing itself is returned as an error.
/// Everything after that, including "nothing to fix", is reported through
/// [`Reconstruction::outcome`] next to the partial output.
pub fn reconstruct<H: CommandHost>(host: &mut H, config: &FixStackConfig) -> FixStackResult<Reconstruction>
{
    let listing = host.execute(&config.stack_command)?;
    debug!(command = %config.stack_command, lines = listing.len(), "stack listing");
    Ok(reconstruct_listing(&listing, host, config))
}

/// Reconstruct an already captured listing, using `host` for memory reads.
pub fn reconstruct_listing<H, S>(listing: &[S], host: &mut H, config: &FixStackConfig) -> Reconstruction
where
    H: CommandHost,
    S: AsRef<str>,
{
    let trace = segment(listing, config);
    let mut lines = trace.prefix.clone();
    let prefix = lines.len();

    let start = match trace.walk_start() {
        Ok(start) => start,
        Err(err) => {
            info!(state = ?trace.final_state, "no corrupted frames detected");
            return Reconstruction {
                lines,
                prefix,
                synthesized: 0,
                spliced: 0,
                outcome: WalkOutcome::Aborted(err),
            };
        }
    };
    debug!(start = %start, candidates = trace.candidates.len(), "walking frame pointer chain");

    let walk = FrameWalker::new(config, &trace.candidates, host).walk(start);
    lines.extend(walk.lines().map(ToString::to_string));

    Reconstruction {
        lines,
        prefix,
        synthesized: walk.synthesized.len(),
        spliced: walk.spliced.len(),
        outcome: walk.outcome,
    }
}
