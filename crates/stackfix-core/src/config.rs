//! # Configuration
//!
//! Every debugger-specific constant the engine relies on.
//!
//! The defaults target 32-bit WinDbg sessions, where an exception thrown
//! through a `noexcept` function leaves `kb` printing the
//! "Following frames may be wrong." warning right after the SEH dispatcher.
//! Other dialects can be targeted by overriding individual fields.
//!
//! ## Example
//!
//! ```rust
//! use stackfix_core::config::FixStackConfig;
//!
//! let config = FixStackConfig::default()
//!     .with_memory_command("dqs {pointer} L2")
//!     .with_max_frames(64);
//! assert_eq!(config.memory_command_for("0012ff00"), "dqs 0012ff00 L2");
//! ```

/// Placeholder substituted with the frame pointer in [`FixStackConfig::memory_command`].
pub const POINTER_PLACEHOLDER: &str = "{pointer}";

/// Default command producing the primary stack listing.
pub const DEFAULT_STACK_COMMAND: &str = "kb";

/// Default two-word memory dump with symbols.
pub const DEFAULT_MEMORY_COMMAND: &str = "dds {pointer} L2";

/// Warning printed by the debugger's unwinder once it loses confidence.
pub const DEFAULT_WARNING_SENTINEL: &str = "Following frames may be wrong.";

/// Symbol of the SEH dispatcher frame that precedes the corrupted part.
pub const DEFAULT_DISPATCHER_MARKER: &str = "ntdll!ExecuteHandler2+";

/// Exception dispatch routines present in every corrupted trace.
pub const DEFAULT_TRAMPOLINE_PREFIXES: [&str; 4] = [
    "ntdll!ExecuteHandler2+",
    "ntdll!ExecuteHandler+",
    "ntdll!KiUserExceptionDispatcher+",
    "KERNELBASE!RaiseException+",
];

/// Default bound on frames synthesized by one walk.
pub const DEFAULT_MAX_FRAMES: usize = 256;

/// Settings for one reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixStackConfig
{
    /// Command that prints the primary stack listing.
    pub stack_command: String,
    /// Memory dump command template; must contain `{pointer}`.
    pub memory_command: String,
    /// Substring identifying the "frames may be wrong" warning line.
    pub warning_sentinel: String,
    /// Substring identifying the dispatcher entry frame.
    pub dispatcher_marker: String,
    /// Symbol prefixes that disqualify a candidate frame as a stitch anchor.
    pub trampoline_prefixes: Vec<String>,
    /// Maximum number of frames the walker may synthesize.
    pub max_frames: usize,
}

impl Default for FixStackConfig
{
    fn default() -> Self
    {
        Self {
            stack_command: DEFAULT_STACK_COMMAND.to_string(),
            memory_command: DEFAULT_MEMORY_COMMAND.to_string(),
            warning_sentinel: DEFAULT_WARNING_SENTINEL.to_string(),
            dispatcher_marker: DEFAULT_DISPATCHER_MARKER.to_string(),
            trampoline_prefixes: DEFAULT_TRAMPOLINE_PREFIXES.iter().map(ToString::to_string).collect(),
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl FixStackConfig
{
    /// Use a different command for the primary listing.
    #[must_use]
    pub fn with_stack_command(mut self, command: impl Into<String>) -> Self
    {
        self.stack_command = command.into();
        self
    }

    /// Use a different memory dump template.
    ///
    /// A template without `{pointer}` gets the pointer appended after a space.
    #[must_use]
    pub fn with_memory_command(mut self, template: impl Into<String>) -> Self
    {
        let template = template.into();
        self.memory_command = if template.contains(POINTER_PLACEHOLDER) {
            template
        } else {
            format!("{template} {POINTER_PLACEHOLDER}")
        };
        self
    }

    /// Match a different warning line.
    #[must_use]
    pub fn with_warning_sentinel(mut self, sentinel: impl Into<String>) -> Self
    {
        self.warning_sentinel = sentinel.into();
        self
    }

    /// Match a different dispatcher frame.
    #[must_use]
    pub fn with_dispatcher_marker(mut self, marker: impl Into<String>) -> Self
    {
        self.dispatcher_marker = marker.into();
        self
    }

    /// Replace the trampoline symbol list.
    #[must_use]
    pub fn with_trampoline_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trampoline_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Bound the number of synthesized frames.
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: usize) -> Self
    {
        self.max_frames = max_frames;
        self
    }

    /// Memory dump command for a given frame pointer.
    pub fn memory_command_for(&self, pointer: &str) -> String
    {
        self.memory_command.replace(POINTER_PLACEHOLDER, pointer)
    }

    /// `true` if `symbol` starts with one of the trampoline prefixes.
    pub fn is_trampoline(&self, symbol: &str) -> bool
    {
        self.trampoline_prefixes.iter().any(|prefix| symbol.starts_with(prefix.as_str()))
    }
}
