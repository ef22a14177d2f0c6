//! # Debugger Host
//!
//! The engine's only window onto the debugging session.
//!
//! Everything the engine learns about the target comes from the text output
//! of debugger commands: the stack listing itself and the two-word memory
//! dumps it issues while walking. [`CommandHost`] is that single
//! capability, so the engine can run against a live session, a recorded
//! transcript ([`ScriptedHost`]), or a test fake alike.
//!
//! ## Transcript format
//!
//! ```text
//! # comments and blank lines before the first block are ignored
//! > kb
//! 00 0012f900 00401000 00000000 00000000 00000000 app!f+0x10
//! ...
//! > dds 0012f900 L2
//! 0012f900  0012ff00
//! 0012f904  00401234 app!caller+0x24
//! ```
//!
//! A `> ` line starts a command block; the lines after it, up to the next
//! block, are that command's output.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{FixStackError, FixStackResult};

/// Prefix that opens a command block in a transcript.
pub const COMMAND_PREFIX: &str = "> ";

/// Executes debugger commands and returns their output lines.
///
/// Calls are blocking and never overlap. Implementations should return the
/// debugger's output as-is, one element per line, without the trailing
/// newline.
pub trait CommandHost
{
    /// Run `command` and collect its output.
    ///
    /// ## Errors
    ///
    /// `CommandFailed` if the command could not be run at all. A command
    /// that runs but prints nothing useful is not an error at this level.
    fn execute(&mut self, command: &str) -> FixStackResult<Vec<String>>;
}

impl<H: CommandHost + ?Sized> CommandHost for &mut H
{
    fn execute(&mut self, command: &str) -> FixStackResult<Vec<String>>
    {
        (**self).execute(command)
    }
}

/// Host that answers from canned command output.
///
/// Unknown commands produce no output, which is what the debugger does for
/// a dump of unreadable memory. Every executed command is recorded.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHost
{
    responses: HashMap<String, Vec<String>>,
    executed: Vec<String>,
}

impl ScriptedHost
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Register the output of `command`, replacing any earlier one.
    #[must_use]
    pub fn with_response<I, S>(mut self, command: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_response(command, lines);
        self
    }

    /// Register the output of `command`, replacing any earlier one.
    pub fn set_response<I, S>(&mut self, command: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses
            .insert(command.trim().to_string(), lines.into_iter().map(Into::into).collect());
    }

    /// Parse a recorded transcript.
    ///
    /// ## Errors
    ///
    /// `Transcript` if text other than comments or blank lines appears
    /// before the first command block, or if a block has an empty command.
    pub fn from_transcript(text: &str) -> FixStackResult<Self>
    {
        let mut host = Self::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for (number, line) in text.lines().enumerate() {
            if let Some(command) = line.strip_prefix(COMMAND_PREFIX) {
                let command = command.trim();
                if command.is_empty() {
                    return Err(FixStackError::Transcript {
                        line: number + 1,
                        reason: "empty command".to_string(),
                    });
                }
                if let Some((previous, output)) = current.take() {
                    host.finish_block(&previous, output);
                }
                current = Some((command.to_string(), Vec::new()));
                continue;
            }

            match current.as_mut() {
                Some((_, output)) => output.push(line.to_string()),
                None if line.trim().is_empty() || line.trim_start().starts_with('#') => {}
                None => {
                    return Err(FixStackError::Transcript {
                        line: number + 1,
                        reason: format!("output {line:?} before any `{}` command", COMMAND_PREFIX.trim()),
                    });
                }
            }
        }

        if let Some((command, output)) = current {
            host.finish_block(&command, output);
        }

        debug!(commands = host.responses.len(), "transcript loaded");
        Ok(host)
    }

    /// Load a transcript file.
    ///
    /// ## Errors
    ///
    /// `Io` if the file cannot be read, `Transcript` if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> FixStackResult<Self>
    {
        let text = fs::read_to_string(path)?;
        Self::from_transcript(&text)
    }

    fn finish_block(&mut self, command: &str, mut output: Vec<String>)
    {
        while output.last().is_some_and(|line| line.trim().is_empty()) {
            output.pop();
        }
        self.set_response(command, output);
    }

    /// Commands executed so far, in order.
    pub fn executed(&self) -> &[String]
    {
        &self.executed
    }

    /// Number of recorded command outputs.
    pub fn len(&self) -> usize
    {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.responses.is_empty()
    }
}

impl CommandHost for ScriptedHost
{
    fn execute(&mut self, command: &str) -> FixStackResult<Vec<String>>
    {
        let command = command.trim();
        self.executed.push(command.to_string());
        let output = self.responses.get(command).cloned().unwrap_or_default();
        trace!(command, lines = output.len(), "scripted command");
        Ok(output)
    }
}
