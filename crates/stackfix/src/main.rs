use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use stackfix_core::classify::classify;
use stackfix_core::{reconstruct, FixStackConfig, FixStackResult, ScriptedHost, WalkOutcome};
use stackfix_utils::{info, init_logging, init_logging_with_level, LogFormat, LogLevel};

/// Repairs call stacks broken by exceptions thrown through noexcept functions.
#[derive(Parser, Debug)]
#[command(name = "stackfix")]
#[command(version)]
#[command(about = "Repairs call stacks broken by exceptions thrown through noexcept functions", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true, value_parser = LogLevel::from_str)]
    log_level: Option<LogLevel>,

    /// Log format used with --log-level: pretty or json
    #[arg(long, global = true, default_value = "pretty", value_parser = LogFormat::from_str)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Reconstruct the stack from a recorded debugger transcript
    Replay
    {
        /// Transcript file with `> command` blocks followed by their output
        transcript: PathBuf,
        /// Command that printed the stack listing
        #[arg(long, default_value = stackfix_core::config::DEFAULT_STACK_COMMAND)]
        stack_command: String,
        /// Two-word memory dump command; `{pointer}` is replaced by the frame pointer
        #[arg(long, default_value = stackfix_core::config::DEFAULT_MEMORY_COMMAND)]
        memory_command: String,
        /// Maximum number of frames to recover from memory
        #[arg(long, default_value_t = stackfix_core::config::DEFAULT_MAX_FRAMES)]
        max_frames: usize,
    },
    /// Show how each line of a saved stack listing is parsed
    Classify
    {
        /// File holding the stack listing
        file: PathBuf,
    },
}

fn main()
{
    let cli = Cli::parse();

    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, cli.log_format),
        None => init_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run_command(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Run one subcommand; `Ok(false)` means it ran but did not succeed.
fn run_command(command: Commands) -> FixStackResult<bool>
{
    match command {
        Commands::Replay {
            transcript,
            stack_command,
            memory_command,
            max_frames,
        } => {
            info!("Replaying transcript {}", transcript.display());
            let mut host = ScriptedHost::load(&transcript)?;
            let config = FixStackConfig::default()
                .with_stack_command(stack_command)
                .with_memory_command(memory_command)
                .with_max_frames(max_frames);

            let fixed = reconstruct(&mut host, &config)?;
            for line in fixed.report() {
                println!("{line}");
            }

            match &fixed.outcome {
                WalkOutcome::Stalled { pointer } => eprintln!("Note: frame pointer chain loops back to {pointer}"),
                WalkOutcome::DepthLimit => eprintln!("Note: stopped after {max_frames} recovered frames"),
                _ => {}
            }
            Ok(fixed.is_success())
        }
        Commands::Classify { file } => {
            let text = std::fs::read_to_string(&file)?;
            for line in text.lines() {
                match classify(line) {
                    Some(frame) => println!(
                        "frame {:>4} fp={} ret={} args={} {} {} symbol={}",
                        frame.index,
                        frame.frame_pointer,
                        frame.return_address,
                        frame.args[0],
                        frame.args[1],
                        frame.args[2],
                        frame.symbol
                    ),
                    None => println!("noise      {line}"),
                }
            }
            Ok(true)
        }
    }
}
