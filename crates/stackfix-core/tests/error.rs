//! Tests for error handling

use stackfix_core::error::{FixStackError, FixStackResult};
use stackfix_core::types::HexWord;

fn pointer() -> HexWord
{
    HexWord::parse("0012f880").unwrap()
}

#[test]
fn test_nothing_to_fix_display()
{
    let error = FixStackError::NoCorruptionDetected;
    assert_eq!(format!("{}", error), "nothing to fix");
    assert_eq!(error.diagnostic(), "Error: nothing to fix");
}

#[test]
fn test_memory_read_truncated_display()
{
    let error = FixStackError::MemoryReadTruncated {
        pointer: pointer(),
        lines: 1,
    };
    let message = format!("{}", error);
    assert!(message.starts_with("nothing to parse"));
    assert!(message.contains("0012f880"));
    assert_eq!(error.diagnostic(), "Error: nothing to parse");
}

#[test]
fn test_walk_error_diagnostics()
{
    let frame = FixStackError::FramePointerUnresolvable {
        pointer: pointer(),
        line: "0012f880  ????????".to_string(),
    };
    let symbol = FixStackError::SymbolResolutionFailed {
        pointer: pointer(),
        line: "0012f884  ????????".to_string(),
    };

    assert!(format!("{}", frame).contains("????????"));
    assert_eq!(frame.diagnostic(), "Error: cannot find next frame");
    assert_eq!(symbol.diagnostic(), "Error: cannot find next symbol");
}

#[test]
fn test_host_errors_use_full_message()
{
    let error = FixStackError::CommandFailed {
        command: "kb".to_string(),
        reason: "no target".to_string(),
    };
    let diagnostic = error.diagnostic();
    assert!(diagnostic.starts_with("Error: "));
    assert!(diagnostic.contains("kb"));
    assert!(diagnostic.contains("no target"));
}

#[test]
fn test_io_error_conversion()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
    let error: FixStackError = io.into();

    match error {
        FixStackError::Io(_) => {
            // Expected: io::Error converts to the Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: FixStackResult<()> = Ok(());
    let _error_result: FixStackResult<()> = Err(FixStackError::NoCorruptionDetected);
}
