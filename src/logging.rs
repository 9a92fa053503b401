//! Logging bootstrap for the binary
//!
//! Library code only talks to the `log` facade. The binary calls
//! [`init_logging`] once; records go to stderr and, when the log directory is
//! writable, to a size-rotated file under it as well. `RUST_LOG` overrides
//! the requested level.

use std::fs;
use std::path::Path;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

use crate::error::{SplitError, SplitResult};

const LOG_FILE_BASENAME: &str = "billsplit";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// Accepted level names
pub const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Normalize a level name, rejecting anything `log` wouldn't understand
pub fn normalize_level(level: &str) -> SplitResult<&'static str> {
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS
        .iter()
        .find(|l| **l == wanted)
        .copied()
        .ok_or_else(|| {
            SplitError::Config(format!(
                "unknown log level '{}' (expected one of: {})",
                level,
                LEVELS.join(", ")
            ))
        })
}

/// Start the logger; keep the returned handle alive until exit
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> SplitResult<LoggerHandle> {
    let level = normalize_level(level)?;

    let logger = Logger::try_with_env_or_str(level)
        .map_err(|e| SplitError::Config(format!("invalid log level '{}': {}", level, e)))?;

    let file_dir = log_dir.filter(|dir| fs::create_dir_all(dir).is_ok());

    let started = match file_dir {
        Some(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .append()
            .duplicate_to_stderr(Duplicate::All)
            .format_for_files(flexi_logger::detailed_format)
            .format_for_stderr(flexi_logger::default_format)
            .write_mode(WriteMode::Direct)
            .start(),
        None => logger
            .log_to_stderr()
            .format(flexi_logger::default_format)
            .start(),
    };

    started.map_err(|e| SplitError::Config(format!("failed to start logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warn ").unwrap(), "warn");
        assert_eq!(normalize_level("off").unwrap(), "off");
        assert!(matches!(
            normalize_level("chatty"),
            Err(SplitError::Config(_))
        ));
    }
}
