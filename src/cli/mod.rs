//! CLI command implementations.
//!
//! The binary parses arguments and wires up configuration; the commands
//! here do the work and write to any [`std::io::Write`], so they can be
//! exercised without a terminal.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `save` | Save one or more content values concurrently |
//! | `list` | List all stored items |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! itemgate save report.pdf invoice.pdf report.pdf
//! itemgate list --json
//! ITEMGATE_BACKEND=memory itemgate config --show
//! ```

mod config;
mod list;
mod save;

pub use config::ConfigCommand;
pub use list::ListCommand;
pub use save::{SaveCommand, SaveOutcome};

use crate::Error;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per result.
    #[default]
    Text,
    /// JSON for scripting.
    Json,
}

impl OutputFormat {
    /// Picks JSON when `json` is set.
    #[must_use]
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

fn write_error(e: &std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}

fn json_error(e: &serde_json::Error) -> Error {
    Error::OperationFailed {
        operation: "serialize_output".to_string(),
        cause: e.to_string(),
    }
}
