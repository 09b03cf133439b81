//! `list` command.

use super::{OutputFormat, json_error, write_error};
use crate::Result;
use crate::services::SaveOrchestrator;
use std::io::Write;

/// Lists every stored item.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCommand {
    format: OutputFormat,
}

impl ListCommand {
    /// Creates a list command.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Writes all items to `out` and returns how many there were.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot list items or writing fails.
    pub fn run<W: Write>(&self, orchestrator: &SaveOrchestrator, out: &mut W) -> Result<usize> {
        let items = orchestrator.list_all()?;

        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &items).map_err(|e| json_error(&e))?;
                writeln!(out).map_err(|e| write_error(&e))?;
            },
            OutputFormat::Text if items.is_empty() => {
                writeln!(out, "No items stored.").map_err(|e| write_error(&e))?;
            },
            OutputFormat::Text => {
                for item in &items {
                    writeln!(out, "{}\t{}", item.id, item.content).map_err(|e| write_error(&e))?;
                }
            },
        }

        Ok(items.len())
    }
}
