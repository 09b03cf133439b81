//! `save` command.

use super::{OutputFormat, json_error, write_error};
use crate::Result;
use crate::models::SaveResult;
use crate::services::SaveOrchestrator;
use serde::Serialize;
use std::io::Write;
use std::thread;

/// Result of saving one command-line argument.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SaveOutcome {
    /// The save path ran to completion (saved, collision or duplicate).
    Completed(SaveResult),
    /// The backend failed.
    Failed {
        /// Always `"error"`.
        status: &'static str,
        /// Always `false`.
        success: bool,
        /// The content that failed to save.
        content: String,
        /// Error description.
        message: String,
    },
}

impl SaveOutcome {
    fn from_result(content: &str, result: Result<SaveResult>) -> Self {
        match result {
            Ok(result) => Self::Completed(result),
            Err(e) => Self::Failed {
                status: "error",
                success: false,
                content: content.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Returns whether the item was persisted.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        match self {
            Self::Completed(result) => result.success,
            Self::Failed { .. } => false,
        }
    }
}

/// Saves every argument concurrently through a single orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveCommand {
    format: OutputFormat,
}

impl SaveCommand {
    /// Creates a save command.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Saves all `contents`, one scoped thread per value.
    ///
    /// Outcomes are returned in argument order. Backend errors are reported
    /// per value and do not stop the other saves.
    #[must_use]
    pub fn save_all(orchestrator: &SaveOrchestrator, contents: &[String]) -> Vec<SaveOutcome> {
        thread::scope(|scope| {
            let handles: Vec<_> = contents
                .iter()
                .map(|content| {
                    let handle = scope.spawn(move || orchestrator.save(content));
                    (content, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(content, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(crate::Error::OperationFailed {
                            operation: "save_item".to_string(),
                            cause: "save thread panicked".to_string(),
                        })
                    });
                    SaveOutcome::from_result(content, result)
                })
                .collect()
        })
    }

    /// Runs the command and writes one line (or one JSON array) to `out`.
    ///
    /// Returns `true` when every value was saved.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub fn run<W: Write>(
        &self,
        orchestrator: &SaveOrchestrator,
        contents: &[String],
        out: &mut W,
    ) -> Result<bool> {
        let outcomes = Self::save_all(orchestrator, contents);
        let all_saved = outcomes.iter().all(SaveOutcome::succeeded);

        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &outcomes).map_err(|e| json_error(&e))?;
                writeln!(out).map_err(|e| write_error(&e))?;
            },
            OutputFormat::Text => {
                for outcome in &outcomes {
                    match outcome {
                        SaveOutcome::Completed(result) => writeln!(out, "{result}"),
                        SaveOutcome::Failed {
                            content, message, ..
                        } => writeln!(out, "Failed to save item with content {content}: {message}"),
                    }
                    .map_err(|e| write_error(&e))?;
                }
            },
        }

        Ok(all_saved)
    }
}
