//! Multi-file evaluation with cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::evaluator::Evaluator;
use crate::report::Report;
use crate::types::{FileFailure, LintResult};

/// One unit of input for a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    /// Identifier attached to every violation (usually a path).
    pub identifier: String,
    /// Raw, undecoded content.
    pub bytes: Vec<u8>,
}

impl SourceInput {
    /// Creates a new input.
    #[must_use]
    pub fn new(identifier: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            identifier: identifier.into(),
            bytes: bytes.into(),
        }
    }
}

/// Shared flag for aborting a batch between files.
///
/// Clones share the same flag. Raising it never interrupts a file that is
/// already being evaluated; files that have not started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a flag that is not raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Outcome {
    Checked(Report),
    Failed(FileFailure),
    Skipped(String),
}

impl Evaluator {
    /// Evaluates many sources in parallel.
    ///
    /// Results keep input order. A file whose bytes cannot be decoded is
    /// recorded as a failure and does not affect the others.
    #[must_use]
    pub fn evaluate_batch(&self, inputs: &[SourceInput], cancel: &CancellationFlag) -> LintResult {
        info!("Evaluating {} files", inputs.len());

        let run = || -> Vec<Outcome> {
            inputs
                .par_iter()
                .map(|input| {
                    if cancel.is_cancelled() {
                        return Outcome::Skipped(input.identifier.clone());
                    }
                    match self.evaluate_bytes(&input.bytes, &input.identifier) {
                        Ok(report) => Outcome::Checked(report),
                        Err(e) => {
                            warn!("Failed to decode {}: {}", input.identifier, e);
                            Outcome::Failed(FileFailure {
                                identifier: input.identifier.clone(),
                                message: e.to_string(),
                            })
                        }
                    }
                })
                .collect()
        };

        let outcomes = match self.parallelism {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!("Could not start {threads} worker threads, using the global pool: {e}");
                    run()
                }
            },
            None => run(),
        };

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Checked(report) => {
                    result.reports.push(report);
                    result.files_checked += 1;
                }
                Outcome::Failed(failure) => result.failures.push(failure),
                Outcome::Skipped(identifier) => result.skipped.push(identifier),
            }
        }

        let (errors, warnings) = result.count_by_severity();
        info!(
            "Evaluation complete: {} errors, {} warnings in {} files ({} failed, {} skipped)",
            errors,
            warnings,
            result.files_checked,
            result.failures.len(),
            result.skipped.len()
        );
        result
    }
}
