use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::errors::FillError;
use crate::filler::{FillReport, FormFiller};
use crate::page::FormPage;
use crate::types::{FillOutcome, FillRequest, FormPreset};

/// Whole-call retries on top of the engine's own inner loops. The engine
/// absorbs transient DOM churn; this layer retries the entire resolution
/// when the page was mid-navigation or mid-rerender.
const OUTER_ATTEMPTS: u32 = 3;
const OUTER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// A preset paired with the value to fill in this run
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub preset: FormPreset,
    pub value: String,
}

impl FieldSpec {
    /// Display name for progress and failure reporting
    pub fn display_name(&self) -> &str {
        if self.preset.item.is_empty() {
            &self.preset.locator_value
        } else {
            &self.preset.item
        }
    }

    fn to_request(&self) -> FillRequest {
        FillRequest::new(
            self.preset.locator_type,
            self.preset.locator_value.clone(),
            self.value.clone(),
            self.preset.mode,
        )
    }
}

/// Result of a send-all run
#[derive(Clone, Debug, Default, Serialize)]
pub struct SendAllReport {
    pub filled: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

impl SendAllReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fill one field with up to three whole-call attempts. Bad input is not
/// retried; everything else may just be timing.
pub async fn fill_with_retry<P: FormPage>(
    filler: &mut FormFiller<P>,
    request: &FillRequest,
) -> Result<FillReport, FillError> {
    let mut last_error = None;

    for attempt in 1..=OUTER_ATTEMPTS {
        match filler.fill_field(request).await {
            Ok(report) => {
                info!(locator = %request.locator, "field filled");
                return Ok(report);
            }
            Err(err) => {
                warn!(attempt, total = OUTER_ATTEMPTS, %err, "fill attempt failed");
                let retryable = err.is_retryable();
                last_error = Some(err);
                if !retryable {
                    break;
                }
                if attempt < OUTER_ATTEMPTS {
                    sleep(OUTER_RETRY_DELAY).await;
                }
            }
        }
    }

    // last_error is always set when we get here
    Err(last_error.unwrap_or(FillError::MissingLocator))
}

/// Convert an engine result into the caller-facing outcome; errors never
/// cross the boundary toward the UI.
pub fn to_outcome(result: &Result<FillReport, FillError>) -> FillOutcome {
    match result {
        Ok(report) => FillOutcome::success(report.message()),
        Err(err) => FillOutcome::failure(err.to_string()),
    }
}

/// Fill an ordered list of fields. Entries with a blank locator are
/// skipped; the first failure stops the run.
pub async fn send_all<P: FormPage>(
    filler: &mut FormFiller<P>,
    fields: &[FieldSpec],
) -> SendAllReport {
    let total = fields.len();
    let mut report = SendAllReport::default();

    info!(total, "send-all started");

    for (position, field) in fields.iter().enumerate() {
        let index = position + 1;
        let name = field.display_name();

        if field.preset.locator_value.trim().is_empty() {
            report.skipped += 1;
            info!(index, total, name, "skipped: blank locator");
            continue;
        }

        info!(index, total, name, "sending");
        let outcome = to_outcome(&fill_with_retry(filler, &field.to_request()).await);

        if outcome.success {
            report.filled += 1;
            info!(index, total, name, "sent");
        } else {
            warn!(index, total, name, message = %outcome.message, "stopping on failure");
            report.failures.push(format!("{}: {}", name, outcome.message));
            break;
        }
    }

    info!(
        filled = report.filled,
        skipped = report.skipped,
        failed = report.failures.len(),
        "send-all finished"
    );
    report
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
