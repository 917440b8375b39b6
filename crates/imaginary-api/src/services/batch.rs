//! URL batch orchestration
//!
//! Every target runs fetch, process and upload in sequence. Targets run concurrently and
//! independently: a failing target never cancels its siblings, and the batch settles only
//! once every target has finished.

use futures::future;
use futures::stream::{self, StreamExt};
use imaginary_core::models::{OutputVariables, Pipeline, Target};
use imaginary_core::{AppError, ErrorMetadata};
use imaginary_processing::{CodecError, PipelineExecutor};
use serde::Serialize;
use tracing::Instrument;
use utoipa::ToSchema;

use super::transfer::TransferClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Ok,
    Failed,
}

/// Outcome of one target, returned to the caller when the batch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub index: usize,
    pub input: String,
    pub output: String,
    pub status: TargetStatus,
    /// Upload response status on success, the failure's status otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Size in bytes of the encoded output, once produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_length: Option<usize>,
}

struct TargetResult {
    report: TargetReport,
    error: Option<AppError>,
}

/// The first failing target (by index) and the report of every target.
#[derive(Debug)]
pub struct BatchFailure {
    pub error: AppError,
    pub reports: Vec<TargetReport>,
}

/// Settled results of a batch, in target order.
pub struct BatchOutcome {
    results: Vec<TargetResult>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.error.is_none())
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn reports(&self) -> impl Iterator<Item = &TargetReport> {
        self.results.iter().map(|r| &r.report)
    }

    /// `None` when every target succeeded.
    pub fn into_failure(self) -> Option<BatchFailure> {
        let mut first_error = None;
        let mut reports = Vec::with_capacity(self.results.len());
        for result in self.results {
            if first_error.is_none() {
                first_error = result.error;
            }
            reports.push(result.report);
        }
        first_error.map(|error| BatchFailure { error, reports })
    }
}

struct Delivered {
    output_length: usize,
    upload_status: u16,
}

pub struct BatchOrchestrator {
    transfer: TransferClient,
    concurrency: Option<usize>,
}

impl BatchOrchestrator {
    /// `concurrency` caps in-flight targets; `None` dispatches all of them at once.
    pub fn new(transfer: TransferClient, concurrency: Option<usize>) -> Self {
        Self {
            transfer,
            concurrency: concurrency.filter(|n| *n > 0),
        }
    }

    pub async fn run(&self, pipeline: &Pipeline, targets: Vec<Target>) -> BatchOutcome {
        let total = targets.len();
        tracing::info!(
            targets = total,
            operations = pipeline.len(),
            concurrency = ?self.concurrency,
            "Starting URL batch"
        );

        let tasks = targets.into_iter().enumerate().map(|(index, target)| {
            self.run_target(index, target, pipeline.clone())
                .instrument(tracing::info_span!("target", index))
        });

        // Both paths keep results in target order.
        let results = match self.concurrency {
            Some(limit) => stream::iter(tasks).buffered(limit).collect::<Vec<_>>().await,
            None => future::join_all(tasks).await,
        };

        let outcome = BatchOutcome { results };
        tracing::info!(
            targets = total,
            failed = outcome.failed_count(),
            "URL batch settled"
        );
        outcome
    }

    async fn run_target(&self, index: usize, target: Target, pipeline: Pipeline) -> TargetResult {
        let mut report = TargetReport {
            index,
            input: target.input.clone(),
            output: target.output.url.clone(),
            status: TargetStatus::Ok,
            http_status: None,
            error: None,
            output_length: None,
        };

        match self.process_target(index, &target, pipeline, &mut report).await {
            Ok(delivered) => {
                tracing::debug!(
                    output_length = delivered.output_length,
                    upload_status = delivered.upload_status,
                    "Target delivered"
                );
                report.http_status = Some(delivered.upload_status);
                TargetResult {
                    report,
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "Target failed");
                report.status = TargetStatus::Failed;
                report.http_status = Some(error.http_status_code());
                report.error = Some(error.client_message());
                TargetResult {
                    report,
                    error: Some(error),
                }
            }
        }
    }

    async fn process_target(
        &self,
        index: usize,
        target: &Target,
        pipeline: Pipeline,
        report: &mut TargetReport,
    ) -> Result<Delivered, AppError> {
        let input = self.transfer.fetch(index, &target.input).await?;

        let output = PipelineExecutor::run_blocking(input, pipeline, target.format)
            .await
            .map_err(|e| codec_error_for_target(index, e))?;
        report.output_length = Some(output.len());

        let variables = OutputVariables::new(output.len());
        let headers = variables.render_headers(&target.output.headers);

        let upload_status = self
            .transfer
            .upload(
                index,
                &target.output,
                &headers,
                target.format.to_mime_type(),
                output,
            )
            .await?;

        Ok(Delivered {
            output_length: variables.output_length,
            upload_status,
        })
    }
}

fn codec_error_for_target(index: usize, err: CodecError) -> AppError {
    match AppError::from(err) {
        AppError::ImageProcessing(msg) => {
            AppError::ImageProcessing(format!("Target #{}: {}", index, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(index: usize, error: Option<AppError>) -> TargetResult {
        let status = if error.is_some() {
            TargetStatus::Failed
        } else {
            TargetStatus::Ok
        };
        TargetResult {
            report: TargetReport {
                index,
                input: format!("http://in/{}", index),
                output: format!("http://out/{}", index),
                status,
                http_status: error.as_ref().map(|e| e.http_status_code()).or(Some(200)),
                error: error.as_ref().map(|e| e.client_message()),
                output_length: None,
            },
            error,
        }
    }

    fn upstream(status: u16) -> AppError {
        AppError::Upstream {
            status,
            message: format!("upstream responded with {}", status),
        }
    }

    #[test]
    fn test_all_ok_is_success() {
        let outcome = BatchOutcome {
            results: vec![result(0, None), result(1, None)],
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.reports().count(), 2);
        assert!(outcome.into_failure().is_none());
    }

    #[test]
    fn test_lowest_index_failure_wins() {
        let outcome = BatchOutcome {
            results: vec![
                result(0, None),
                result(1, Some(upstream(404))),
                result(2, Some(upstream(503))),
            ],
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_count(), 2);

        let failure = outcome.into_failure().unwrap();
        assert_eq!(failure.error.http_status_code(), 404);
        assert_eq!(failure.reports.len(), 3);
        assert_eq!(failure.reports[0].status, TargetStatus::Ok);
        assert_eq!(failure.reports[2].http_status, Some(503));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = TargetReport {
            index: 1,
            input: "http://in/a.png".to_string(),
            output: "http://out/a.webp".to_string(),
            status: TargetStatus::Failed,
            http_status: Some(404),
            error: Some("Target #1: failed".to_string()),
            output_length: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["httpStatus"], 404);
        assert!(json.get("outputLength").is_none());
    }

    #[test]
    fn test_codec_error_names_target() {
        let err = codec_error_for_target(
            2,
            CodecError::Encode {
                format: imaginary_core::models::Format::Webp,
                message: "too large".to_string(),
            },
        );
        assert!(matches!(err, AppError::ImageProcessing(ref m) if m.starts_with("Target #2: ")));
    }

    #[test]
    fn test_zero_concurrency_means_unbounded() {
        let transfer = TransferClient::new(reqwest::Client::new(), 1024);
        assert_eq!(BatchOrchestrator::new(transfer.clone(), Some(0)).concurrency, None);
        assert_eq!(BatchOrchestrator::new(transfer, Some(4)).concurrency, Some(4));
    }
}
