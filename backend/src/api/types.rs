//! REST API types for the answer-key endpoints.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::batch::{BatchReport, FailedRecord, KeyedAnswer};

/// Response sent after computing a batch of answer keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    /// Unique job identifier (the batch process id)
    pub job_id: String,

    /// Status: "ready", "warning", "error"
    pub status: String,

    pub keys: Vec<KeyedAnswer>,

    pub failures: Vec<FailedRecord>,

    pub metadata: ResponseMetadata,
}

/// Counts of a computed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// RFC 3339 time the batch finished
    pub computed_at: String,
    pub total_records: usize,
    pub computed: usize,
    pub failed: usize,
}

impl From<BatchReport> for AnswerResponse {
    fn from(report: BatchReport) -> Self {
        let status = if report.failures.is_empty() {
            "ready"
        } else if report.keys.is_empty() {
            "error"
        } else {
            "warning"
        };

        AnswerResponse {
            job_id: report.process_id.to_string(),
            status: status.to_string(),
            metadata: ResponseMetadata {
                computed_at: Utc::now().to_rfc3339(),
                total_records: report.total(),
                computed: report.keys.len(),
                failed: report.failures.len(),
            },
            keys: report.keys,
            failures: report.failures,
        }
    }
}

/// Response of the schema-only validation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<ValidationError>,
}

/// Schema errors of one record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub record_index: usize,
    pub errors: Vec<String>,
}

impl ValidationResponse {
    pub fn new(total: usize, failures: Vec<(usize, Vec<String>)>) -> Self {
        Self {
            valid: total - failures.len(),
            invalid: failures.len(),
            errors: failures
                .into_iter()
                .map(|(record_index, errors)| ValidationError { record_index, errors })
                .collect(),
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "keys": [],
        "failures": [],
        "metadata": {
            "computedAt": Utc::now().to_rfc3339(),
            "totalRecords": 0,
            "computed": 0,
            "failed": 0
        }
    })
}
