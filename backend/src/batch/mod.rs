//! Batch executor
//!
//! Computes answer keys for a list of question records. Each record is handled on
//! its own: a failing record is reported with its index and never stops the rest
//! of the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::api::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::engine::{compute_answer, AnswerRequest};
use crate::error::{AnswerKeyResult, BatchError, BatchResult, FailureKind};
use crate::models::{AnswerKey, QuestionRecord};

/// Answer key of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedAnswer {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub answer: AnswerKey,
}

/// A record that produced no answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecord {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub process_id: Uuid,
    pub keys: Vec<KeyedAnswer>,
    pub failures: Vec<FailedRecord>,
}

impl BatchReport {
    pub fn new(process_id: Uuid) -> Self {
        Self {
            process_id,
            keys: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when every record got an answer key
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.keys.len() + self.failures.len()
    }

    pub fn summary(&self) -> String {
        let structural = self
            .failures
            .iter()
            .filter(|f| f.kind == FailureKind::Structural)
            .count();
        format!(
            "Computed: {} answer keys, {} failed ({} input, {} structural)",
            self.keys.len(),
            self.failures.len(),
            self.failures.len() - structural,
            structural
        )
    }

    fn push(&mut self, index: usize, question_id: Option<String>, outcome: AnswerKeyResult<AnswerKey>) {
        match outcome {
            Ok(answer) => self.keys.push(KeyedAnswer {
                index,
                question_id,
                answer,
            }),
            Err(e) => {
                log_warning_indent(
                    format!("[{}] Record {}: {}", self.process_id, label(index, question_id.as_deref()), e),
                    1,
                );
                self.failures.push(FailedRecord {
                    index,
                    question_id,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn push_invalid(&mut self, index: usize, question_id: Option<String>, message: String) {
        log_warning_indent(
            format!("[{}] Record {}: {}", self.process_id, label(index, question_id.as_deref()), message),
            1,
        );
        self.failures.push(FailedRecord {
            index,
            question_id,
            kind: FailureKind::Input,
            message,
        });
    }
}

fn label(index: usize, question_id: Option<&str>) -> String {
    match question_id {
        Some(id) => format!("#{} ({})", index, id),
        None => format!("#{}", index),
    }
}

/// Compute the answer key of a single record.
pub fn compute_record(record: &QuestionRecord) -> AnswerKeyResult<AnswerKey> {
    let request = AnswerRequest::try_from(record)?;
    compute_answer(&request)
}

/// Compute answer keys for typed records.
pub fn execute(records: &[QuestionRecord], process_id: Uuid) -> BatchReport {
    log_info(format!("[{}] Computing {} answer keys", process_id, records.len()));
    let mut report = BatchReport::new(process_id);

    for (index, record) in records.iter().enumerate() {
        report.push(index, record.question_id.clone(), compute_record(record));
    }

    finish(&report);
    report
}

/// Compute answer keys for raw JSON rows.
///
/// Rows that do not deserialize into a [`QuestionRecord`] become input failures.
pub fn execute_values(rows: &[Value], process_id: Uuid) -> BatchReport {
    log_info(format!("[{}] Computing {} answer keys", process_id, rows.len()));
    let mut report = BatchReport::new(process_id);

    for (index, row) in rows.iter().enumerate() {
        match QuestionRecord::deserialize(row) {
            Ok(record) => report.push(index, record.question_id.clone(), compute_record(&record)),
            Err(e) => report.push_invalid(index, row_question_id(row), format!("Invalid question record: {}", e)),
        }
    }

    finish(&report);
    report
}

fn finish(report: &BatchReport) {
    let message = format!("[{}] {}", report.process_id, report.summary());
    if report.is_ok() {
        log_success(message);
    } else {
        log_warning(message);
    }
}

/// Best-effort question id of a row that failed to deserialize.
fn row_question_id(row: &Value) -> Option<String> {
    match row.get("question_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a JSON array of question rows from disk.
pub fn load_records(path: impl AsRef<Path>) -> BatchResult<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let rows: Vec<Value> = serde_json::from_str(&content)?;
    if rows.is_empty() {
        return Err(BatchError::EmptyInput);
    }
    Ok(rows)
}

/// Reject batches larger than `max` records.
pub fn ensure_batch_size(size: usize, max: usize) -> BatchResult<()> {
    if size > max {
        return Err(BatchError::TooLarge { size, max });
    }
    Ok(())
}

/// Example batch, one record per grid operation plus a fill-in-the-blank one.
pub fn example_batch() -> Value {
    serde_json::json!([
        {
            "question_id": "add-1",
            "l1_skill": "Addition",
            "question_type": "Grid-1",
            "grid_fib_n1": "48",
            "grid_fib_n2": "27",
            "grid1_pre_fills_top": "F",
            "grid1_pre_fills_result": "FB",
            "grid1_show_carry": "yes"
        },
        {
            "question_id": "sub-1",
            "l1_skill": "Subtraction",
            "question_type": "Grid-1",
            "grid_fib_n1": "52",
            "grid_fib_n2": "7",
            "grid1_pre_fills_top": "FB",
            "grid1_pre_fills_result": "BF",
            "grid1_show_regroup": "yes"
        },
        {
            "question_id": "mul-1",
            "l1_skill": "Multiplication",
            "question_type": "Grid-1",
            "grid_fib_n1": "23",
            "grid_fib_n2": "14",
            "grid1_multiply_intermediate_steps_prefills": "FB|BFF",
            "grid1_pre_fills_result": "FBF"
        },
        {
            "question_id": "div-1",
            "l1_skill": "Division",
            "question_type": "Grid-1",
            "grid_fib_n1": "84",
            "grid_fib_n2": "4",
            "grid1_div_intermediate_steps_prefills": "FB|BF",
            "grid1_pre_fills_quotient": "FB",
            "grid1_pre_fills_remainder": "F"
        },
        {
            "question_id": "div-2",
            "l1_skill": "Division",
            "question_type": "Fib",
            "grid_fib_n1": "97",
            "grid_fib_n2": "4",
            "fib_type": "quotient_remainder"
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn process() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_example_batch_computes_cleanly() {
        let rows = example_batch();
        let report = execute_values(rows.as_array().unwrap(), process());
        assert!(report.is_ok(), "{:?}", report.failures);
        assert_eq!(report.keys.len(), 5);
        assert_eq!(report.keys[3].question_id.as_deref(), Some("div-1"));
    }

    #[test]
    fn test_failures_do_not_affect_other_records() {
        let rows = vec![
            json!({"question_id": "ok", "l1_skill": "Addition", "question_type": "Grid-1",
                   "grid_fib_n1": "48", "grid_fib_n2": "27",
                   "grid1_pre_fills_top": "F", "grid1_pre_fills_result": "FB", "grid1_show_carry": "yes"}),
            json!({"question_id": "zero", "l1_skill": "Division", "question_type": "Fib",
                   "grid_fib_n1": "8", "grid_fib_n2": "0"}),
            json!({"question_id": "mask", "l1_skill": "Addition", "question_type": "Grid-1",
                   "grid_fib_n1": "48", "grid_fib_n2": "27",
                   "grid1_pre_fills_top": "FF", "grid1_pre_fills_result": "FB", "grid1_show_carry": "yes"}),
            json!({"question_id": 42, "question_type": "Grid-1"}),
            json!({"l1_skill": "Addition", "question_type": "Fib", "grid_fib_n1": "1", "grid_fib_n2": "2"}),
        ];

        let report = execute_values(&rows, process());
        assert!(!report.is_ok());
        assert_eq!(report.total(), 5);

        let indices: Vec<usize> = report.keys.iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![0, 4]);

        let failures: Vec<(usize, FailureKind)> = report.failures.iter().map(|f| (f.index, f.kind)).collect();
        assert_eq!(
            failures,
            vec![(1, FailureKind::Input), (2, FailureKind::Structural), (3, FailureKind::Input)]
        );
        assert_eq!(report.failures[2].question_id.as_deref(), Some("42"));
        assert!(report.failures[2].message.starts_with("Invalid question record"));
        assert!(report.summary().contains("2 answer keys, 3 failed (2 input, 1 structural)"));
    }

    #[test]
    fn test_execute_typed_records() {
        let record = QuestionRecord {
            question_id: Some("q1".to_string()),
            operation: "Multiplication".to_string(),
            question_type: "Fib".to_string(),
            grid_fib_n1: Some("23".to_string()),
            grid_fib_n2: Some("14".to_string()),
            ..Default::default()
        };
        let report = execute(&[record], process());
        assert!(report.is_ok());
        assert_eq!(report.keys[0].question_id.as_deref(), Some("q1"));
    }

    #[test]
    fn test_load_records() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", example_batch()).unwrap();
        let rows = load_records(file.path()).unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_load_records_rejects_empty_and_non_array() {
        let mut empty = NamedTempFile::new().unwrap();
        write!(empty, "[]").unwrap();
        assert!(matches!(load_records(empty.path()), Err(BatchError::EmptyInput)));

        let mut object = NamedTempFile::new().unwrap();
        write!(object, "{{\"grid_fib_n1\": \"1\"}}").unwrap();
        assert!(matches!(load_records(object.path()), Err(BatchError::Json(_))));

        assert!(matches!(load_records("/nonexistent/batch.json"), Err(BatchError::Io(_))));
    }

    #[test]
    fn test_ensure_batch_size() {
        assert!(ensure_batch_size(10, 10).is_ok());
        assert!(matches!(
            ensure_batch_size(11, 10),
            Err(BatchError::TooLarge { size: 11, max: 10 })
        ));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = execute_values(example_batch().as_array().unwrap(), process());
        let value = serde_json::to_value(&report.keys[0]).unwrap();
        assert_eq!(value["questionId"], "add-1");
        assert_eq!(value["answer"]["kind"], "addition_grid");
        assert_eq!(value["answer"]["answerTop"], "1");
    }
}
