//! JSON Schema validation for question records.
//!
//! Records are checked against `schemas/grid-question.json` (JSON Schema Draft 7),
//! embedded at compile time. The schema covers the shape of a row: operands are
//! digit strings, masks only use their operation's alphabet (`#` is limited to
//! subtraction and division rows), and `question_type`, `operation` and free-form
//! `fib_type` carry codes the engine knows, in any letter case. Whether a mask fits
//! the arithmetic is left to the engines.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use gridkey::validate_question_record;
//!
//! let row = json!({
//!     "l1_skill": "Addition",
//!     "question_type": "Grid-1",
//!     "grid_fib_n1": "48",
//!     "grid_fib_n2": "27",
//!     "grid1_pre_fills_top": "F",
//!     "grid1_pre_fills_result": "FB"
//! });
//! assert!(validate_question_record(&row).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static QUESTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/grid-question.json")).expect("Invalid embedded schema")
});

/// Validate `data` against `schema`.
///
/// Returns every validation error message when `data` does not conform.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one question record.
pub fn validate_question_record(data: &Value) -> Result<(), Vec<String>> {
    validate(&QUESTION_SCHEMA, data)
}

pub fn is_valid_question_record(data: &Value) -> bool {
    is_valid(&QUESTION_SCHEMA, data)
}

/// Validate every row of a batch, returning the failing rows by index.
pub fn validate_batch(rows: &[Value]) -> Vec<(usize, Vec<String>)> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| validate_question_record(row).err().map(|errors| (index, errors)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_grid_record() {
        let row = json!({
            "question_id": 17,
            "l1_skill": "Addition",
            "question_type": "Grid-1",
            "grid_fib_n1": "48",
            "grid_fib_n2": 27,
            "grid1_pre_fills_top": "F",
            "grid1_pre_fills_result": "FB",
            "grid1_show_carry": "yes"
        });
        assert!(is_valid_question_record(&row));
    }

    #[test]
    fn test_valid_steps_masks() {
        let row = json!({
            "operation": "Division",
            "question_type": "Grid-1",
            "grid_fib_n1": "125",
            "grid_fib_n2": "5",
            "grid1_div_intermediate_steps_prefills": "#FFBF|BBFF",
            "grid1_pre_fills_quotient": "FB",
            "grid1_pre_fills_remainder": "F"
        });
        assert!(validate_question_record(&row).is_ok());
    }

    #[test]
    fn test_bad_mask_alphabet() {
        let row = json!({
            "l1_skill": "Addition",
            "question_type": "Grid-1",
            "grid_fib_n1": "48",
            "grid_fib_n2": "27",
            "grid1_pre_fills_result": "FX"
        });
        assert!(!is_valid_question_record(&row));
    }

    #[test]
    fn test_operand_must_be_digits() {
        let row = json!({
            "l1_skill": "Addition",
            "question_type": "Fib",
            "grid_fib_n1": "-4",
            "grid_fib_n2": "2"
        });
        assert!(!is_valid_question_record(&row));
    }

    #[test]
    fn test_missing_operation() {
        let row = json!({ "question_type": "Fib", "grid_fib_n1": "1", "grid_fib_n2": "2" });
        let errors = validate_question_record(&row).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_validate_batch_reports_indices() {
        let rows = vec![
            json!({ "l1_skill": "Addition", "question_type": "Fib", "grid_fib_n1": "1", "grid_fib_n2": "2" }),
            json!({ "l1_skill": "Addition", "question_type": "Grid-7" }),
            json!({ "l1_skill": "Division", "question_type": "Fib", "fib_type": "essay" }),
        ];
        let failures = validate_batch(&rows);
        let indices: Vec<usize> = failures.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    fn engine_accepts(row: &Value) -> bool {
        crate::batch::execute_values(std::slice::from_ref(row), uuid::Uuid::new_v4()).is_ok()
    }

    #[test]
    fn test_schema_agrees_with_engine() {
        let mut rows = crate::batch::example_batch().as_array().unwrap().clone();
        rows.extend([
            // '#' is structural only in subtraction and division rows
            json!({ "l1_skill": "Addition", "question_type": "Grid-1", "grid_fib_n1": "48", "grid_fib_n2": "27",
                    "grid1_pre_fills_top": "F", "grid1_pre_fills_result": "#FB", "grid1_show_carry": "yes" }),
            json!({ "l1_skill": "Addition", "question_type": "Grid-1", "grid_fib_n1": "48", "grid_fib_n2": "27",
                    "grid1_pre_fills_top": "#F", "grid1_pre_fills_result": "FB", "grid1_show_carry": "yes" }),
            json!({ "operation": "MULTIPLY", "question_type": "Grid-1", "grid_fib_n1": "23", "grid_fib_n2": "14",
                    "grid1_multiply_intermediate_steps_prefills": "FB|BFF", "grid1_pre_fills_result": "F#BF" }),
            json!({ "l1_skill": "SUBTRACTION", "question_type": "grid", "grid_fib_n1": "52", "grid_fib_n2": "7",
                    "grid1_pre_fills_top": "FB", "grid1_pre_fills_result": "#BF" }),
            json!({ "l1_skill": "Division", "question_type": "GRID1", "grid_fib_n1": "84", "grid_fib_n2": "4",
                    "grid1_div_intermediate_steps_prefills": "FB|BF", "grid1_pre_fills_quotient": "#FB",
                    "grid1_pre_fills_remainder": "F" }),
            // Codes are matched case-insensitively and operands are trimmed
            json!({ "l1_skill": "Sub", "question_type": "FreeForm", "grid_fib_n1": " 9 ", "grid_fib_n2": "4" }),
            json!({ "operation": "multiply", "question_type": "fib", "grid_fib_n1": "6", "grid_fib_n2": 7,
                    "fib_type": "FIB_STANDARD" }),
            json!({ "l1_skill": "Division", "question_type": "Fib", "grid_fib_n1": "9", "grid_fib_n2": "4",
                    "fib_type": "essay" }),
            json!({ "l1_skill": "Modulo", "question_type": "Fib", "grid_fib_n1": "9", "grid_fib_n2": "4" }),
        ]);

        for row in &rows {
            assert_eq!(is_valid_question_record(row), engine_accepts(row), "{row}");
        }
    }

    #[test]
    fn test_structural_token_rejected_in_addition_rows() {
        let row = json!({
            "l1_skill": "Addition",
            "question_type": "Grid-1",
            "grid_fib_n1": "48",
            "grid_fib_n2": "27",
            "grid1_pre_fills_result": "#FB"
        });
        let errors = validate_question_record(&row).unwrap_err();
        assert!(!errors.is_empty());

        let subtraction = json!({
            "l1_skill": "Subtraction",
            "question_type": "Grid-1",
            "grid_fib_n1": "52",
            "grid_fib_n2": "7",
            "grid1_pre_fills_result": "#BF"
        });
        assert!(is_valid_question_record(&subtraction));
    }

    #[test]
    fn test_operation_and_skill_are_exclusive() {
        let row = json!({ "operation": "Addition", "l1_skill": "Addition", "question_type": "Fib" });
        assert!(!is_valid_question_record(&row));
    }

    #[test]
    fn test_custom_schema() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
        assert!(validate(&schema, &json!({ "age": 42 })).is_err());
    }
}
