//! Domain models for answer-key generation.
//!
//! This module contains the data structures shared by the engines and surfaces:
//!
//! - [`Operation`] / [`Layout`] - what is being asked, and how it is displayed
//! - [`Operand`] - a digit string together with its value
//! - [`FibType`] - answer shape of a fill-in-the-blank question
//! - [`QuestionRecord`] - a question body as the staging layer stores it
//! - [`AnswerKey`] - the computed answer key, one variant per question kind

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{InputError, InputResult, OperandPair};

// =============================================================================
// Operation and Layout
// =============================================================================

/// Arithmetic operation of a question (`l1_skill` in the sheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Parse from the skill names used across question sheets.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_uppercase();
        match normalized.as_str() {
            "ADDITION" | "ADD" => Some(Self::Addition),
            "SUBTRACTION" | "SUB" => Some(Self::Subtraction),
            "MULTIPLICATION" | "MULTIPLE" | "MULTIPLY" => Some(Self::Multiplication),
            "DIVISION" | "DIV" => Some(Self::Division),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Addition => "Addition",
            Self::Subtraction => "Subtraction",
            Self::Multiplication => "Multiplication",
            Self::Division => "Division",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the question is displayed (`question_type` in the sheet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Stacked digits with carry/borrow and result rows (`Grid-1`)
    Grid,
    /// A single fill-in-the-blank answer (`Fib`)
    FreeForm,
}

impl Layout {
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_uppercase();
        match normalized.as_str() {
            "GRID-1" | "GRID1" | "GRID" => Some(Self::Grid),
            "FIB" | "FREEFORM" | "FREE_FORM" | "FREE-FORM" => Some(Self::FreeForm),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Grid => "Grid-1",
            Self::FreeForm => "Fib",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_code())
    }
}

// =============================================================================
// Operand
// =============================================================================

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digit pattern"));

/// A non-negative integer operand.
///
/// Keeps the digit string as written (`"07"` stays two digits wide) next to its
/// numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    digits: String,
    value: u64,
}

impl Operand {
    pub fn parse(field: &'static str, raw: &str) -> InputResult<Self> {
        if !DIGITS.is_match(raw) {
            return Err(InputError::MalformedOperand {
                field,
                value: raw.to_string(),
                pair: OperandPair::default(),
            });
        }
        let value = raw.parse::<u64>().map_err(|_| InputError::OperandTooLarge {
            field,
            pair: OperandPair::default(),
        })?;
        Ok(Self {
            digits: raw.to_string(),
            value,
        })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Width of the operand as written.
    pub fn width(&self) -> usize {
        self.digits.len()
    }
}

// =============================================================================
// Fill-in-the-blank answer shapes
// =============================================================================

/// Answer shape of a fill-in-the-blank question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FibType {
    /// Computed bare result (quotient for division)
    #[default]
    Standard,
    /// `{quotient, remainder}` pair, division only
    QuotientRemainder,
    /// Image-based question; the supplied answer is trusted as is
    WithImage,
}

impl FibType {
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase();
        match normalized.as_str() {
            "" | "standard" | "fib_standard" => Some(Self::Standard),
            "quotient_remainder" | "fib_quotient_remainder" => Some(Self::QuotientRemainder),
            "with_image" | "fib_standard_with_image" | "image" => Some(Self::WithImage),
            _ => None,
        }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::QuotientRemainder => "quotient_remainder",
            Self::WithImage => "with_image",
        }
    }
}

// =============================================================================
// Question Record
// =============================================================================

/// A question body as the staging layer hands it over.
///
/// Field names follow the question sheet columns. Operands and flags may arrive
/// as JSON strings, numbers or booleans; they are kept as strings here and parsed
/// by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub question_id: Option<String>,

    #[serde(alias = "l1_skill")]
    pub operation: String,

    pub question_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub grid_fib_n1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub grid_fib_n2: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_pre_fills_top: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_pre_fills_result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub grid1_show_carry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub grid1_show_regroup: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_multiply_intermediate_steps_prefills: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_div_intermediate_steps_prefills: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_pre_fills_quotient: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid1_pre_fills_remainder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fib_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "loose_string")]
    pub fib_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
}

/// Accept a string, number or boolean and keep it as a string.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Interpret a sheet flag (`yes`, `true`, `y`, `1`) as a boolean.
pub fn is_yes(flag: Option<&str>) -> bool {
    flag.map(|f| matches!(f.trim().to_lowercase().as_str(), "yes" | "true" | "y" | "1"))
        .unwrap_or(false)
}

// =============================================================================
// Answer Keys
// =============================================================================

/// Grid addition answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionAnswer {
    pub result: u64,
    pub is_prefilled: bool,
    /// Carry row: `1` revealed, `B` blank, `#` no carry
    pub answer_top: String,
    pub answer_result: String,
}

/// Grid subtraction answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtractionAnswer {
    /// Difference, zero-padded to the grid width unless the padding exception applies
    pub result: String,
    pub is_prefilled: bool,
    /// Regroup markers joined with `|`
    pub answer_top: String,
    pub answer_result: String,
}

/// Grid multiplication answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplicationAnswer {
    pub result: u64,
    pub is_intermediate_prefilled: bool,
    /// Masked partial products, most significant multiplier digit first, joined with `|`
    pub answer_intermediate: String,
    pub answer_result: String,
}

/// One masked long-division step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionStepRow {
    /// Closest multiple subtracted (or the brought-down value for a bring-down-only step)
    pub multiple: String,
    pub difference: String,
}

/// Grid division answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionAnswer {
    pub quotient: String,
    pub remainder: String,
    pub answer_quotient: String,
    pub answer_remainder: String,
    pub intermediate_steps: Vec<DivisionStepRow>,
}

/// Fill-in-the-blank answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FibAnswer {
    Number(i64),
    QuotientRemainder { quotient: u64, remainder: u64 },
    Supplied(String),
}

/// Fill-in-the-blank answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeFormAnswer {
    pub operation: Operation,
    pub fib_type: FibType,
    pub result: FibAnswer,
}

/// A computed answer key, one variant per question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKey {
    AdditionGrid(AdditionAnswer),
    SubtractionGrid(SubtractionAnswer),
    MultiplicationGrid(MultiplicationAnswer),
    DivisionGrid(DivisionAnswer),
    FreeForm(FreeFormAnswer),
}
