//! Error types for the answer-key engine and its surfaces.
//!
//! Two classes of failure exist for a single question:
//!
//! - [`InputError`] - the raw input is unusable (malformed operand, zero divisor,
//!   unknown `fib_type`, missing companion field, bad mask character)
//! - [`MaskError`] - a prefill mask does not have the shape of the row it targets
//!
//! Both are wrapped by [`AnswerKeyError`], which is what the router returns.
//! [`BatchError`] and [`ServerError`] belong to the batch executor and the HTTP API.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Diagnostic context
// =============================================================================

/// The operand pair of the question being computed, as the author typed it.
///
/// Rendered the way producers know their columns:
/// `grid_fib_n1 = 48 & grid_fib_n2 = 27`.
///
/// Errors raised by the low-level parsers carry an empty pair until the engine
/// attaches the question's operands with [`InputError::with_pair`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandPair {
    pub n1: String,
    pub n2: String,
}

impl OperandPair {
    pub fn new(n1: impl Into<String>, n2: impl Into<String>) -> Self {
        Self {
            n1: n1.into(),
            n2: n2.into(),
        }
    }
}

impl fmt::Display for OperandPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid_fib_n1 = {} & grid_fib_n2 = {}", self.n1, self.n2)
    }
}

// =============================================================================
// Input Errors
// =============================================================================

/// Errors caused by unusable raw input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Operand is not a plain digit string.
    #[error("Malformed operand in '{field}': {value:?} must match ^[0-9]+$ :: {pair}")]
    MalformedOperand {
        field: &'static str,
        value: String,
        pair: OperandPair,
    },

    /// Operand (or a value derived from it) does not fit the engine's integers.
    #[error("Value in '{field}' is too large :: {pair}")]
    OperandTooLarge { field: &'static str, pair: OperandPair },

    /// Division by zero.
    #[error("Division by zero in '{field}' is not allowed :: {pair}")]
    ZeroDivisor { field: &'static str, pair: OperandPair },

    /// Grid subtraction with a minuend smaller than the subtrahend.
    #[error("Subtraction would be negative :: {pair}")]
    NegativeDifference { pair: OperandPair },

    /// Mask contains a character outside its row's alphabet.
    #[error("Invalid character {character:?} at position {position} in '{field}' :: {pair}")]
    InvalidMaskCharacter {
        field: &'static str,
        character: char,
        position: usize,
        pair: OperandPair,
    },

    /// `fib_type` tag is not one of the known shapes.
    #[error("Unrecognized fib_type {fib_type:?} :: {pair}")]
    UnrecognizedFibType { fib_type: String, pair: OperandPair },

    /// `fib_type` tag is known but not valid for this operation.
    #[error("fib_type {fib_type:?} is not supported for {operation} :: {pair}")]
    UnsupportedFibType {
        fib_type: String,
        operation: String,
        pair: OperandPair,
    },

    /// Required field is absent or empty.
    #[error("Missing required field '{field}' for {question} :: {pair}")]
    MissingField {
        field: &'static str,
        question: String,
        pair: OperandPair,
    },

    /// `l1_skill` is not an arithmetic operation the engine knows.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// `question_type` is not a layout the engine knows.
    #[error("Unknown question layout: {0}")]
    UnknownLayout(String),
}

impl InputError {
    /// Attach the question's operand pair to an error raised by a low-level parser.
    ///
    /// Variants without a pair are returned unchanged.
    pub fn with_pair(mut self, question: &OperandPair) -> Self {
        match &mut self {
            InputError::MalformedOperand { pair, .. }
            | InputError::OperandTooLarge { pair, .. }
            | InputError::InvalidMaskCharacter { pair, .. } => *pair = question.clone(),
            _ => {}
        }
        self
    }
}

// =============================================================================
// Structural Mask Errors
// =============================================================================

/// The digit row a mask targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskRow {
    Result,
    Quotient,
    Remainder,
}

/// Errors raised when a mask's shape does not match its arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// Bare length mismatch, before the row and operands are known.
    #[error("Mask '{field}' expects {expected} positions, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Addition carry row.
    #[error("Incorrect {field} :: {pair} (expected {expected} carry positions, got {actual})")]
    IncorrectCarryMask {
        field: &'static str,
        pair: OperandPair,
        expected: usize,
        actual: usize,
    },

    /// Subtraction regroup (borrow) row.
    #[error("Incorrect {field} :: {pair} (expected {expected} regroup positions, got {actual})")]
    IncorrectTopMask {
        field: &'static str,
        pair: OperandPair,
        expected: usize,
        actual: usize,
    },

    /// Result row of addition, subtraction or multiplication.
    #[error("Incorrect {field} :: {pair} (expected {expected} positions, got {actual})")]
    IncorrectResultMask {
        field: &'static str,
        pair: OperandPair,
        expected: usize,
        actual: usize,
    },

    /// Partial products or long-division steps.
    #[error("Incorrect {field} :: {pair} (expected segments {expected:?}, got {actual:?})")]
    IncorrectIntermediateMask {
        field: &'static str,
        pair: OperandPair,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Division quotient row.
    #[error("Incorrect {field} :: {pair} (expected {expected} positions, got {actual})")]
    IncorrectQuotientMask {
        field: &'static str,
        pair: OperandPair,
        expected: usize,
        actual: usize,
    },

    /// Division remainder row.
    #[error("Incorrect {field} :: {pair} (expected {expected} positions, got {actual})")]
    IncorrectRemainderMask {
        field: &'static str,
        pair: OperandPair,
        expected: usize,
        actual: usize,
    },
}

impl MaskError {
    /// Name of the mask field the error is about.
    pub fn field(&self) -> &'static str {
        match self {
            MaskError::LengthMismatch { field, .. }
            | MaskError::IncorrectCarryMask { field, .. }
            | MaskError::IncorrectTopMask { field, .. }
            | MaskError::IncorrectResultMask { field, .. }
            | MaskError::IncorrectIntermediateMask { field, .. }
            | MaskError::IncorrectQuotientMask { field, .. }
            | MaskError::IncorrectRemainderMask { field, .. } => field,
        }
    }

    /// Attach the row and operand pair to a bare [`MaskError::LengthMismatch`].
    ///
    /// Errors that already carry a row are returned unchanged.
    pub fn for_row(self, row: MaskRow, pair: &OperandPair) -> Self {
        let MaskError::LengthMismatch {
            field,
            expected,
            actual,
        } = self
        else {
            return self;
        };
        let pair = pair.clone();
        match row {
            MaskRow::Result => MaskError::IncorrectResultMask { field, pair, expected, actual },
            MaskRow::Quotient => MaskError::IncorrectQuotientMask { field, pair, expected, actual },
            MaskRow::Remainder => {
                MaskError::IncorrectRemainderMask { field, pair, expected, actual }
            }
        }
    }
}

// =============================================================================
// Answer-Key Errors (engine top-level)
// =============================================================================

/// Failure category of a single question, as reported to the staging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Input,
    Structural,
}

/// Everything the router can return for one question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerKeyError {
    /// Raw input problem.
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Mask shape problem.
    #[error("Structural error: {0}")]
    Mask(#[from] MaskError),
}

impl AnswerKeyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnswerKeyError::Input(_) => FailureKind::Input,
            AnswerKeyError::Mask(_) => FailureKind::Structural,
        }
    }
}

// =============================================================================
// Batch Errors
// =============================================================================

/// Errors that abort a whole batch (as opposed to a single record).
#[derive(Debug, Error)]
pub enum BatchError {
    /// Failed to read the batch file.
    #[error("Failed to read batch: {0}")]
    Io(#[from] std::io::Error),

    /// The batch is not a JSON array of objects.
    #[error("Invalid batch JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No records to compute.
    #[error("No records to compute")]
    EmptyInput,

    /// Batch exceeds the configured limit.
    #[error("Batch of {size} records exceeds the limit of {max}")]
    TooLarge { size: usize, max: usize },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Batch error.
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for input parsing.
pub type InputResult<T> = Result<T, InputError>;

/// Result type for mask shape checks.
pub type MaskResult<T> = Result<T, MaskError>;

/// Result type for answer-key computation.
pub type AnswerKeyResult<T> = Result<T, AnswerKeyError>;

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
