//! Grid arithmetic answer-key engines
//!
//! This module provides:
//! - `addition`: carry row and result row
//! - `subtraction`: regroup (borrow) markers and result row
//! - `multiplication`: partial products and result row
//! - `division`: long-division steps, quotient and remainder
//! - `router`: dispatch on `(Operation, Layout)` and fill-in-the-blank rules
//!
//! Every engine is a pure function of its input: no I/O, no shared state. An
//! engine either returns a complete answer key or an error; it never returns a
//! partially masked key.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridkey::engine::{compute_answer, AnswerRequest};
//! use gridkey::models::{Layout, Operation};
//!
//! let request = AnswerRequest::new(Operation::Addition, Layout::Grid, "48", "27")
//!     .with_top_mask("F")
//!     .with_result_mask("FB")
//!     .with_show_carry(true);
//!
//! let key = compute_answer(&request)?;
//! ```

pub mod addition;
pub mod division;
pub mod multiplication;
pub mod router;
pub mod subtraction;

// Re-exports for convenience
pub use addition::{addition_grid, AdditionGridInput};
pub use division::{division_grid, long_division, DivisionGridInput, DivisionStep, LongDivision};
pub use multiplication::{multiplication_grid, partial_products, MultiplicationGridInput};
pub use router::{compute_answer, AnswerRequest, DisplayFlags, FibOptions, MaskSet};
pub use subtraction::{regroup_markers, subtraction_grid, RegroupMarker, SubtractionGridInput};

use crate::error::{InputError, InputResult, OperandPair};
use crate::models::Operand;

/// Column name of the first operand.
pub const N1_FIELD: &str = "grid_fib_n1";

/// Column name of the second operand.
pub const N2_FIELD: &str = "grid_fib_n2";

/// Parse both operands of a question. Errors carry the raw pair.
pub(crate) fn parse_operands(n1: &str, n2: &str) -> InputResult<(Operand, Operand)> {
    let parse = |field: &'static str, raw: &str| {
        Operand::parse(field, raw).map_err(|e| e.with_pair(&OperandPair::new(n1, n2)))
    };
    Ok((parse(N1_FIELD, n1)?, parse(N2_FIELD, n2)?))
}

/// Left-pad `digits` with zeros to `width`.
pub(crate) fn pad_start(digits: &str, width: usize) -> String {
    format!("{:0>width$}", digits, width = width)
}

/// Decimal digits of a digit string, most significant first.
pub(crate) fn digit_values(digits: &str) -> Vec<u8> {
    digits.bytes().map(|b| b - b'0').collect()
}

/// Overflow of the value written to `field`.
pub(crate) fn overflow(field: &'static str, pair: &OperandPair) -> InputError {
    InputError::OperandTooLarge {
        field,
        pair: pair.clone(),
    }
}
