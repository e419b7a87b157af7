//! Long-division answer keys
//!
//! The dividend is consumed left to right. Leading digits are gathered until the
//! running number reaches the divisor; after that every digit brought down is one
//! step of the grid, shown as the closest multiple and the difference under it.

use crate::error::{AnswerKeyResult, InputError, InputResult, MaskError, MaskRow, OperandPair};
use crate::mask::{apply_mask, validate_mask_length, MaskAlphabet, PrefillMask, SegmentedMask, SEGMENT_SEPARATOR};
use crate::models::{DivisionAnswer, DivisionStepRow, Operand};

use super::{overflow, pad_start, parse_operands, N1_FIELD, N2_FIELD};

/// Column name of the intermediate-steps mask.
pub const INTERMEDIATE_FIELD: &str = "grid1_div_intermediate_steps_prefills";

/// Column name of the quotient mask.
pub const QUOTIENT_FIELD: &str = "grid1_pre_fills_quotient";

/// Column name of the remainder mask.
pub const REMAINDER_FIELD: &str = "grid1_pre_fills_remainder";

/// Input of a grid division question
#[derive(Debug, Clone, Default)]
pub struct DivisionGridInput<'a> {
    pub n1: &'a str,
    pub n2: &'a str,
    pub intermediate_mask: &'a str,
    pub quotient_mask: &'a str,
    pub remainder_mask: &'a str,
}

/// One step of the long-division grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionStep {
    /// Closest multiple of the divisor and what is left after subtracting it
    Subtract { multiple: u64, difference: u64, width: usize },
    /// Final digit brought down below the divisor: nothing is subtracted
    BringDown { value: u64, width: usize },
}

impl DivisionStep {
    /// Column width of both rows of the step.
    pub fn width(&self) -> usize {
        match self {
            DivisionStep::Subtract { width, .. } | DivisionStep::BringDown { width, .. } => *width,
        }
    }

    /// The step's two rows, zero-padded to the step width.
    pub fn rows(&self) -> (String, String) {
        let (upper, lower) = match self {
            DivisionStep::Subtract { multiple, difference, .. } => (*multiple, *difference),
            DivisionStep::BringDown { value, .. } => (*value, 0),
        };
        let width = self.width();
        (pad_start(&upper.to_string(), width), pad_start(&lower.to_string(), width))
    }
}

/// Unmasked long division
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongDivision {
    pub quotient: String,
    pub remainder: u64,
    pub steps: Vec<DivisionStep>,
}

/// Run long division on `dividend` by `divisor`.
pub fn long_division(dividend: &Operand, divisor: &Operand, pair: &OperandPair) -> InputResult<LongDivision> {
    let d = divisor.value();
    if d == 0 {
        return Err(InputError::ZeroDivisor {
            field: N2_FIELD,
            pair: pair.clone(),
        });
    }

    let digits: Vec<u64> = dividend.digits().bytes().map(|b| u64::from(b - b'0')).collect();
    let bring_down = |running: u64, digit: u64| -> InputResult<u64> {
        running
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(|| overflow(N1_FIELD, pair))
    };

    // Leading digits that stay below the divisor produce no step
    let mut cursor = 0;
    let mut running = 0u64;
    while cursor < digits.len() {
        running = bring_down(running, digits[cursor])?;
        cursor += 1;
        if running >= d || cursor == digits.len() {
            break;
        }
    }

    let mut quotient = String::new();
    let mut steps = Vec::new();
    let mut current = running;
    loop {
        let is_last = cursor == digits.len();
        let width = current.to_string().len();

        if current < d && is_last {
            quotient.push('0');
            steps.push(DivisionStep::BringDown { value: current, width });
            running = current;
        } else {
            let digit = current / d;
            let multiple = digit * d;
            let difference = current - multiple;
            quotient.push_str(&digit.to_string());
            steps.push(DivisionStep::Subtract {
                multiple,
                difference,
                width,
            });
            running = difference;
        }

        if is_last {
            break;
        }
        current = bring_down(running, digits[cursor])?;
        cursor += 1;
    }

    let trimmed = quotient.trim_start_matches('0');
    Ok(LongDivision {
        quotient: if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() },
        remainder: running,
        steps,
    })
}

/// Compute the grid division answer key.
pub fn division_grid(input: &DivisionGridInput<'_>) -> AnswerKeyResult<DivisionAnswer> {
    let pair = OperandPair::new(input.n1, input.n2);
    let (dividend, divisor) = parse_operands(input.n1, input.n2)?;
    let division = long_division(&dividend, &divisor, &pair)?;

    let steps_mask = SegmentedMask::parse(
        INTERMEDIATE_FIELD,
        input.intermediate_mask,
        MaskAlphabet::WithStructural,
        &[SEGMENT_SEPARATOR],
    )
    .map_err(|e| e.with_pair(&pair))?;
    let quotient_mask = PrefillMask::parse(QUOTIENT_FIELD, input.quotient_mask, MaskAlphabet::WithStructural)
        .map_err(|e| e.with_pair(&pair))?;
    let remainder_mask = PrefillMask::parse(REMAINDER_FIELD, input.remainder_mask, MaskAlphabet::WithStructural)
        .map_err(|e| e.with_pair(&pair))?;

    let expected: Vec<usize> = division.steps.iter().map(|s| s.width() * 2).collect();
    let actual = steps_mask.shape();
    if expected != actual {
        return Err(MaskError::IncorrectIntermediateMask {
            field: INTERMEDIATE_FIELD,
            pair,
            expected,
            actual,
        }
        .into());
    }

    let remainder = division.remainder.to_string();
    validate_mask_length(&division.quotient, &quotient_mask, QUOTIENT_FIELD)
        .map_err(|e| e.for_row(MaskRow::Quotient, &pair))?;
    validate_mask_length(&remainder, &remainder_mask, REMAINDER_FIELD)
        .map_err(|e| e.for_row(MaskRow::Remainder, &pair))?;

    let intermediate_steps = division
        .steps
        .iter()
        .zip(steps_mask.segments())
        .map(|(step, segment)| {
            let (multiple, difference) = step.rows();
            let masked = apply_mask(&format!("{multiple}{difference}"), segment);
            let (upper, lower) = masked.split_at(step.width());
            DivisionStepRow {
                multiple: upper.to_string(),
                difference: lower.to_string(),
            }
        })
        .collect();

    Ok(DivisionAnswer {
        answer_quotient: apply_mask(&division.quotient, &quotient_mask),
        answer_remainder: apply_mask(&remainder, &remainder_mask),
        quotient: division.quotient,
        remainder,
        intermediate_steps,
    })
}
