//! Multiplication answer keys
//!
//! With a multi-digit multiplier the grid shows one partial product per multiplier
//! digit, each already shifted by its place value (`23 × 14` shows `92` and `230`).

use crate::error::{AnswerKeyResult, InputResult, MaskError, MaskRow, OperandPair};
use crate::mask::{apply_mask, validate_mask_length, MaskAlphabet, PrefillMask, SegmentedMask, SEGMENT_SEPARATOR};
use crate::models::{MultiplicationAnswer, Operand};

use super::{overflow, pad_start, parse_operands};

/// Column name of the partial-products mask.
pub const INTERMEDIATE_FIELD: &str = "grid1_multiply_intermediate_steps_prefills";

/// Column name of the result mask.
pub const RESULT_FIELD: &str = "grid1_pre_fills_result";

/// Segment separators accepted in the partial-products mask.
///
/// `#` is the separator older sheets use; structural positions do not exist in
/// multiplication rows.
const SEPARATORS: [char; 2] = [SEGMENT_SEPARATOR, '#'];

/// Input of a grid multiplication question
#[derive(Debug, Clone, Default)]
pub struct MultiplicationGridInput<'a> {
    pub n1: &'a str,
    pub n2: &'a str,
    pub intermediate_mask: &'a str,
    pub result_mask: &'a str,
}

/// Compute the grid multiplication answer key.
pub fn multiplication_grid(input: &MultiplicationGridInput<'_>) -> AnswerKeyResult<MultiplicationAnswer> {
    let pair = OperandPair::new(input.n1, input.n2);
    let (multiplicand, multiplier) = parse_operands(input.n1, input.n2)?;
    let result_mask =
        PrefillMask::parse(RESULT_FIELD, input.result_mask, MaskAlphabet::FillBlank).map_err(|e| e.with_pair(&pair))?;

    let is_intermediate_prefilled = multiplier.width() > 1;
    let answer_intermediate = if is_intermediate_prefilled {
        let mask = SegmentedMask::parse(
            INTERMEDIATE_FIELD,
            input.intermediate_mask,
            MaskAlphabet::FillBlank,
            &SEPARATORS,
        )
        .map_err(|e| e.with_pair(&pair))?;
        let products = partial_products(&multiplicand, &multiplier, &pair)?;

        let expected: Vec<usize> = products.iter().map(String::len).collect();
        let actual = mask.shape();
        if expected != actual {
            return Err(MaskError::IncorrectIntermediateMask {
                field: INTERMEDIATE_FIELD,
                pair,
                expected,
                actual,
            }
            .into());
        }

        // Validated least significant first, displayed most significant first
        let mut rows: Vec<String> = products
            .iter()
            .zip(mask.segments())
            .map(|(product, segment)| apply_mask(product, segment))
            .collect();
        rows.reverse();
        rows.join(&SEGMENT_SEPARATOR.to_string())
    } else {
        String::new()
    };

    let product = multiplicand
        .value()
        .checked_mul(multiplier.value())
        .ok_or_else(|| overflow(RESULT_FIELD, &pair))?;
    let result = product.to_string();
    validate_mask_length(&result, &result_mask, RESULT_FIELD)
        .map_err(|e| e.for_row(MaskRow::Result, &pair))?;

    Ok(MultiplicationAnswer {
        result: product,
        is_intermediate_prefilled,
        answer_intermediate,
        answer_result: apply_mask(&result, &result_mask),
    })
}

/// Partial products, least significant multiplier digit first.
///
/// Each product is scaled by its place value. A zero product is written as zeros
/// spanning the multiplicand's width plus the place shift.
pub fn partial_products(multiplicand: &Operand, multiplier: &Operand, pair: &OperandPair) -> InputResult<Vec<String>> {
    let mut products = Vec::new();
    let mut remaining = multiplier.value();
    let mut place = 0usize;
    let mut factor = 1u64;

    while remaining > 0 {
        let digit = remaining % 10;
        let product = digit
            .checked_mul(multiplicand.value())
            .and_then(|p| p.checked_mul(factor))
            .ok_or_else(|| overflow(INTERMEDIATE_FIELD, pair))?;

        products.push(if product == 0 {
            pad_start("0", multiplicand.width() + place)
        } else {
            product.to_string()
        });

        remaining /= 10;
        place += 1;
        if remaining > 0 {
            factor = factor.checked_mul(10).ok_or_else(|| overflow(INTERMEDIATE_FIELD, pair))?;
        }
    }
    Ok(products)
}
