//! Subtraction answer keys
//!
//! The grid shows a regroup row above the minuend: a column that borrowed shows its
//! digit plus ten, a column that lent shows its reduced digit, and untouched
//! columns have no box.

use std::fmt;

use crate::error::{AnswerKeyResult, InputError, MaskError, MaskRow, OperandPair};
use crate::mask::{apply_mask, apply_mask_to_cells, validate_mask_length, MaskAlphabet, PrefillMask, STRUCTURAL};
use crate::models::SubtractionAnswer;

use super::{digit_values, pad_start, parse_operands};

/// Column name of the regroup mask.
pub const TOP_FIELD: &str = "grid1_pre_fills_top";

/// Column name of the result mask.
pub const RESULT_FIELD: &str = "grid1_pre_fills_result";

/// Separator between regroup cells in the rendered top row.
pub const CELL_SEPARATOR: &str = "|";

/// Input of a grid subtraction question
#[derive(Debug, Clone, Default)]
pub struct SubtractionGridInput<'a> {
    pub n1: &'a str,
    pub n2: &'a str,
    pub top_mask: &'a str,
    pub result_mask: &'a str,
    pub show_regroup: bool,
}

/// Marker above one minuend column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegroupMarker {
    /// Column took no part in borrowing
    Untouched,
    /// Column borrowed ten: its working digit plus ten
    Borrowed(u8),
    /// Column lent (or passed a borrow through): its reduced digit
    Reduced(u8),
}

impl RegroupMarker {
    pub fn is_fillable(&self) -> bool {
        !matches!(self, RegroupMarker::Untouched)
    }
}

impl fmt::Display for RegroupMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegroupMarker::Untouched => write!(f, "{}", STRUCTURAL),
            RegroupMarker::Borrowed(v) | RegroupMarker::Reduced(v) => write!(f, "{}", v),
        }
    }
}

/// Compute the grid subtraction answer key.
pub fn subtraction_grid(input: &SubtractionGridInput<'_>) -> AnswerKeyResult<SubtractionAnswer> {
    let pair = OperandPair::new(input.n1, input.n2);
    let (n1, n2) = parse_operands(input.n1, input.n2)?;
    let top_mask = PrefillMask::parse(TOP_FIELD, input.top_mask, MaskAlphabet::WithStructural)
        .map_err(|e| e.with_pair(&pair))?;
    let result_mask = PrefillMask::parse(RESULT_FIELD, input.result_mask, MaskAlphabet::WithStructural)
        .map_err(|e| e.with_pair(&pair))?;

    let difference = n1
        .value()
        .checked_sub(n2.value())
        .ok_or_else(|| InputError::NegativeDifference { pair: pair.clone() })?;

    let width = n1.width().max(n2.width());
    let markers = regroup_markers(&pad_start(n1.digits(), width), &pad_start(n2.digits(), width));
    let fillable = markers.iter().filter(|m| m.is_fillable()).count();
    let is_prefilled = input.show_regroup && fillable > 0;

    let mut cells: Vec<String> = markers.iter().map(ToString::to_string).collect();
    if is_prefilled {
        if top_mask.effective_len() != fillable {
            return Err(MaskError::IncorrectTopMask {
                field: TOP_FIELD,
                pair,
                expected: fillable,
                actual: top_mask.effective_len(),
            }
            .into());
        }
        cells = mask_fillable_cells(&markers, cells, &top_mask);
    }

    let raw = difference.to_string();
    let result = if keeps_natural_width(n1.width(), n2.width(), &raw) {
        raw
    } else {
        pad_start(&raw, width)
    };
    validate_mask_length(&result, &result_mask, RESULT_FIELD)
        .map_err(|e| e.for_row(MaskRow::Result, &pair))?;

    Ok(SubtractionAnswer {
        answer_result: apply_mask(&result, &result_mask),
        result,
        is_prefilled,
        answer_top: cells.join(CELL_SEPARATOR),
    })
}

/// Two-digit minus one-digit with a one-digit difference is shown unpadded.
fn keeps_natural_width(minuend_width: usize, subtrahend_width: usize, difference: &str) -> bool {
    minuend_width == 2 && subtrahend_width == 1 && difference.len() == 1
}

/// Regroup markers for equal-width digit strings, most significant first.
///
/// The minuend must not be smaller than the subtrahend.
pub fn regroup_markers(top: &str, bottom: &str) -> Vec<RegroupMarker> {
    let original = digit_values(top);
    let bottom = digit_values(bottom);
    let mut working = original.clone();
    let mut markers = vec![RegroupMarker::Untouched; original.len()];

    for column in (0..original.len()).rev() {
        let digit = working[column];
        if digit < bottom[column] {
            markers[column] = RegroupMarker::Borrowed(digit + 10);
            working = borrow(&working, column);
            if column > 0 {
                markers[column - 1] = RegroupMarker::Reduced(working[column - 1]);
            }
        } else if original[column] != working[column] {
            markers[column] = RegroupMarker::Reduced(working[column]);
        }
    }
    markers
}

/// Take one from the nearest non-zero digit left of `column`.
///
/// Zeros passed on the way become nines.
fn borrow(digits: &[u8], column: usize) -> Vec<u8> {
    let mut next = digits.to_vec();
    for left in (0..column).rev() {
        if next[left] > 0 {
            next[left] -= 1;
            break;
        }
        next[left] = 9;
    }
    next
}

fn mask_fillable_cells(markers: &[RegroupMarker], cells: Vec<String>, mask: &PrefillMask) -> Vec<String> {
    let fillable: Vec<String> = markers
        .iter()
        .zip(&cells)
        .filter(|(m, _)| m.is_fillable())
        .map(|(_, c)| c.clone())
        .collect();
    let mut masked = apply_mask_to_cells(&fillable, mask).into_iter();

    markers
        .iter()
        .zip(cells)
        .map(|(m, cell)| {
            if m.is_fillable() {
                masked.next().unwrap_or(cell)
            } else {
                cell
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnswerKeyError;
    use proptest::prelude::*;

    fn input<'a>(n1: &'a str, n2: &'a str, top: &'a str, result: &'a str, show: bool) -> SubtractionGridInput<'a> {
        SubtractionGridInput {
            n1,
            n2,
            top_mask: top,
            result_mask: result,
            show_regroup: show,
        }
    }

    fn rendered(top: &str, bottom: &str) -> Vec<String> {
        regroup_markers(top, bottom).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_regroup_markers() {
        assert_eq!(rendered("52", "07"), vec!["4", "12"]);
        assert_eq!(rendered("75", "23"), vec!["#", "#"]);
        assert_eq!(rendered("321", "139"), vec!["2", "11", "11"]);
    }

    #[test]
    fn test_borrow_through_zeros() {
        assert_eq!(rendered("1003", "0008"), vec!["0", "9", "9", "13"]);
        assert_eq!(rendered("302", "008"), vec!["2", "9", "12"]);
        assert_eq!(borrow(&[1, 0, 0, 3], 3), vec![0, 9, 9, 3]);
    }

    #[test]
    fn test_two_digit_minus_one_digit_keeps_two_digits() {
        let answer = subtraction_grid(&input("52", "7", "FB", "FF", true)).unwrap();
        assert_eq!(answer.result, "45");
        assert!(answer.is_prefilled);
        assert_eq!(answer.answer_top, "4|B");
        assert_eq!(answer.answer_result, "45");

        let answer = subtraction_grid(&input("31", "3", "FF", "BF", true)).unwrap();
        assert_eq!(answer.result, "28");
        assert_eq!(answer.answer_top, "2|11");
        assert_eq!(answer.answer_result, "B8");
    }

    #[test]
    fn test_single_digit_difference_is_not_padded() {
        let answer = subtraction_grid(&input("10", "9", "BF", "F", true)).unwrap();
        assert_eq!(answer.result, "1");
        assert_eq!(answer.answer_top, "B|10");
        assert_eq!(answer.answer_result, "1");

        // A one-digit result mask is the only accepted shape here
        let err = subtraction_grid(&input("10", "9", "BF", "FF", true)).unwrap_err();
        assert!(matches!(
            err,
            AnswerKeyError::Mask(MaskError::IncorrectResultMask { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_padding_applies_outside_the_exception() {
        // Subtrahend written with two digits
        let answer = subtraction_grid(&input("12", "05", "FF", "FF", false)).unwrap();
        assert_eq!(answer.result, "07");

        // Three-digit minuend
        let answer = subtraction_grid(&input("100", "1", "FFF", "BFF", false)).unwrap();
        assert_eq!(answer.result, "099");
        assert_eq!(answer.answer_result, "B99");
    }

    #[test]
    fn test_not_prefilled_without_regroup() {
        let answer = subtraction_grid(&input("75", "23", "", "FF", true)).unwrap();
        assert!(!answer.is_prefilled);
        assert_eq!(answer.answer_top, "#|#");
        assert_eq!(answer.answer_result, "52");
    }

    #[test]
    fn test_hidden_regroup_row_keeps_markers() {
        let answer = subtraction_grid(&input("52", "7", "", "FF", false)).unwrap();
        assert!(!answer.is_prefilled);
        assert_eq!(answer.answer_top, "4|12");
    }

    #[test]
    fn test_top_mask_may_mark_structural_columns() {
        // 321 - 139: every column regroups; '#' entries in the mask are ignored
        let answer = subtraction_grid(&input("321", "139", "#FBF", "FFF", true)).unwrap();
        assert_eq!(answer.answer_top, "2|B|11");
        assert_eq!(answer.result, "182");
    }

    #[test]
    fn test_incorrect_top_mask() {
        let err = subtraction_grid(&input("52", "7", "F", "FF", true)).unwrap_err();
        assert!(matches!(
            err,
            AnswerKeyError::Mask(MaskError::IncorrectTopMask { expected: 2, actual: 1, .. })
        ));
        assert!(err.to_string().contains("grid_fib_n1 = 52 & grid_fib_n2 = 7"));
    }

    #[test]
    fn test_negative_difference_is_input_error() {
        let err = subtraction_grid(&input("7", "52", "", "", true)).unwrap_err();
        assert!(matches!(err, AnswerKeyError::Input(InputError::NegativeDifference { .. })));
    }

    proptest! {
        #[test]
        fn prop_uniform_masks(x in 0u64..1_000_000, y in 0u64..1_000_000) {
            let (a, b) = if x >= y { (x, y) } else { (y, x) };
            let (n1, n2) = (a.to_string(), b.to_string());
            let width = n1.len().max(n2.len());
            let markers = regroup_markers(&pad_start(&n1, width), &pad_start(&n2, width));
            let fillable = markers.iter().filter(|m| m.is_fillable()).count();
            let raw = (a - b).to_string();
            let expected = if keeps_natural_width(n1.len(), n2.len(), &raw) { raw } else { pad_start(&raw, width) };
            let top: Vec<String> = markers.iter().map(ToString::to_string).collect();

            let revealed = subtraction_grid(&input(&n1, &n2, &"F".repeat(fillable), &"F".repeat(expected.len()), true)).unwrap();
            prop_assert_eq!(&revealed.answer_result, &expected);
            prop_assert_eq!(&revealed.answer_top, &top.join(CELL_SEPARATOR));

            let hidden = subtraction_grid(&input(&n1, &n2, &"B".repeat(fillable), &"B".repeat(expected.len()), true)).unwrap();
            prop_assert!(hidden.answer_result.chars().all(|c| c == 'B'));
            for (marker, cell) in markers.iter().zip(hidden.answer_top.split(CELL_SEPARATOR)) {
                let shown = if marker.is_fillable() { "B".to_string() } else { marker.to_string() };
                prop_assert_eq!(cell, shown.as_str());
            }
        }
    }
}
