//! Addition answer keys
//!
//! The grid shows a carry row above the operands. A carry cell exists above every
//! column except the least significant one, plus one overflow cell when the most
//! significant column carries out.

use crate::error::{AnswerKeyResult, MaskError, MaskRow, OperandPair};
use crate::mask::{apply_mask, validate_mask_length, MaskAlphabet, MaskToken, PrefillMask, BLANK, STRUCTURAL};
use crate::models::{AdditionAnswer, Operand};

use super::{digit_values, overflow, pad_start, parse_operands};

/// Column name of the carry mask.
pub const CARRY_FIELD: &str = "grid1_pre_fills_top";

/// Column name of the result mask.
pub const RESULT_FIELD: &str = "grid1_pre_fills_result";

/// Input of a grid addition question
#[derive(Debug, Clone, Default)]
pub struct AdditionGridInput<'a> {
    pub n1: &'a str,
    pub n2: &'a str,
    pub carry_mask: &'a str,
    pub result_mask: &'a str,
    pub show_carry: bool,
}

/// Compute the grid addition answer key.
pub fn addition_grid(input: &AdditionGridInput<'_>) -> AnswerKeyResult<AdditionAnswer> {
    let pair = OperandPair::new(input.n1, input.n2);
    let (n1, n2) = parse_operands(input.n1, input.n2)?;
    let carry_mask =
        PrefillMask::parse(CARRY_FIELD, input.carry_mask, MaskAlphabet::FillBlank).map_err(|e| e.with_pair(&pair))?;
    let result_mask =
        PrefillMask::parse(RESULT_FIELD, input.result_mask, MaskAlphabet::FillBlank).map_err(|e| e.with_pair(&pair))?;

    let width = n1.width().max(n2.width());
    let carries = carry_cells(&n1, &n2, width);
    let carry_count = carries.iter().filter(|c| **c).count();
    let is_prefilled = input.show_carry && carry_count > 0;

    let answer_top = if is_prefilled {
        if carry_mask.effective_len() != carry_count {
            return Err(MaskError::IncorrectCarryMask {
                field: CARRY_FIELD,
                pair,
                expected: carry_count,
                actual: carry_mask.effective_len(),
            }
            .into());
        }
        render_carry_row(&carries, &carry_mask)
    } else {
        BLANK.to_string().repeat(width)
    };

    let sum = n1.value().checked_add(n2.value()).ok_or_else(|| overflow(RESULT_FIELD, &pair))?;
    let result = pad_start(&sum.to_string(), width);
    validate_mask_length(&result, &result_mask, RESULT_FIELD)
        .map_err(|e| e.for_row(MaskRow::Result, &pair))?;

    Ok(AdditionAnswer {
        result: sum,
        is_prefilled,
        answer_top,
        answer_result: apply_mask(&result, &result_mask),
    })
}

/// Carry cells in reading order (most significant first).
///
/// `true` means a carry of 1 entered that column.
pub fn carry_cells(n1: &Operand, n2: &Operand, width: usize) -> Vec<bool> {
    let top = digit_values(&pad_start(n1.digits(), width));
    let bottom = digit_values(&pad_start(n2.digits(), width));

    // Carry out of each column, least significant first
    let mut carry = 0u8;
    let carried_out: Vec<bool> = top
        .iter()
        .rev()
        .zip(bottom.iter().rev())
        .map(|(a, b)| {
            carry = (a + b + carry) / 10;
            carry == 1
        })
        .collect();

    let mut cells: Vec<bool> = match carried_out.split_last() {
        Some((&top_carry, inner)) => {
            let mut cells = inner.to_vec();
            if top_carry {
                cells.push(true);
            }
            cells
        }
        None => Vec::new(),
    };
    cells.reverse();
    cells
}

fn render_carry_row(carries: &[bool], mask: &PrefillMask) -> String {
    let mut tokens = mask.effective_tokens();
    carries
        .iter()
        .map(|carried| {
            if !carried {
                return STRUCTURAL;
            }
            match tokens.next() {
                Some(MaskToken::Fill) => '1',
                _ => BLANK,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnswerKeyError, InputError};
    use proptest::prelude::*;

    fn input<'a>(n1: &'a str, n2: &'a str, carry: &'a str, result: &'a str, show: bool) -> AdditionGridInput<'a> {
        AdditionGridInput {
            n1,
            n2,
            carry_mask: carry,
            result_mask: result,
            show_carry: show,
        }
    }

    fn cells(n1: &str, n2: &str) -> Vec<bool> {
        let a = Operand::parse("grid_fib_n1", n1).unwrap();
        let b = Operand::parse("grid_fib_n2", n2).unwrap();
        carry_cells(&a, &b, a.width().max(b.width()))
    }

    #[test]
    fn test_single_carry_into_tens() {
        let answer = addition_grid(&input("48", "27", "F", "FB", true)).unwrap();
        assert_eq!(answer.result, 75);
        assert!(answer.is_prefilled);
        assert_eq!(answer.answer_top, "1");
        assert_eq!(answer.answer_result, "7B");

        let blank = addition_grid(&input("48", "27", "B", "BB", true)).unwrap();
        assert_eq!(blank.answer_top, "B");
        assert_eq!(blank.answer_result, "BB");
    }

    #[test]
    fn test_carry_cells() {
        // 48 + 27: only the tens column receives a carry
        assert_eq!(cells("48", "27"), vec![true]);
        // 99 + 1: carry into tens and an overflow carry into hundreds
        assert_eq!(cells("99", "1"), vec![true, true]);
        // 123 + 456: no carry, one cell per non-units column
        assert_eq!(cells("123", "456"), vec![false, false]);
        // 509 + 91: carry into tens and hundreds, none out of the top column
        assert_eq!(cells("509", "91"), vec![true, true]);
        assert_eq!(cells("5", "3"), Vec::<bool>::new());
    }

    #[test]
    fn test_mixed_carry_row() {
        // 158 + 67 = 225: carries into tens and hundreds
        let answer = addition_grid(&input("158", "67", "FB", "FFF", true)).unwrap();
        assert_eq!(answer.result, 225);
        assert_eq!(answer.answer_top, "1B");
        assert_eq!(answer.answer_result, "225");

        // 150 + 67 = 217: only the hundreds column receives a carry
        let answer = addition_grid(&input("150", "67", "F", "BBF", true)).unwrap();
        assert_eq!(answer.answer_top, "1#");
        assert_eq!(answer.answer_result, "BB7");
    }

    #[test]
    fn test_overflow_result_row() {
        let answer = addition_grid(&input("99", "1", "FF", "FBB", true)).unwrap();
        assert_eq!(answer.result, 100);
        assert_eq!(answer.answer_top, "11");
        assert_eq!(answer.answer_result, "1BB");
    }

    #[test]
    fn test_not_prefilled_without_carry() {
        let answer = addition_grid(&input("12", "34", "", "FF", true)).unwrap();
        assert!(!answer.is_prefilled);
        assert_eq!(answer.answer_top, "BB");
        assert_eq!(answer.answer_result, "46");
    }

    #[test]
    fn test_not_prefilled_when_carry_hidden() {
        // Carry mask is ignored when the carry row is not shown
        let answer = addition_grid(&input("48", "27", "FFFF", "FF", false)).unwrap();
        assert!(!answer.is_prefilled);
        assert_eq!(answer.answer_top, "BB");
    }

    #[test]
    fn test_result_padded_to_operand_width() {
        let answer = addition_grid(&input("05", "03", "", "BF", false)).unwrap();
        assert_eq!(answer.result, 8);
        assert_eq!(answer.answer_result, "B8");
    }

    #[test]
    fn test_incorrect_carry_mask() {
        let err = addition_grid(&input("48", "27", "FF", "FB", true)).unwrap_err();
        match &err {
            AnswerKeyError::Mask(MaskError::IncorrectCarryMask { expected, actual, pair, .. }) => {
                assert_eq!((*expected, *actual), (1, 2));
                assert_eq!(pair, &OperandPair::new("48", "27"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("grid1_pre_fills_top"));
    }

    #[test]
    fn test_incorrect_result_mask() {
        let err = addition_grid(&input("48", "27", "F", "FBF", true)).unwrap_err();
        assert!(matches!(
            err,
            AnswerKeyError::Mask(MaskError::IncorrectResultMask { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn test_structural_token_rejected() {
        let err = addition_grid(&input("48", "27", "#", "FB", true)).unwrap_err();
        assert!(matches!(
            err,
            AnswerKeyError::Input(InputError::InvalidMaskCharacter { field: "grid1_pre_fills_top", .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_uniform_result_masks(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let (n1, n2) = (a.to_string(), b.to_string());
            let width = n1.len().max(n2.len());
            let expected = pad_start(&(a + b).to_string(), width);

            let fill = "F".repeat(expected.len());
            let revealed = addition_grid(&input(&n1, &n2, "", &fill, false)).unwrap();
            prop_assert_eq!(&revealed.answer_result, &expected);

            let blank = "B".repeat(expected.len());
            let hidden = addition_grid(&input(&n1, &n2, "", &blank, false)).unwrap();
            prop_assert!(hidden.answer_result.chars().all(|c| c == BLANK));
        }
    }
}
