//! Answer-key dispatch
//!
//! An [`AnswerRequest`] names the operation and the layout of one question and
//! carries whatever masks, flags and fill-in-the-blank options the sheet gave.
//! [`compute_answer`] checks that the fields the question kind needs are present
//! and hands the request to the matching engine.

use crate::error::{AnswerKeyResult, InputError, InputResult, OperandPair};
use crate::models::{is_yes, AnswerKey, FibAnswer, FibType, FreeFormAnswer, Layout, Operation, QuestionRecord};

use super::addition::{self, addition_grid, AdditionGridInput};
use super::division::{self, division_grid, DivisionGridInput};
use super::multiplication::{self, multiplication_grid, MultiplicationGridInput};
use super::subtraction::{self, subtraction_grid, SubtractionGridInput};
use super::{overflow, parse_operands, N1_FIELD, N2_FIELD};

const FIB_ANSWER_FIELD: &str = "fib_answer";
const IMAGE_FIELD: &str = "question_image";

/// Prefill masks as authored in the sheet. `None` means the column is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskSet {
    pub top: Option<String>,
    pub result: Option<String>,
    pub multiply_steps: Option<String>,
    pub division_steps: Option<String>,
    pub quotient: Option<String>,
    pub remainder: Option<String>,
}

/// Which helper rows the grid shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayFlags {
    pub show_carry: bool,
    pub show_regroup: bool,
}

/// Fill-in-the-blank options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FibOptions {
    /// Raw `fib_type` tag, parsed when the answer is computed
    pub fib_type: Option<String>,
    pub answer: Option<String>,
    pub image: Option<String>,
}

/// Everything needed to compute one answer key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub operation: Operation,
    pub layout: Layout,
    pub n1: String,
    pub n2: String,
    pub masks: MaskSet,
    pub flags: DisplayFlags,
    pub fib: FibOptions,
}

impl AnswerRequest {
    pub fn new(operation: Operation, layout: Layout, n1: impl Into<String>, n2: impl Into<String>) -> Self {
        Self {
            operation,
            layout,
            n1: n1.into(),
            n2: n2.into(),
            masks: MaskSet::default(),
            flags: DisplayFlags::default(),
            fib: FibOptions::default(),
        }
    }

    pub fn with_top_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.top = Some(mask.into());
        self
    }

    pub fn with_result_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.result = Some(mask.into());
        self
    }

    pub fn with_multiply_steps_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.multiply_steps = Some(mask.into());
        self
    }

    pub fn with_division_steps_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.division_steps = Some(mask.into());
        self
    }

    pub fn with_quotient_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.quotient = Some(mask.into());
        self
    }

    pub fn with_remainder_mask(mut self, mask: impl Into<String>) -> Self {
        self.masks.remainder = Some(mask.into());
        self
    }

    pub fn with_show_carry(mut self, show: bool) -> Self {
        self.flags.show_carry = show;
        self
    }

    pub fn with_show_regroup(mut self, show: bool) -> Self {
        self.flags.show_regroup = show;
        self
    }

    pub fn with_fib_type(mut self, fib_type: impl Into<String>) -> Self {
        self.fib.fib_type = Some(fib_type.into());
        self
    }

    /// Supplied answer and image reference of an image-based question.
    pub fn with_supplied_answer(mut self, answer: impl Into<String>, image: impl Into<String>) -> Self {
        self.fib.answer = Some(answer.into());
        self.fib.image = Some(image.into());
        self
    }

    fn pair(&self) -> OperandPair {
        OperandPair::new(&self.n1, &self.n2)
    }

    /// Human-readable question kind used in missing-field messages.
    fn question(&self) -> String {
        format!("{} {}", self.layout.to_code(), self.operation)
    }

    fn require<'a>(&self, field: &'static str, value: &'a Option<String>) -> InputResult<&'a str> {
        value.as_deref().ok_or_else(|| InputError::MissingField {
            field,
            question: self.question(),
            pair: self.pair(),
        })
    }

    fn require_operands(&self) -> InputResult<()> {
        for (field, value) in [(N1_FIELD, &self.n1), (N2_FIELD, &self.n2)] {
            if value.trim().is_empty() {
                return Err(InputError::MissingField {
                    field,
                    question: self.question(),
                    pair: self.pair(),
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<&QuestionRecord> for AnswerRequest {
    type Error = InputError;

    fn try_from(record: &QuestionRecord) -> Result<Self, Self::Error> {
        let operation = Operation::from_code(&record.operation)
            .ok_or_else(|| InputError::UnknownOperation(record.operation.clone()))?;
        let layout = Layout::from_code(&record.question_type)
            .ok_or_else(|| InputError::UnknownLayout(record.question_type.clone()))?;

        let operand = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();

        Ok(Self {
            operation,
            layout,
            n1: operand(&record.grid_fib_n1),
            n2: operand(&record.grid_fib_n2),
            masks: MaskSet {
                top: record.grid1_pre_fills_top.clone(),
                result: record.grid1_pre_fills_result.clone(),
                multiply_steps: record.grid1_multiply_intermediate_steps_prefills.clone(),
                division_steps: record.grid1_div_intermediate_steps_prefills.clone(),
                quotient: record.grid1_pre_fills_quotient.clone(),
                remainder: record.grid1_pre_fills_remainder.clone(),
            },
            flags: DisplayFlags {
                show_carry: is_yes(record.grid1_show_carry.as_deref()),
                show_regroup: is_yes(record.grid1_show_regroup.as_deref()),
            },
            fib: FibOptions {
                fib_type: record.fib_type.clone(),
                answer: record.fib_answer.clone(),
                image: record.question_image.clone(),
            },
        })
    }
}

/// Compute the answer key of one question.
pub fn compute_answer(request: &AnswerRequest) -> AnswerKeyResult<AnswerKey> {
    let masks = &request.masks;
    match (request.operation, request.layout) {
        (Operation::Addition, Layout::Grid) => {
            request.require_operands()?;
            let input = AdditionGridInput {
                n1: &request.n1,
                n2: &request.n2,
                carry_mask: request.require(addition::CARRY_FIELD, &masks.top)?,
                result_mask: request.require(addition::RESULT_FIELD, &masks.result)?,
                show_carry: request.flags.show_carry,
            };
            addition_grid(&input).map(AnswerKey::AdditionGrid)
        }
        (Operation::Subtraction, Layout::Grid) => {
            request.require_operands()?;
            let input = SubtractionGridInput {
                n1: &request.n1,
                n2: &request.n2,
                top_mask: request.require(subtraction::TOP_FIELD, &masks.top)?,
                result_mask: request.require(subtraction::RESULT_FIELD, &masks.result)?,
                show_regroup: request.flags.show_regroup,
            };
            subtraction_grid(&input).map(AnswerKey::SubtractionGrid)
        }
        (Operation::Multiplication, Layout::Grid) => {
            request.require_operands()?;
            let input = MultiplicationGridInput {
                n1: &request.n1,
                n2: &request.n2,
                intermediate_mask: request.require(multiplication::INTERMEDIATE_FIELD, &masks.multiply_steps)?,
                result_mask: request.require(multiplication::RESULT_FIELD, &masks.result)?,
            };
            multiplication_grid(&input).map(AnswerKey::MultiplicationGrid)
        }
        (Operation::Division, Layout::Grid) => {
            request.require_operands()?;
            let input = DivisionGridInput {
                n1: &request.n1,
                n2: &request.n2,
                intermediate_mask: request.require(division::INTERMEDIATE_FIELD, &masks.division_steps)?,
                quotient_mask: request.require(division::QUOTIENT_FIELD, &masks.quotient)?,
                remainder_mask: request.require(division::REMAINDER_FIELD, &masks.remainder)?,
            };
            division_grid(&input).map(AnswerKey::DivisionGrid)
        }
        (operation, Layout::FreeForm) => Ok(AnswerKey::FreeForm(free_form(operation, request)?)),
    }
}

fn free_form(operation: Operation, request: &AnswerRequest) -> InputResult<FreeFormAnswer> {
    let fib_type = match request.fib.fib_type.as_deref() {
        None => FibType::Standard,
        Some(code) => FibType::from_code(code).ok_or_else(|| InputError::UnrecognizedFibType {
            fib_type: code.to_string(),
            pair: request.pair(),
        })?,
    };

    let result = match fib_type {
        FibType::WithImage => {
            let image = request.require(IMAGE_FIELD, &request.fib.image)?;
            let answer = request.require(FIB_ANSWER_FIELD, &request.fib.answer)?;
            for (field, value) in [(IMAGE_FIELD, image), (FIB_ANSWER_FIELD, answer)] {
                if value.trim().is_empty() {
                    return Err(InputError::MissingField {
                        field,
                        question: request.question(),
                        pair: request.pair(),
                    });
                }
            }
            FibAnswer::Supplied(answer.to_string())
        }
        FibType::QuotientRemainder if operation != Operation::Division => {
            return Err(InputError::UnsupportedFibType {
                fib_type: fib_type.to_code().to_string(),
                operation: operation.name().to_string(),
                pair: request.pair(),
            });
        }
        FibType::QuotientRemainder => {
            let (quotient, remainder) = checked_division(request)?;
            FibAnswer::QuotientRemainder { quotient, remainder }
        }
        FibType::Standard => FibAnswer::Number(standard_result(operation, request)?),
    };

    Ok(FreeFormAnswer {
        operation,
        fib_type,
        result,
    })
}

/// Bare result of a fill-in-the-blank question. Subtraction may go negative.
fn standard_result(operation: Operation, request: &AnswerRequest) -> InputResult<i64> {
    let pair = request.pair();
    if operation == Operation::Division {
        let (quotient, _) = checked_division(request)?;
        return i64::try_from(quotient).map_err(|_| overflow(N1_FIELD, &pair));
    }

    request.require_operands()?;
    let (n1, n2) = parse_operands(&request.n1, &request.n2)?;
    let a = i64::try_from(n1.value()).map_err(|_| overflow(N1_FIELD, &pair))?;
    let b = i64::try_from(n2.value()).map_err(|_| overflow(N2_FIELD, &pair))?;
    let value = match operation {
        Operation::Addition => a.checked_add(b),
        Operation::Subtraction => a.checked_sub(b),
        Operation::Multiplication => a.checked_mul(b),
        Operation::Division => a.checked_div(b),
    };
    value.ok_or_else(|| overflow(FIB_ANSWER_FIELD, &pair))
}

fn checked_division(request: &AnswerRequest) -> InputResult<(u64, u64)> {
    request.require_operands()?;
    let (n1, n2) = parse_operands(&request.n1, &request.n2)?;
    if n2.value() == 0 {
        return Err(InputError::ZeroDivisor {
            field: N2_FIELD,
            pair: request.pair(),
        });
    }
    Ok((n1.value() / n2.value(), n1.value() % n2.value()))
}
