//! Prefill masks
//!
//! A prefill mask says, per digit of a grid row, whether the student sees the digit
//! (`F`), gets an empty box (`B`), or whether no box exists in that column at all
//! (`#`). Masks are authored next to the operands in the question sheet, so every
//! engine validates their shape before applying them.

use std::fmt;

use crate::error::{InputError, InputResult, MaskError, MaskResult, OperandPair};

/// Marker rendered in place of a hidden digit.
pub const BLANK: char = 'B';

/// Marker for a column that has no digit.
pub const STRUCTURAL: char = '#';

/// Separator between intermediate-step segments.
pub const SEGMENT_SEPARATOR: char = '|';

/// One position of a prefill mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskToken {
    /// Reveal the underlying digit
    Fill,
    /// Hide the digit
    Blank,
    /// No digit exists at this column
    Structural,
}

impl MaskToken {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'F' => Some(Self::Fill),
            'B' => Some(Self::Blank),
            '#' => Some(Self::Structural),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Fill => 'F',
            Self::Blank => BLANK,
            Self::Structural => STRUCTURAL,
        }
    }

    /// Render `digit` through this token.
    pub fn render(&self, digit: char) -> char {
        match self {
            Self::Blank => BLANK,
            Self::Fill | Self::Structural => digit,
        }
    }
}

/// Characters a mask may contain for a given row type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskAlphabet {
    /// `F` and `B` (addition, multiplication)
    FillBlank,
    /// `F`, `B` and `#` (subtraction, division)
    WithStructural,
}

impl MaskAlphabet {
    fn allows(&self, token: MaskToken) -> bool {
        match self {
            Self::FillBlank => token != MaskToken::Structural,
            Self::WithStructural => true,
        }
    }
}

/// A parsed prefill mask for one digit row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrefillMask {
    tokens: Vec<MaskToken>,
}

impl PrefillMask {
    /// Parse a mask string, rejecting characters outside `alphabet`.
    pub fn parse(field: &'static str, raw: &str, alphabet: MaskAlphabet) -> InputResult<Self> {
        let tokens = raw
            .chars()
            .enumerate()
            .map(|(position, character)| {
                MaskToken::from_char(character)
                    .filter(|t| alphabet.allows(*t))
                    .ok_or(InputError::InvalidMaskCharacter {
                        field,
                        character,
                        position,
                        pair: OperandPair::default(),
                    })
            })
            .collect::<InputResult<Vec<_>>>()?;
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[MaskToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of positions that target a digit (everything except `#`).
    pub fn effective_len(&self) -> usize {
        self.effective_tokens().count()
    }

    /// Tokens that target a digit, left to right.
    pub fn effective_tokens(&self) -> impl Iterator<Item = MaskToken> + '_ {
        self.tokens
            .iter()
            .copied()
            .filter(|t| *t != MaskToken::Structural)
    }
}

impl fmt::Display for PrefillMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens.iter().try_for_each(|t| write!(f, "{}", t.as_char()))
    }
}

/// A mask split into one segment per intermediate step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SegmentedMask {
    segments: Vec<PrefillMask>,
}

impl SegmentedMask {
    /// Parse a segmented mask. An empty string has no segments.
    pub fn parse(
        field: &'static str,
        raw: &str,
        alphabet: MaskAlphabet,
        separators: &[char],
    ) -> InputResult<Self> {
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let mut segments = Vec::new();
        let mut offset = 0;
        for part in raw.split(|c| separators.contains(&c)) {
            let segment = PrefillMask::parse(field, part, alphabet).map_err(|e| match e {
                InputError::InvalidMaskCharacter {
                    field,
                    character,
                    position,
                    pair,
                } => InputError::InvalidMaskCharacter {
                    field,
                    character,
                    position: position + offset,
                    pair,
                },
                other => other,
            })?;
            offset += part.chars().count() + 1;
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PrefillMask] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Effective length of each segment.
    pub fn shape(&self) -> Vec<usize> {
        self.segments.iter().map(PrefillMask::effective_len).collect()
    }
}

/// Check that `mask` targets exactly the digits of `digits`.
pub fn validate_mask_length(digits: &str, mask: &PrefillMask, field: &'static str) -> MaskResult<()> {
    let expected = digits.chars().count();
    let actual = mask.effective_len();
    if expected == actual {
        Ok(())
    } else {
        Err(MaskError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

/// Overlay `mask` onto `digits`, right-aligned.
///
/// Only effective tokens take part; `#` positions in the mask are skipped.
/// Positions the mask does not reach (when the caller padded `digits`) render as
/// blanks.
pub fn apply_mask(digits: &str, mask: &PrefillMask) -> String {
    let effective: Vec<MaskToken> = mask.effective_tokens().collect();
    let mut tokens = effective.iter().rev();
    let mut rendered: Vec<char> = digits
        .chars()
        .rev()
        .map(|digit| match tokens.next() {
            Some(token) => token.render(digit),
            None => BLANK,
        })
        .collect();
    rendered.reverse();
    rendered.into_iter().collect()
}

/// Overlay the effective tokens of `mask` onto `cells`, left to right.
///
/// Cells past the last effective token are left as they are; callers validate the
/// count first.
pub fn apply_mask_to_cells(cells: &[String], mask: &PrefillMask) -> Vec<String> {
    let mut tokens = mask.effective_tokens();
    cells
        .iter()
        .map(|cell| match tokens.next() {
            Some(MaskToken::Blank) => BLANK.to_string(),
            _ => cell.clone(),
        })
        .collect()
}
