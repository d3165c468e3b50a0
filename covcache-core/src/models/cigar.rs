use std::fmt::{self, Display};

use crate::errors::{IntervalError, IntervalResult};

/// The kind of a CIGAR operation, keyed by its SAM letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CigarOpKind {
    /// M
    Match,
    /// I
    Insertion,
    /// D
    Deletion,
    /// N
    Skip,
    /// S
    SoftClip,
    /// H
    HardClip,
    /// P
    Padding,
    /// =
    SequenceMatch,
    /// X
    SequenceMismatch,
    /// Any letter outside the SAM alphabet. Consumers decide how to step over it.
    Unknown(char),
}

impl CigarOpKind {
    pub fn from_char(c: char) -> CigarOpKind {
        match c {
            'M' => CigarOpKind::Match,
            'I' => CigarOpKind::Insertion,
            'D' => CigarOpKind::Deletion,
            'N' => CigarOpKind::Skip,
            'S' => CigarOpKind::SoftClip,
            'H' => CigarOpKind::HardClip,
            'P' => CigarOpKind::Padding,
            '=' => CigarOpKind::SequenceMatch,
            'X' => CigarOpKind::SequenceMismatch,
            other => CigarOpKind::Unknown(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            CigarOpKind::Match => 'M',
            CigarOpKind::Insertion => 'I',
            CigarOpKind::Deletion => 'D',
            CigarOpKind::Skip => 'N',
            CigarOpKind::SoftClip => 'S',
            CigarOpKind::HardClip => 'H',
            CigarOpKind::Padding => 'P',
            CigarOpKind::SequenceMatch => '=',
            CigarOpKind::SequenceMismatch => 'X',
            CigarOpKind::Unknown(c) => *c,
        }
    }

    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarOpKind::Match
                | CigarOpKind::Deletion
                | CigarOpKind::Skip
                | CigarOpKind::SequenceMatch
                | CigarOpKind::SequenceMismatch
        )
    }

    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarOpKind::Match
                | CigarOpKind::Insertion
                | CigarOpKind::SoftClip
                | CigarOpKind::SequenceMatch
                | CigarOpKind::SequenceMismatch
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CigarOpKind::Unknown(_))
    }
}

/// A single CIGAR operation with its kind and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CigarOp {
    pub kind: CigarOpKind,
    pub length: u32,
}

impl CigarOp {
    pub fn new(kind: CigarOpKind, length: u32) -> Self {
        CigarOp { kind, length }
    }
}

impl Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.kind.as_char())
    }
}

///
/// Parse a CIGAR string (`"10M2I5M"`) into its operations.
///
/// `"*"` and the empty string mean "no CIGAR" and yield an empty list.
/// Letters outside the SAM alphabet become [`CigarOpKind::Unknown`] instead of
/// failing, so one odd record does not sink a whole batch. A missing or
/// unparsable length is an error.
///
pub fn parse_cigar(cigar: &str) -> IntervalResult<Vec<CigarOp>> {
    let cigar = cigar.trim();
    if cigar.is_empty() || cigar == "*" {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut num_start = 0;

    for (i, c) in cigar.char_indices() {
        if c.is_ascii_digit() {
            continue;
        }
        let digits = &cigar[num_start..i];
        if digits.is_empty() {
            return Err(IntervalError::CigarParseError(format!(
                "operation '{c}' at offset {i} has no length in '{cigar}'"
            )));
        }
        let length = digits
            .parse::<u32>()
            .map_err(|e| IntervalError::CigarParseError(format!("{cigar}: {e}")))?;
        ops.push(CigarOp::new(CigarOpKind::from_char(c), length));
        num_start = i + c.len_utf8();
    }

    if num_start != cigar.len() {
        return Err(IntervalError::CigarParseError(format!(
            "trailing length without an operation in '{cigar}'"
        )));
    }

    Ok(ops)
}

/// Sum of the lengths of reference-consuming operations.
pub fn reference_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.kind.consumes_reference())
        .map(|op| op.length as u64)
        .sum()
}

/// Sum of the lengths of query-consuming operations.
pub fn query_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.kind.consumes_query())
        .map(|op| op.length as u64)
        .sum()
}
