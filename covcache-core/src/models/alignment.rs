use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::IntervalError;
use crate::models::cigar::{CigarOp, query_length, reference_length};
use crate::models::interval::ContigInterval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(IntervalError::StrandParseError(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// An aligned read: where it sits on the reference, how its bases map there
/// (CIGAR operations, left to right) and the bases themselves.
///
/// The interval should span exactly the reference-consuming operations and the
/// sequence exactly the query-consuming ones. This is not enforced here;
/// see [`Alignment::is_consistent`].
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    name: String,
    interval: ContigInterval,
    strand: Strand,
    cigar: Vec<CigarOp>,
    sequence: String,
}

impl Alignment {
    pub fn new(
        name: impl Into<String>,
        interval: ContigInterval,
        strand: Strand,
        cigar: Vec<CigarOp>,
        sequence: impl Into<String>,
    ) -> Self {
        Alignment {
            name: name.into(),
            interval,
            strand,
            cigar,
            sequence: sequence.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> &ContigInterval {
        &self.interval
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn cigar_ops(&self) -> &[CigarOp] {
        &self.cigar
    }

    /// The read bases, empty when the source did not provide them.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn is_consistent(&self) -> bool {
        reference_length(&self.cigar) == self.interval.length()
            && query_length(&self.cigar) == self.sequence.len() as u64
    }
}
