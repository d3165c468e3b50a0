use std::cmp::{max, min};
use std::fmt::{self, Display};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::errors::{IntervalError, IntervalResult};
use crate::utils::normalize_contig_name;

///
/// A span on a named contig, closed on both ends: [start, stop]
///
/// Contig names are matched after stripping an optional leading "chr",
/// so `chr17:100-200` and `17:100-200` describe the same bases.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContigInterval {
    contig: String,
    start: u32,
    stop: u32,
}

impl ContigInterval {
    pub fn new(contig: impl Into<String>, start: u32, stop: u32) -> IntervalResult<Self> {
        let contig = contig.into();
        if start > stop {
            return Err(IntervalError::InvalidInterval {
                contig,
                start,
                stop,
            });
        }
        Ok(ContigInterval {
            contig,
            start,
            stop,
        })
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// The contig name without a leading "chr".
    pub fn normalized_contig(&self) -> &str {
        normalize_contig_name(&self.contig)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn stop(&self) -> u32 {
        self.stop
    }

    ///
    /// Number of positions covered, `stop - start + 1`. Wider than the
    /// coordinates so that `0..=u32::MAX` still has a length.
    ///
    pub fn length(&self) -> u64 {
        (self.stop - self.start) as u64 + 1
    }

    pub fn positions(&self) -> RangeInclusive<u32> {
        self.start..=self.stop
    }

    pub fn is_on_contig(&self, contig: &str) -> bool {
        self.normalized_contig() == normalize_contig_name(contig)
    }

    pub fn contains(&self, contig: &str, position: u32) -> bool {
        self.is_on_contig(contig) && self.start <= position && position <= self.stop
    }

    pub fn contains_interval(&self, other: &ContigInterval) -> bool {
        self.is_on_contig(&other.contig) && self.start <= other.start && other.stop <= self.stop
    }

    pub fn intersects(&self, other: &ContigInterval) -> bool {
        self.is_on_contig(&other.contig) && self.start <= other.stop && other.start <= self.stop
    }

    ///
    /// The shared span of two intervals, keeping this interval's contig name.
    ///
    pub fn intersection(&self, other: &ContigInterval) -> Option<ContigInterval> {
        if !self.intersects(other) {
            return None;
        }
        Some(ContigInterval {
            contig: self.contig.clone(),
            start: max(self.start, other.start),
            stop: min(self.stop, other.stop),
        })
    }
}

impl Display for ContigInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.stop)
    }
}

impl FromStr for ContigInterval {
    type Err = IntervalError;

    ///
    /// Parse `contig:start-stop`, or `contig:position` for a single base.
    /// Thousands separators (`chr1:1,000-2,000`) are accepted.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (contig, span) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| IntervalError::RegionParseError(s.to_string()))?;

        if contig.is_empty() {
            return Err(IntervalError::RegionParseError(s.to_string()));
        }

        let parse_coord = |value: &str| -> IntervalResult<u32> {
            value
                .replace(',', "")
                .parse::<u32>()
                .map_err(|e| IntervalError::RegionParseError(format!("{s}: {e}")))
        };

        let (start, stop) = match span.split_once('-') {
            Some((start, stop)) => (parse_coord(start)?, parse_coord(stop)?),
            None => {
                let position = parse_coord(span)?;
                (position, position)
            }
        };

        ContigInterval::new(contig, start, stop)
    }
}
