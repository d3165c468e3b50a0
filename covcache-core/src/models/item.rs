use crate::models::alignment::Alignment;
use crate::models::feature::Feature;
use crate::models::interval::ContigInterval;

/// Anything a coverage cache can count.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageItem {
    Alignment(Alignment),
    Feature(Feature),
}

impl CoverageItem {
    pub fn interval(&self) -> &ContigInterval {
        match self {
            CoverageItem::Alignment(alignment) => alignment.interval(),
            CoverageItem::Feature(feature) => &feature.position,
        }
    }

    pub fn contig(&self) -> &str {
        self.interval().contig()
    }
}

impl From<Alignment> for CoverageItem {
    fn from(value: Alignment) -> Self {
        CoverageItem::Alignment(value)
    }
}

impl From<Feature> for CoverageItem {
    fn from(value: Feature) -> Self {
        CoverageItem::Feature(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Strand, parse_cigar};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_interval_of_each_variant() {
        let read: CoverageItem = Alignment::new(
            "r1",
            "chr2:5-8".parse().unwrap(),
            Strand::Reverse,
            parse_cigar("4M").unwrap(),
            "ACGT",
        )
        .into();
        let peak: CoverageItem =
            Feature::new("peak1", "peak", "3:40-90".parse().unwrap(), 12.5).into();

        assert_eq!(read.contig(), "chr2");
        assert_eq!(read.interval().length(), 4);
        assert_eq!(peak.contig(), "3");
        assert_eq!(peak.interval().start(), 40);
    }
}
