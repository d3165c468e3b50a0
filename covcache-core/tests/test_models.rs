//! Integration tests for the item models as a data source would build them:
//! parse a region and a CIGAR, wrap the result as a coverage item.

use covcache_core::IntervalError;
use covcache_core::models::{
    Alignment, CigarOpKind, ContigInterval, CoverageItem, Feature, Strand, parse_cigar,
    query_length, reference_length,
};

use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("chr1:100-200", "101M", "", true)]
#[case("chr1:100-200", "101M", "A", false)]
#[case("chr1:100-109", "2S5M3D2M1H", "AAAAAAAAA", true)]
#[case("chr1:100-104", "5M", "ACGTA", true)]
#[case("chr1:100-104", "3M2S", "ACGTT", false)]
fn test_alignment_consistency(
    #[case] region: &str,
    #[case] cigar: &str,
    #[case] sequence: &str,
    #[case] consistent: bool,
) {
    let cigar = parse_cigar(cigar).unwrap();
    // a read without bases only has to match the reference span
    let sequence = match sequence.is_empty() {
        true => "N".repeat(query_length(&cigar) as usize),
        false => sequence.to_string(),
    };
    let read = Alignment::new("r", region.parse().unwrap(), Strand::Reverse, cigar, sequence);
    assert_eq!(read.is_consistent(), consistent);
}

#[rstest]
fn test_spliced_read_spans() {
    let ops = parse_cigar("10M1000N10M").unwrap();
    assert_eq!(reference_length(&ops), 1020);
    assert_eq!(query_length(&ops), 20);
    assert_eq!(ops[1].kind, CigarOpKind::Skip);
    assert_eq!(ops[1].kind.consumes_reference(), true);
    assert_eq!(ops[1].kind.consumes_query(), false);
}

#[rstest]
fn test_items_share_contig_view() {
    let interval: ContigInterval = "chr17:1,000-1,099".parse().unwrap();
    let read: CoverageItem = Alignment::new(
        "r",
        interval.clone(),
        Strand::Forward,
        parse_cigar("100M").unwrap(),
        "",
    )
    .into();
    let peak: CoverageItem = Feature::new("p", "peak", "17:1050-1200".parse().unwrap(), 3.5).into();

    assert_eq!(read.contig(), "chr17");
    assert_eq!(peak.contig(), "17");
    assert_eq!(read.interval().intersects(peak.interval()), true);
    assert_eq!(
        read.interval().intersection(peak.interval()),
        Some(ContigInterval::new("chr17", 1050, 1099).unwrap())
    );
}

#[rstest]
#[case("chr1:200-100")]
#[case("chr1")]
#[case(":1-2")]
fn test_bad_regions(#[case] region: &str) {
    assert!(region.parse::<ContigInterval>().is_err());
}

#[rstest]
fn test_inverted_interval_error() {
    assert_eq!(
        ContigInterval::new("chr1", 5, 4),
        Err(IntervalError::InvalidInterval {
            contig: "chr1".to_string(),
            start: 5,
            stop: 4
        })
    );
}
