use std::collections::BTreeMap;

use fxhash::FxHashMap;
use serde::Serialize;

/// Sparse position -> statistics map for one contig.
pub type BinMap = FxHashMap<u32, Bin>;

///
/// Aggregated statistics for a single reference position.
///
/// `ref_base` and `mismatches` appear only once a mismatch update has covered a
/// position that received read bases. Such a position always carries
/// `ref_base`, even when every base agrees with it; only `mismatches` is then
/// absent. `mismatches` is never present with zero entries; whatever part of
/// `count` it does not account for agrees with `ref_base` (or came from
/// features).
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub count: u32,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_base: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatches: Option<BTreeMap<char, u32>>,
}

impl Bin {
    pub fn new(count: u32) -> Self {
        Bin {
            count,
            ..Default::default()
        }
    }

    /// A bin annotated against `ref_base`; an empty `mismatches` slice leaves the map unset.
    pub fn annotated(count: u32, ref_base: char, mismatches: &[(char, u32)]) -> Self {
        let mismatches = match mismatches.is_empty() {
            true => None,
            false => Some(mismatches.iter().copied().collect()),
        };
        Bin {
            count,
            ref_base: Some(ref_base),
            mismatches,
        }
    }

    pub fn mismatch_total(&self) -> u32 {
        self.mismatches
            .as_ref()
            .map_or(0, |m| m.values().sum())
    }

    /// Items at this position that do not disagree with the reference.
    pub fn matching_count(&self) -> u32 {
        self.count.saturating_sub(self.mismatch_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_counts() {
        let bin = Bin::annotated(6, 'A', &[('T', 1), ('G', 1)]);
        assert_eq!(bin.mismatch_total(), 2);
        assert_eq!(bin.matching_count(), 4);

        let plain = Bin::new(3);
        assert_eq!(plain.mismatch_total(), 0);
        assert_eq!(plain.matching_count(), 3);
    }

    #[rstest]
    fn test_annotated_without_mismatches() {
        let bin = Bin::annotated(2, 'C', &[]);
        assert_eq!(bin.mismatches, None);
        assert_eq!(bin.ref_base, Some('C'));
    }

    #[rstest]
    fn test_serialize_skips_unset_fields() {
        assert_eq!(
            serde_json::to_string(&Bin::new(1)).unwrap(),
            r#"{"count":1}"#
        );
        assert_eq!(
            serde_json::to_string(&Bin::annotated(3, 'A', &[('C', 1)])).unwrap(),
            r#"{"count":3,"ref":"A","mismatches":{"C":1}}"#
        );
        assert_eq!(
            serde_json::to_string(&Bin::annotated(2, 'C', &[])).unwrap(),
            r#"{"count":2,"ref":"C"}"#
        );
    }
}
