use std::path::Path;

use fxhash::FxHashMap;
use log::debug;
use once_cell::sync::Lazy;

use covcache_core::models::{Alignment, ContigInterval, CoverageItem, Feature};
use covcache_core::utils::normalize_contig_name;

use crate::bins::{Bin, BinMap};
use crate::config::CoverageConfig;
use crate::contig::ContigCoverage;
use crate::errors::{CoverageResult, ReferenceError};
use crate::mismatch::{MismatchRequest, MismatchUpdate, resolve_reference};
use crate::reference::ReferenceSource;
use crate::shared::SharedCoverageCache;

static EMPTY_BINS: Lazy<BinMap> = Lazy::new(BinMap::default);

///
/// Per-contig depth and mismatch aggregation over a stream of reads and
/// features.
///
/// Items are pushed one at a time with [`CoverageCache::add_item`]; a renderer
/// later reads [`CoverageCache::bins_for_ref`] and
/// [`CoverageCache::max_coverage_for_ref`], and refreshes mismatches for the
/// visible range whenever a reference sequence is at hand.
///
/// # Examples
///
/// ```rust
/// use covcache_core::models::{Alignment, ContigInterval, Strand, parse_cigar};
/// use covcache_coverage::{Bin, CoverageCache, InMemoryReference};
///
/// let mut cache = CoverageCache::new();
/// let read = Alignment::new(
///     "r1",
///     "chr1:2-5".parse().unwrap(),
///     Strand::Forward,
///     parse_cigar("4M").unwrap(),
///     "ACCT",
/// );
/// cache.add_item(&read.into());
/// assert_eq!(cache.max_coverage_for_ref("1"), 1);
///
/// let mut reference = InMemoryReference::new();
/// reference.insert("chr1", "AAACGTAA");
///
/// let range: ContigInterval = "chr1:0-7".parse().unwrap();
/// cache.update_mismatches(&range, &reference).unwrap();
/// assert_eq!(
///     cache.bins_for_ref("chr1")[&4],
///     Bin::annotated(1, 'G', &[('C', 1)])
/// );
/// ```
///
#[derive(Debug, Default)]
pub struct CoverageCache {
    config: CoverageConfig,
    contigs: FxHashMap<String, ContigCoverage>,
    next_request_id: u64,
}

impl CoverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoverageConfig) -> Self {
        CoverageCache {
            config,
            ..Default::default()
        }
    }

    ///
    /// Create a cache configured from a TOML file.
    ///
    /// # Arguments
    ///
    /// - path: path to a `.toml` holding a [`CoverageConfig`]
    ///
    pub fn from_config_file(path: &Path) -> CoverageResult<Self> {
        let config = CoverageConfig::try_from(path)?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    fn key<'a>(&self, contig: &'a str) -> &'a str {
        match self.config.normalize_contig_names {
            true => normalize_contig_name(contig),
            false => contig,
        }
    }

    fn state(&self, contig: &str) -> Option<&ContigCoverage> {
        self.contigs.get(self.key(contig))
    }

    fn state_mut(&mut self, contig: &str) -> &mut ContigCoverage {
        let key = self.key(contig).to_string();
        self.contigs.entry(key).or_insert_with_key(|key| {
            debug!("tracking coverage for new contig {key}");
            ContigCoverage::default()
        })
    }

    pub fn add_item(&mut self, item: &CoverageItem) {
        match item {
            CoverageItem::Alignment(alignment) => self.add_alignment(alignment),
            CoverageItem::Feature(feature) => self.add_feature(feature),
        }
    }

    pub fn add_items<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a CoverageItem>,
    {
        for item in items {
            self.add_item(item);
        }
    }

    pub fn add_alignment(&mut self, alignment: &Alignment) {
        let keep_bases = self.config.track_mismatches;
        self.state_mut(alignment.interval().contig())
            .add_alignment(alignment, keep_bases);
    }

    pub fn add_feature(&mut self, feature: &Feature) {
        self.state_mut(feature.position.contig())
            .add_feature(feature);
    }

    /// The bins of `contig`, empty if nothing ever landed there.
    pub fn bins_for_ref(&self, contig: &str) -> &BinMap {
        match self.state(contig) {
            Some(state) => state.bins(),
            None => &EMPTY_BINS,
        }
    }

    pub fn max_coverage_for_ref(&self, contig: &str) -> u32 {
        self.state(contig).map_or(0, |state| state.max_count())
    }

    pub fn bin(&self, contig: &str, position: u32) -> Option<&Bin> {
        self.bins_for_ref(contig).get(&position)
    }

    /// Bins inside `range`, ordered by position.
    pub fn bins_in_range(&self, range: &ContigInterval) -> Vec<(u32, &Bin)> {
        let bins = self.bins_for_ref(range.contig());
        let mut hits: Vec<(u32, &Bin)> = match range.length() <= bins.len() as u64 {
            true => range
                .positions()
                .filter_map(|p| bins.get(&p).map(|bin| (p, bin)))
                .collect(),
            false => bins
                .iter()
                .filter(|(p, _)| range.start() <= **p && **p <= range.stop())
                .map(|(p, bin)| (*p, bin))
                .collect(),
        };
        hits.sort_unstable_by_key(|(p, _)| *p);
        hits
    }

    /// Names of the contigs holding coverage, as keyed by the cache.
    pub fn contigs(&self) -> impl Iterator<Item = &str> + '_ {
        self.contigs.keys().map(String::as_str)
    }

    /// Whether read bases were recorded at this position.
    pub fn has_evidence(&self, contig: &str, position: u32) -> bool {
        self.state(contig)
            .and_then(|state| state.evidence_at(position))
            .is_some()
    }

    ///
    /// Issue a ticket for a mismatch update over `range`. Hand the reference,
    /// once it arrives, to [`CoverageCache::apply_reference`].
    ///
    pub fn begin_mismatch_update(&mut self, range: ContigInterval) -> MismatchRequest {
        let id = self.next_request_id;
        self.next_request_id += 1;
        MismatchRequest { id, range }
    }

    ///
    /// Apply a provider's answer to an earlier request.
    ///
    /// Either every position of the range holding evidence is re-annotated or,
    /// on error, none is. Answers may arrive in any order.
    ///
    pub fn apply_reference(
        &mut self,
        request: &MismatchRequest,
        reference: Result<String, ReferenceError>,
    ) -> CoverageResult<MismatchUpdate> {
        let key = self.key(request.range.contig());
        let Some(state) = self.contigs.get_mut(key) else {
            debug!("no coverage on {} for request {}", request.range, request.id);
            return Ok(MismatchUpdate::untouched(request));
        };

        let bases = resolve_reference(request, reference)?;
        let (positions_annotated, superseded) =
            state.apply_reference(&request.range, &bases, request.id);

        debug!(
            "request {} annotated {} positions in {}{}",
            request.id,
            positions_annotated,
            request.range,
            if superseded { " (out of order)" } else { "" }
        );

        Ok(MismatchUpdate {
            request_id: request.id,
            range: request.range.clone(),
            positions_annotated,
            superseded,
        })
    }

    ///
    /// Recompute `ref_base` and `mismatches` over `range` from the retained
    /// read bases and the reference `source` returns for it.
    ///
    /// A contig the cache has never seen is left alone without consulting
    /// `source`.
    ///
    pub fn update_mismatches<S>(
        &mut self,
        range: &ContigInterval,
        source: &S,
    ) -> CoverageResult<MismatchUpdate>
    where
        S: ReferenceSource + ?Sized,
    {
        let request = self.begin_mismatch_update(range.clone());
        if self.state(range.contig()).is_none() {
            return Ok(MismatchUpdate::untouched(&request));
        }
        let reference = source.get_range_as_string(range);
        self.apply_reference(&request, reference)
    }

    ///
    /// Drop the read bases kept for positions of `window`'s contig outside
    /// `window`. Returns how many positions were pruned.
    ///
    pub fn prune_evidence_outside(&mut self, window: &ContigInterval) -> usize {
        let key = self.key(window.contig());
        self.contigs
            .get_mut(key)
            .map_or(0, |state| state.prune_evidence_outside(window))
    }

    /// Hand the accumulated state over to a cache usable from many threads.
    pub fn into_shared(self) -> SharedCoverageCache {
        SharedCoverageCache::from_parts(self.config, self.contigs, self.next_request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoverageError;

    use covcache_core::models::{Strand, parse_cigar};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn feature(region: &str) -> CoverageItem {
        Feature::new("f", "", region.parse().unwrap(), 100.0).into()
    }

    fn read(region: &str, sequence: &str) -> CoverageItem {
        let cigar = format!("{}M", sequence.len());
        Alignment::new(
            "r",
            region.parse().unwrap(),
            Strand::Forward,
            parse_cigar(&cigar).unwrap(),
            sequence,
        )
        .into()
    }

    #[fixture]
    fn cache() -> CoverageCache {
        let mut cache = CoverageCache::new();
        cache.add_items(&[
            read("chr1:10-13", "ACGT"),
            read("chr1:12-15", "GTTT"),
            feature("chr1:14-20"),
        ]);
        cache
    }

    #[rstest]
    fn test_untouched_contig() {
        let cache = CoverageCache::new();
        assert_eq!(cache.bins_for_ref("chr9").is_empty(), true);
        assert_eq!(cache.max_coverage_for_ref("chr9"), 0);
        assert_eq!(cache.bin("chr9", 1), None);
    }

    #[rstest]
    fn test_contig_names_are_normalized(cache: CoverageCache) {
        assert_eq!(cache.bins_for_ref("1").len(), 11);
        assert_eq!(cache.max_coverage_for_ref("chr1"), 2);
        assert_eq!(cache.contigs().collect::<Vec<_>>(), vec!["1"]);
    }

    #[rstest]
    fn test_exact_contig_names() {
        let mut cache = CoverageCache::with_config(CoverageConfig {
            normalize_contig_names: false,
            ..Default::default()
        });
        cache.add_item(&feature("chr1:1-2"));
        assert_eq!(cache.bins_for_ref("chr1").len(), 2);
        assert_eq!(cache.bins_for_ref("1").is_empty(), true);
    }

    #[rstest]
    fn test_bins_in_range_is_sorted(cache: CoverageCache) {
        let range: ContigInterval = "chr1:11-14".parse().unwrap();
        let positions: Vec<u32> = cache.bins_in_range(&range).iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![11, 12, 13, 14]);

        let wide: ContigInterval = "chr1:0-1000".parse().unwrap();
        let positions: Vec<u32> = cache.bins_in_range(&wide).iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, (10..=20).collect::<Vec<u32>>());
    }

    #[rstest]
    fn test_update_mismatches_skips_feature_only_positions(mut cache: CoverageCache) {
        let range: ContigInterval = "chr1:10-20".parse().unwrap();
        let source = |r: &ContigInterval| -> Result<String, ReferenceError> {
            Ok("T".repeat(r.length() as usize))
        };
        let update = cache.update_mismatches(&range, &source).unwrap();

        assert_eq!(update.positions_annotated, 6);
        assert_eq!(cache.bin("chr1", 10), Some(&Bin::annotated(1, 'T', &[('A', 1)])));
        assert_eq!(cache.bin("chr1", 13), Some(&Bin::annotated(2, 'T', &[])));
        // one read and the feature
        assert_eq!(cache.bin("chr1", 14), Some(&Bin::annotated(2, 'T', &[])));
        assert_eq!(cache.bin("chr1", 16), Some(&Bin::new(1)));
        assert_eq!(cache.bin("chr1", 20), Some(&Bin::new(1)));
    }

    #[rstest]
    fn test_update_mismatches_on_untouched_contig_skips_source(mut cache: CoverageCache) {
        let range: ContigInterval = "chr5:1-10".parse().unwrap();
        let source = |_: &ContigInterval| -> Result<String, ReferenceError> {
            panic!("source must not be consulted")
        };
        let update = cache.update_mismatches(&range, &source).unwrap();
        assert_eq!(update.positions_annotated, 0);
        assert_eq!(cache.bins_for_ref("chr5").is_empty(), true);
    }

    #[rstest]
    fn test_failed_reference_applies_nothing(mut cache: CoverageCache) {
        let range: ContigInterval = "chr1:10-20".parse().unwrap();
        let before = cache.bins_for_ref("chr1").clone();

        let failing = |_: &ContigInterval| -> Result<String, ReferenceError> {
            Err(ReferenceError::FetchFailed("connection reset".to_string()))
        };
        let result = cache.update_mismatches(&range, &failing);
        assert!(matches!(result, Err(CoverageError::ReferenceUnavailable { .. })));
        assert_eq!(cache.bins_for_ref("chr1"), &before);

        let short = |_: &ContigInterval| -> Result<String, ReferenceError> { Ok("AC".to_string()) };
        let result = cache.update_mismatches(&range, &short);
        assert!(matches!(result, Err(CoverageError::ReferenceLengthMismatch { .. })));
        assert_eq!(cache.bins_for_ref("chr1"), &before);
    }

    #[rstest]
    fn test_request_ids_increase(mut cache: CoverageCache) {
        let range: ContigInterval = "chr1:10-11".parse().unwrap();
        let first = cache.begin_mismatch_update(range.clone());
        let second = cache.begin_mismatch_update(range);
        assert_eq!(second.id() > first.id(), true);
    }

    #[rstest]
    fn test_without_mismatch_tracking() {
        let mut cache = CoverageCache::with_config(CoverageConfig {
            track_mismatches: false,
            ..Default::default()
        });
        cache.add_item(&read("chr1:1-3", "ACG"));
        assert_eq!(cache.has_evidence("chr1", 1), false);

        let range: ContigInterval = "chr1:1-3".parse().unwrap();
        let source = |r: &ContigInterval| -> Result<String, ReferenceError> {
            Ok("T".repeat(r.length() as usize))
        };
        let update = cache.update_mismatches(&range, &source).unwrap();
        assert_eq!(update.positions_annotated, 0);
        assert_eq!(cache.bin("chr1", 1), Some(&Bin::new(1)));
    }

    #[rstest]
    fn test_prune_evidence(mut cache: CoverageCache) {
        let pruned = cache.prune_evidence_outside(&"chr1:12-13".parse().unwrap());
        assert_eq!(pruned, 4);
        assert_eq!(cache.has_evidence("chr1", 10), false);
        assert_eq!(cache.has_evidence("chr1", 12), true);
        assert_eq!(cache.prune_evidence_outside(&"chr8:1-2".parse().unwrap()), 0);
    }

    #[rstest]
    fn test_whole_contig_range(mut cache: CoverageCache) {
        let whole = ContigInterval::new("chr1", 0, u32::MAX).unwrap();
        let positions: Vec<u32> = cache.bins_in_range(&whole).iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, (10..=20).collect::<Vec<u32>>());

        let source = |_: &ContigInterval| -> Result<String, ReferenceError> { Ok("A".to_string()) };
        let result = cache.update_mismatches(&whole, &source);
        assert!(matches!(
            result,
            Err(CoverageError::ReferenceLengthMismatch {
                expected: 4294967296,
                found: 1,
                ..
            })
        ));
    }

    #[rstest]
    fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.toml");
        std::fs::write(&path, "normalize_contig_names = false\n").unwrap();

        let mut cache = CoverageCache::from_config_file(&path).unwrap();
        assert_eq!(cache.config().track_mismatches, true);
        cache.add_item(&read("chr1:1-2", "AC"));
        assert_eq!(cache.max_coverage_for_ref("1"), 0);
        assert_eq!(cache.max_coverage_for_ref("chr1"), 1);

        std::fs::write(&path, "track_mismatches = \"sometimes\"\n").unwrap();
        assert!(matches!(
            CoverageCache::from_config_file(&path),
            Err(CoverageError::Config(_))
        ));
    }
}
