use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use fxhash::FxHashMap;
use log::debug;

use covcache_core::models::{Alignment, ContigInterval, CoverageItem, Feature};
use covcache_core::utils::normalize_contig_name;

use crate::bins::BinMap;
use crate::config::CoverageConfig;
use crate::contig::ContigCoverage;
use crate::errors::{CoverageResult, ReferenceError};
use crate::mismatch::{MismatchRequest, MismatchUpdate, resolve_reference};
use crate::reference::{AsyncReferenceSource, ReferenceSource};

type ContigHandle = Arc<Mutex<ContigCoverage>>;

fn lock(handle: &ContigHandle) -> MutexGuard<'_, ContigCoverage> {
    // a panic mid-update leaves counts that are still valid numbers
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

///
/// A coverage cache that can be fed and queried from several threads.
///
/// Each contig's state sits behind its own lock, so reads on chr1 and chr2 are
/// added concurrently; the contig table itself is only write-locked when a new
/// contig shows up. Readers get owned snapshots.
///
#[derive(Debug, Default)]
pub struct SharedCoverageCache {
    config: CoverageConfig,
    contigs: RwLock<FxHashMap<String, ContigHandle>>,
    next_request_id: AtomicU64,
}

impl SharedCoverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoverageConfig) -> Self {
        SharedCoverageCache {
            config,
            ..Default::default()
        }
    }

    pub(crate) fn from_parts(
        config: CoverageConfig,
        contigs: FxHashMap<String, ContigCoverage>,
        next_request_id: u64,
    ) -> Self {
        let contigs = contigs
            .into_iter()
            .map(|(name, state)| (name, Arc::new(Mutex::new(state))))
            .collect();
        SharedCoverageCache {
            config,
            contigs: RwLock::new(contigs),
            next_request_id: AtomicU64::new(next_request_id),
        }
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

    fn handle(&self, contig: &str) -> Option<ContigHandle> {
        let contigs = self.contigs.read().unwrap_or_else(PoisonError::into_inner);
        contigs.get(self.key(contig)).cloned()
    }

    fn handle_or_insert(&self, contig: &str) -> ContigHandle {
        if let Some(handle) = self.handle(contig) {
            return handle;
        }
        let mut contigs = self.contigs.write().unwrap_or_else(PoisonError::into_inner);
        contigs
            .entry(self.key(contig).to_string())
            .or_insert_with_key(|key| {
                debug!("tracking coverage for new contig {key}");
                ContigHandle::default()
            })
            .clone()
    }

    pub fn add_item(&self, item: &CoverageItem) {
        match item {
            CoverageItem::Alignment(alignment) => self.add_alignment(alignment),
            CoverageItem::Feature(feature) => self.add_feature(feature),
        }
    }

    pub fn add_items<'a, I>(&self, items: I)
    where
        I: IntoIterator<Item = &'a CoverageItem>,
    {
        for item in items {
            self.add_item(item);
        }
    }

    pub fn add_alignment(&self, alignment: &Alignment) {
        let handle = self.handle_or_insert(alignment.interval().contig());
        lock(&handle).add_alignment(alignment, self.config.track_mismatches);
    }

    pub fn add_feature(&self, feature: &Feature) {
        let handle = self.handle_or_insert(feature.position.contig());
        lock(&handle).add_feature(feature);
    }

    /// A copy of the bins of `contig`, empty if nothing ever landed there.
    pub fn bins_for_ref(&self, contig: &str) -> BinMap {
        self.handle(contig)
            .map(|handle| lock(&handle).bins().clone())
            .unwrap_or_default()
    }

    pub fn max_coverage_for_ref(&self, contig: &str) -> u32 {
        self.handle(contig)
            .map_or(0, |handle| lock(&handle).max_count())
    }

    pub fn contigs(&self) -> Vec<String> {
        let contigs = self.contigs.read().unwrap_or_else(PoisonError::into_inner);
        contigs.keys().cloned().collect()
    }

    pub fn begin_mismatch_update(&self, range: ContigInterval) -> MismatchRequest {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        MismatchRequest { id, range }
    }

    /// See [`crate::CoverageCache::apply_reference`].
    pub fn apply_reference(
        &self,
        request: &MismatchRequest,
        reference: Result<String, ReferenceError>,
    ) -> CoverageResult<MismatchUpdate> {
        let Some(handle) = self.handle(request.range.contig()) else {
            debug!("no coverage on {} for request {}", request.range, request.id);
            return Ok(MismatchUpdate::untouched(request));
        };

        let bases = resolve_reference(request, reference)?;
        let (positions_annotated, superseded) =
            lock(&handle).apply_reference(&request.range, &bases, request.id);

        Ok(MismatchUpdate {
            request_id: request.id,
            range: request.range.clone(),
            positions_annotated,
            superseded,
        })
    }

    pub fn update_mismatches<S>(
        &self,
        range: &ContigInterval,
        source: &S,
    ) -> CoverageResult<MismatchUpdate>
    where
        S: ReferenceSource + ?Sized,
    {
        let request = self.begin_mismatch_update(range.clone());
        if self.handle(range.contig()).is_none() {
            return Ok(MismatchUpdate::untouched(&request));
        }
        let reference = source.get_range_as_string(range);
        self.apply_reference(&request, reference)
    }

    ///
    /// Like [`SharedCoverageCache::update_mismatches`], but waits for the
    /// reference without holding any lock, so reads keep flowing in meanwhile.
    /// Several of these may be in flight at once; each applies when its
    /// reference arrives.
    ///
    pub async fn update_mismatches_async<S>(
        &self,
        range: &ContigInterval,
        source: &S,
    ) -> CoverageResult<MismatchUpdate>
    where
        S: AsyncReferenceSource,
    {
        let request = self.begin_mismatch_update(range.clone());
        if self.handle(range.contig()).is_none() {
            return Ok(MismatchUpdate::untouched(&request));
        }
        let reference = source.fetch_range(range.clone()).await;
        self.apply_reference(&request, reference)
    }

    pub fn prune_evidence_outside(&self, window: &ContigInterval) -> usize {
        self.handle(window.contig())
            .map_or(0, |handle| lock(&handle).prune_evidence_outside(window))
    }
}
