#[cfg(feature = "core")]
#[doc(inline)]
pub use covcache_core as core;

#[cfg(feature = "coverage")]
#[doc(inline)]
pub use covcache_coverage as coverage;
