//! Process-wide metadata caches.
//!
//! Two caches back the binding path:
//! - [`FieldCache`]: per-record-type field names, aliases and shapes
//! - [`ConversionCache`]: feasibility of (source kind, target shape) pairs
//!
//! Both are populated lazily, keyed by type or shape identity, and never
//! invalidated: the facts they hold are static for the life of the
//! process. Concurrent first use may compute an entry twice; only one copy
//! is ever stored and every reader sees that copy.
//!
//! Tools share [`Caches::global`] unless built with their own handle.

mod conversion;
mod field;

pub use conversion::ConversionCache;
pub use field::{FieldCache, FieldDescriptor};

use crate::config::EngineConfig;
use crate::stats::EngineStats;
use std::sync::{Arc, OnceLock};

static GLOBAL_CACHES: OnceLock<Arc<Caches>> = OnceLock::new();

/// The shared cache set handed to every coercion.
#[derive(Debug, Default)]
pub struct Caches {
    fields: FieldCache,
    conversions: ConversionCache,
}

impl Caches {
    /// Fresh, empty caches with the feasibility memo enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh caches configured from an engine config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            fields: FieldCache::default(),
            conversions: ConversionCache::new(config.conversion_cache),
        }
    }

    /// The process-wide cache set, configured by [`EngineConfig::process`].
    pub fn global() -> Arc<Caches> {
        GLOBAL_CACHES
            .get_or_init(|| Arc::new(Caches::from_config(EngineConfig::process())))
            .clone()
    }

    pub fn fields(&self) -> &FieldCache {
        &self.fields
    }

    pub fn conversions(&self) -> &ConversionCache {
        &self.conversions
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            field_cache: self.fields.counters().snapshot(),
            conversion_cache: self.conversions.counters().snapshot(),
            cached_records: self.fields.len(),
            cached_conversions: self.conversions.len(),
        }
    }
}
