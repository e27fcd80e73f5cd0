//! Field Descriptor Cache.

use crate::record::Record;
use crate::shape::Shape;
use crate::stats::CacheCounters;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// Binding metadata for one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Zero-based declaration position.
    pub index: usize,
    /// Field name as declared.
    pub name: &'static str,
    /// Serialization alias; equals `name` when none was declared.
    pub alias: &'static str,
    pub shape: Shape,
    /// Whether input may set this field.
    pub public: bool,
}

impl FieldDescriptor {
    pub fn has_alias(&self) -> bool {
        self.alias != self.name
    }
}

/// Per-record-type descriptor lists, computed on first use.
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: DashMap<TypeId, Arc<[FieldDescriptor]>>,
    counters: CacheCounters,
}

impl FieldCache {
    /// Descriptors for `R`, computing and storing them on first request.
    pub fn descriptors<R: Record>(&self) -> Arc<[FieldDescriptor]> {
        let key = TypeId::of::<R>();
        if let Some(entry) = self.entries.get(&key) {
            self.counters.hit();
            return entry.value().clone();
        }

        self.counters.miss();
        let computed: Arc<[FieldDescriptor]> = describe::<R>().into();
        // A racing thread may have stored first; keep whichever landed.
        let stored = self.entries.entry(key).or_insert(computed).value().clone();
        debug!(
            record = R::record_name(),
            fields = stored.len(),
            "cached record field descriptors"
        );
        stored
    }

    pub fn contains<R: Record>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    /// Number of record types cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn counters(&self) -> &CacheCounters {
        &self.counters
    }
}

fn describe<R: Record>() -> Vec<FieldDescriptor> {
    R::field_specs()
        .into_iter()
        .enumerate()
        .map(|(index, spec)| FieldDescriptor {
            index,
            name: spec.name,
            alias: spec.alias.unwrap_or(spec.name),
            shape: spec.shape,
            public: spec.public,
        })
        .collect()
}
