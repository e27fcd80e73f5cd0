//! Conversion Cache: memoized feasibility of coercions.

use crate::coercion;
use crate::error::{BindError, BindResult};
use crate::shape::Shape;
use crate::stats::CacheCounters;
use crate::value::ValueKind;
use dashmap::DashMap;

/// Memo of whether a (source kind, target shape) pair is covered by the
/// coercion rules.
///
/// Feasibility is a fast reject only. A feasible pair still runs its rule
/// every time, and that rule may still fail (unparsable text, overflow).
#[derive(Debug)]
pub struct ConversionCache {
    entries: DashMap<(ValueKind, Shape), bool>,
    enabled: bool,
    counters: CacheCounters,
}

impl Default for ConversionCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConversionCache {
    /// With `enabled == false` every query evaluates the rule table directly.
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
            counters: CacheCounters::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether values of `kind` can in principle be coerced to `target`.
    pub fn is_feasible(&self, kind: ValueKind, target: &Shape) -> bool {
        if !self.enabled {
            return coercion::feasible(kind, target);
        }

        let key = (kind, target.clone());
        if let Some(entry) = self.entries.get(&key) {
            self.counters.hit();
            return *entry;
        }

        self.counters.miss();
        let feasible = coercion::feasible(kind, target);
        *self.entries.entry(key).or_insert(feasible)
    }

    /// [`is_feasible`](Self::is_feasible) as a bind result.
    pub fn check(&self, kind: ValueKind, target: &Shape) -> BindResult<()> {
        if self.is_feasible(kind, target) {
            Ok(())
        } else {
            Err(BindError::unsupported(kind, target.clone()))
        }
    }

    /// Number of memoized pairs.
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
