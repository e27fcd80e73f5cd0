//! Argument Buffer Pool.
//!
//! Each tool owns one pool of fixed-length slot arrays. `execute` takes a
//! buffer for the length of one call and the guard puts it back, cleared,
//! on every exit path including unwinding.

use crate::context::ToolContext;
use crate::stats::{PoolCounters, PoolStats};
use crate::value::Value;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};
use tracing::{trace, warn};

/// One argument slot.
#[derive(Debug, Clone, Default)]
pub enum Arg {
    #[default]
    Empty,
    Context(ToolContext),
    Bound(Value),
}

/// Argument slots for one invocation, one per declared parameter.
#[derive(Debug, Default)]
pub struct ArgumentBuffer {
    slots: Vec<Arg>,
}

impl ArgumentBuffer {
    pub fn new(len: usize) -> Self {
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, Arg::default);
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Arg> {
        self.slots.get(index)
    }

    /// Store a value. Out-of-range indices are ignored.
    pub fn bind(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Arg::Bound(value);
        }
    }

    pub fn bind_context(&mut self, index: usize, context: ToolContext) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Arg::Context(context);
        }
    }

    /// Move a bound value out, leaving the slot empty. Anything else reads
    /// as `Null`.
    pub fn take_value(&mut self, index: usize) -> Value {
        match self.slots.get_mut(index).map(std::mem::take) {
            Some(Arg::Bound(value)) => value,
            _ => Value::Null,
        }
    }

    /// Move the context out, leaving the slot empty. A slot without one
    /// yields a fresh, never-cancelled context.
    pub fn take_context(&mut self, index: usize) -> ToolContext {
        match self.slots.get_mut(index).map(std::mem::take) {
            Some(Arg::Context(context)) => context,
            _ => ToolContext::default(),
        }
    }

    /// Empty every slot, dropping whatever was held.
    pub fn clear(&mut self) {
        self.slots.fill_with(Arg::default);
    }

    pub fn is_clear(&self) -> bool {
        self.slots.iter().all(|slot| matches!(slot, Arg::Empty))
    }
}

/// Idle buffers of one fixed length.
#[derive(Debug)]
pub struct ArgumentPool {
    buffer_len: usize,
    max_idle: usize,
    idle: Mutex<Vec<ArgumentBuffer>>,
    counters: PoolCounters,
}

impl ArgumentPool {
    /// A pool of `buffer_len`-slot buffers keeping at most `max_idle` idle,
    /// with `prewarm` of them allocated now.
    pub fn new(buffer_len: usize, max_idle: usize, prewarm: usize) -> Self {
        let prewarm = prewarm.min(max_idle);
        let idle = (0..prewarm).map(|_| ArgumentBuffer::new(buffer_len)).collect();
        Self {
            buffer_len,
            max_idle,
            idle: Mutex::new(idle),
            counters: PoolCounters::default(),
        }
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Take an idle buffer or allocate one.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let reused = self.lock_idle().pop();
        let buffer = match reused {
            Some(buffer) => {
                self.counters.reused();
                buffer
            }
            None => {
                self.counters.allocated();
                trace!(slots = self.buffer_len, "allocated argument buffer");
                ArgumentBuffer::new(self.buffer_len)
            }
        };

        PooledBuffer { buffer, pool: self }
    }

    fn release(&self, mut buffer: ArgumentBuffer) {
        buffer.clear();
        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(buffer);
        } else {
            drop(idle);
            self.counters.dropped();
            warn!(
                max_idle = self.max_idle,
                "argument pool at capacity, dropping returned buffer"
            );
        }
    }

    pub fn idle(&self) -> usize {
        self.lock_idle().len()
    }

    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.idle())
    }

    // A panic while the lock is held cannot leave the Vec half-updated, so a
    // poisoned lock is still usable.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<ArgumentBuffer>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A buffer on loan from an [`ArgumentPool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buffer: ArgumentBuffer,
    pool: &'a ArgumentPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = ArgumentBuffer;

    fn deref(&self) -> &ArgumentBuffer {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut ArgumentBuffer {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool.release(buffer);
    }
}
