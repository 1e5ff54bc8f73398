//! Reusable backing storage for solver tables.
//!
//! Each category of buffer lives on its own [`Shelf`]. A checkout hands out a
//! cleared buffer wrapped in [`Pooled`], which puts it back on the shelf when
//! dropped, so buffers return on every exit path including cancellation.
//! Nothing here is correctness-bearing: a disabled pool, an empty shelf or a
//! poisoned lock all fall back to a fresh allocation.

use dispatch_structs::{config::PoolConfig, core::Order};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Mutex,
};

/// Link in a path-reconstruction chain. `prev` is the arena index of the
/// previous link, or [`NIL`] at the end of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    pub item: usize,
    pub prev: usize,
}

pub const NIL: usize = usize::MAX;

pub struct Shelf<T> {
    free: Mutex<Vec<Vec<T>>>,
    max_retained: usize,
    max_buffer_len: usize,
    initial_capacity: usize,
}

impl<T> Shelf<T> {
    fn new(max_retained: usize, max_buffer_len: usize, initial_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained,
            max_buffer_len,
            initial_capacity,
        }
    }

    pub fn checkout(&self) -> Pooled<'_, T> {
        let recycled = if self.max_retained == 0 {
            None
        } else {
            self.free.lock().ok().and_then(|mut free| free.pop())
        };
        let mut buf = recycled.unwrap_or_else(|| Vec::with_capacity(self.initial_capacity));
        buf.clear();
        Pooled {
            buf,
            home: Some(self),
        }
    }

    fn give_back(&self, mut buf: Vec<T>) {
        if self.max_retained == 0 || buf.capacity() > self.max_buffer_len {
            return;
        }
        buf.clear();
        if let Ok(mut free) = self.free.lock() {
            if free.len() < self.max_retained {
                free.push(buf);
            }
        }
    }

    pub fn retained(&self) -> usize {
        self.free.lock().map(|free| free.len()).unwrap_or(0)
    }
}

/// A checked-out buffer. Derefs to `Vec<T>`.
pub struct Pooled<'p, T> {
    buf: Vec<T>,
    home: Option<&'p Shelf<T>>,
}

impl<T> Pooled<'static, T> {
    /// A buffer that belongs to no shelf and is simply freed on drop.
    pub fn detached(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            home: None,
        }
    }
}

impl<'p, T> Pooled<'p, T> {
    /// Takes the buffer out of the pool for good.
    pub fn into_inner(mut self) -> Vec<T> {
        self.home = None;
        std::mem::take(&mut self.buf)
    }
}

impl<'p, T> Deref for Pooled<'p, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buf
    }
}

impl<'p, T> DerefMut for Pooled<'p, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buf
    }
}

impl<'p, T> Drop for Pooled<'p, T> {
    fn drop(&mut self) {
        if let Some(home) = self.home.take() {
            home.give_back(std::mem::take(&mut self.buf));
        }
    }
}

impl<'p, T: fmt::Debug> fmt::Debug for Pooled<'p, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.buf.iter()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub values: usize,
    pub indices: usize,
    pub nodes: usize,
    pub orders: usize,
}

/// Category-keyed buffer pool shared by every planning call of a `Planner`.
/// `Sync`, so it can sit behind an `Arc` and serve concurrent calls.
pub struct ArenaPool {
    values: Shelf<u64>,
    indices: Shelf<usize>,
    nodes: Shelf<PathNode>,
    orders: Shelf<Order>,
}

impl ArenaPool {
    pub fn new(config: &PoolConfig) -> Self {
        let retained = if config.enabled {
            config.max_retained
        } else {
            0
        };
        let max_len = config.max_buffer_len;
        Self {
            values: Shelf::new(retained, max_len, config.table_capacity),
            indices: Shelf::new(retained, max_len, config.table_capacity),
            nodes: Shelf::new(retained, max_len, config.node_capacity),
            orders: Shelf::new(retained, max_len, config.order_capacity),
        }
    }

    /// A pool that never retains anything.
    pub fn disabled() -> Self {
        Self::new(&PoolConfig {
            enabled: false,
            ..PoolConfig::default()
        })
    }

    pub fn values(&self) -> Pooled<'_, u64> {
        self.values.checkout()
    }

    pub fn indices(&self) -> Pooled<'_, usize> {
        self.indices.checkout()
    }

    pub fn nodes(&self) -> Pooled<'_, PathNode> {
        self.nodes.checkout()
    }

    pub fn orders(&self) -> Pooled<'_, Order> {
        self.orders.checkout()
    }

    /// A value table of `len` cells, all set to `fill`.
    pub fn value_table(&self, len: usize, fill: u64) -> Pooled<'_, u64> {
        let mut table = self.values();
        table.resize(len, fill);
        table
    }

    /// An index table of `len` cells, all set to `fill`.
    pub fn index_table(&self, len: usize, fill: usize) -> Pooled<'_, usize> {
        let mut table = self.indices();
        table.resize(len, fill);
        table
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            values: self.values.retained(),
            indices: self.indices.retained(),
            nodes: self.nodes.retained(),
            orders: self.orders.retained(),
        }
    }
}

impl Default for ArenaPool {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl fmt::Debug for ArenaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaPool")
            .field("retained", &self.stats())
            .finish()
    }
}

/// Row-major bit matrix backed by a pooled value table. Used for the
/// parent tables of the core-set and FPTAS tiers.
pub struct BitTable<'p> {
    words: Pooled<'p, u64>,
    words_per_row: usize,
}

impl<'p> BitTable<'p> {
    pub fn new(pool: &'p ArenaPool, rows: usize, cols: usize) -> Self {
        let words_per_row = cols.div_ceil(64);
        Self {
            words: pool.value_table(rows * words_per_row, 0),
            words_per_row,
        }
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize) {
        self.words[row * self.words_per_row + col / 64] |= 1u64 << (col % 64);
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.words[row * self.words_per_row + col / 64] & (1u64 << (col % 64)) != 0
    }
}
