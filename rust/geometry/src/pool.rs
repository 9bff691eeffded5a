// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reusable geometry buffers keyed by exact length
//!
//! A pool is private to its owner and is never shared between sessions.
//! Buffers handed out by [`BufferPool::acquire`] are either fresh
//! (default-filled) or a previously released buffer of the same length whose
//! contents are whatever the last holder left behind.

use rustc_hash::FxHashMap;
use std::mem;

/// Default number of buffers retained per length
pub const DEFAULT_MAX_POOL_SIZE: usize = 50;

/// Pool of `Vec<T>` buffers bucketed by length
#[derive(Debug)]
pub struct BufferPool<T> {
    pools: FxHashMap<usize, Vec<Vec<T>>>,
    max_pool_size: usize,
    total_allocated: usize,
}

/// Retained buffers for one length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PoolDetail {
    /// Buffer length in elements
    pub size: usize,
    /// Buffers currently retained at this length
    pub count: usize,
    /// Bytes held by the retained buffers
    pub bytes: usize,
}

/// Snapshot of pool state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PoolStats {
    pub pool_count: usize,
    pub total_buffers: usize,
    /// Bytes of fresh allocations since creation or the last clear
    pub total_allocated_bytes: usize,
    /// Per-length detail, ordered by length
    pub pools: Vec<PoolDetail>,
}

impl PoolStats {
    /// Fresh allocations in MiB
    pub fn total_allocated_mib(&self) -> f64 {
        self.total_allocated_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Bytes currently retained across all lengths
    pub fn retained_bytes(&self) -> usize {
        self.pools.iter().map(|p| p.bytes).sum()
    }
}

impl<T: Clone + Default> BufferPool<T> {
    /// Create a pool retaining at most `max_pool_size` buffers per length
    pub fn new(max_pool_size: usize) -> Self {
        Self {
            pools: FxHashMap::default(),
            max_pool_size,
            total_allocated: 0,
        }
    }

    /// Take a buffer of exactly `size` elements
    pub fn acquire(&mut self, size: usize) -> Vec<T> {
        if let Some(buffer) = self.pools.get_mut(&size).and_then(Vec::pop) {
            tracing::trace!(size, "reused pooled buffer");
            return buffer;
        }

        self.total_allocated += size * mem::size_of::<T>();
        vec![T::default(); size]
    }

    /// Return a buffer to the pool
    ///
    /// Empty buffers and buffers whose length bucket is already full are
    /// dropped.
    pub fn release(&mut self, buffer: Vec<T>) {
        let size = buffer.len();
        if size == 0 {
            return;
        }

        let bucket = self.pools.entry(size).or_default();
        if bucket.len() < self.max_pool_size {
            bucket.push(buffer);
        } else {
            tracing::trace!(size, "pool bucket full, dropping buffer");
        }
    }

    pub fn stats(&self) -> PoolStats {
        let element = mem::size_of::<T>();
        let mut pools: Vec<PoolDetail> = self
            .pools
            .iter()
            .map(|(&size, bucket)| PoolDetail {
                size,
                count: bucket.len(),
                bytes: size * bucket.len() * element,
            })
            .collect();
        pools.sort_unstable_by_key(|p| p.size);

        PoolStats {
            pool_count: pools.len(),
            total_buffers: pools.iter().map(|p| p.count).sum(),
            total_allocated_bytes: self.total_allocated,
            pools,
        }
    }

    /// Drop every retained buffer and reset the allocation counter
    pub fn clear(&mut self) {
        self.pools.clear();
        self.total_allocated = 0;
    }
}

impl<T: Clone + Default> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POOL_SIZE)
    }
}
