//! Memoization of region operations
use crate::Region;
use std::{
    collections::{hash_map::DefaultHasher, HashMap},
    hash::{Hash, Hasher},
};

/// Operation stored in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionOp {
    Union,
    Intersection,
    Subtracting,
    SymmetricDifference,
}

impl RegionOp {
    pub fn apply(self, left: &Region, right: &Region) -> Region {
        match self {
            RegionOp::Union => left.union(right),
            RegionOp::Intersection => left.intersection(right),
            RegionOp::Subtracting => left.subtracting(right),
            RegionOp::SymmetricDifference => left.symmetric_difference(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    op: RegionOp,
    left: u64,
    right: u64,
}

#[derive(Debug)]
struct CacheEntry {
    left: Region,
    right: Region,
    result: Region,
    used: u64,
}

/// Least recently used cache of region operation results
///
/// Operands are identified by the structural hash of their control points, and
/// compared on lookup so hash collisions never produce wrong results.
#[derive(Debug)]
pub struct RegionCache {
    capacity: usize,
    entries: HashMap<CacheKey, CacheEntry>,
    clock: u64,
    hits: usize,
    misses: usize,
}

impl RegionCache {
    /// Create cache which holds at most `capacity` results
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn union(&mut self, left: &Region, right: &Region) -> Region {
        self.get_or_compute(RegionOp::Union, left, right)
    }

    pub fn intersection(&mut self, left: &Region, right: &Region) -> Region {
        self.get_or_compute(RegionOp::Intersection, left, right)
    }

    pub fn subtracting(&mut self, left: &Region, right: &Region) -> Region {
        self.get_or_compute(RegionOp::Subtracting, left, right)
    }

    pub fn symmetric_difference(&mut self, left: &Region, right: &Region) -> Region {
        self.get_or_compute(RegionOp::SymmetricDifference, left, right)
    }

    /// Return cached result of the operation, or compute and store it
    pub fn get_or_compute(&mut self, op: RegionOp, left: &Region, right: &Region) -> Region {
        self.clock += 1;
        let key = CacheKey {
            op,
            left: structural_hash(left),
            right: structural_hash(right),
        };
        if let Some(entry) = self.entries.get_mut(&key) {
            if &entry.left == left && &entry.right == right {
                entry.used = self.clock;
                self.hits += 1;
                tracing::trace!("[cache:hit] {:?}", op);
                return entry.result.clone();
            }
        }
        self.misses += 1;
        let result = op.apply(left, right);
        if self.capacity == 0 {
            return result;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict();
        }
        self.entries.insert(
            key,
            CacheEntry {
                left: left.clone(),
                right: right.clone(),
                result: result.clone(),
                used: self.clock,
            },
        );
        result
    }

    /// Number of stored results
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove all stored results, statistics are preserved
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Remove least recently used entry
    fn evict(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.used)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            tracing::trace!("[cache:evict] {:?}", key.op);
            self.entries.remove(&key);
        }
    }
}

impl Default for RegionCache {
    fn default() -> Self {
        Self::new(256)
    }
}

fn structural_hash(region: &Region) -> u64 {
    let mut hasher = DefaultHasher::new();
    region.hash(&mut hasher);
    hasher.finish()
}
