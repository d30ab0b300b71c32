//! Chained hash table with duplicate-key entries
//!
//! Buckets are [`NodeList`] chains. Keys are hashed with FNV-1a, folded to a
//! signed 32-bit hash code and compressed into the bucket range. Inserting
//! never overwrites: entries with equal keys coexist, and `find`/`remove`
//! pick whichever matching entry the chain yields first. Callers must not
//! depend on which one that is.
//!
//! # Growth
//! When the load factor exceeds [`MAX_LOAD_FACTOR`] immediately before an
//! insert, the bucket array doubles and every entry is moved into the new
//! array in a single pass before the new entry is placed. Growth bumps the
//! table epoch, which invalidates previously returned [`EntryHandle`]s.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::mem;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::data_structures::list::{ListHandle, NodeList};

/// Load factor above which the next insert doubles the bucket count
pub const MAX_LOAD_FACTOR: f64 = 0.6;

/// Size estimate used by [`ChainedHashMap::new`]
pub const DEFAULT_SIZE_ESTIMATE: usize = 75;

const COMPRESSION_OFFSET: u64 = 761;
const COMPRESSION_MODULUS: u64 = 2_147_483_647;

/// FNV-1a hasher used for bucket selection
pub(crate) struct FnvHasher {
    state: u64,
}

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

impl Default for FnvHasher {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Deterministic 64-bit FNV-1a digest of `value`
pub(crate) fn fnv_hash<Q: Hash + ?Sized>(value: &Q) -> u64 {
    let mut hasher = FnvHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Signed 32-bit hash code of `key`
pub fn hash_code<Q: Hash + ?Sized>(key: &Q) -> i32 {
    let digest = fnv_hash(key);
    ((digest >> 32) ^ digest) as u32 as i32
}

/// Key/value pair stored in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Reference to an inserted entry, valid until the next growth or clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHandle {
    epoch: u64,
    bucket: usize,
    node: ListHandle,
}

/// Bucket occupancy report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketHistogram {
    pub entries: usize,
    pub buckets: usize,
    pub load_factor: f64,
    /// `collision_counts[i]` is the number of non-empty buckets holding `i + 1` entries
    pub collision_counts: Vec<usize>,
    pub max_collisions: usize,
    pub total_collisions: usize,
    /// Collisions expected from a uniformly random hash function
    pub expected_collisions: f64,
}

/// Hash table with separate chaining
#[derive(Debug, Clone)]
pub struct ChainedHashMap<K, V> {
    buckets: Vec<Option<NodeList<Entry<K, V>>>>,
    entries: usize,
    epoch: u64,
}

impl<K: Hash + Eq, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> ChainedHashMap<K, V> {
    /// Creates a table sized for [`DEFAULT_SIZE_ESTIMATE`] entries
    pub fn new() -> Self {
        Self::with_size_estimate(DEFAULT_SIZE_ESTIMATE)
    }

    /// Creates a table intended to hold roughly `size_estimate` entries
    pub fn with_size_estimate(size_estimate: usize) -> Self {
        let bucket_count = size_estimate.saturating_mul(2).max(1);
        Self {
            buckets: empty_buckets(bucket_count),
            entries: 0,
            epoch: 0,
        }
    }

    /// Number of entries, counting same-key entries separately
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.entries as f64 / self.buckets.len() as f64
    }

    /// Maps a hash code of any sign into `[0, bucket_count)`
    pub fn compress(&self, code: i32) -> usize {
        let magnitude = u64::from(code.unsigned_abs());
        (((magnitude + COMPRESSION_OFFSET) % COMPRESSION_MODULUS) % self.buckets.len() as u64)
            as usize
    }

    /// Adds a new entry; existing entries with an equal key are left alone
    pub fn insert(&mut self, key: K, value: V) -> EntryHandle {
        if self.load_factor() > MAX_LOAD_FACTOR {
            self.grow();
        }

        let bucket = self.compress(hash_code(&key));
        let chain = self.buckets[bucket].get_or_insert_with(NodeList::new);
        let node = chain.insert_front(Entry { key, value });
        self.entries += 1;

        EntryHandle {
            epoch: self.epoch,
            bucket,
            node,
        }
    }

    /// Some entry whose key equals `key`
    pub fn find<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let chain = self.chain(key)?;
        chain
            .iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.key.borrow() == key)
    }

    /// Mutable access to some entry whose key equals `key`
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.compress(hash_code(key));
        let chain = self.buckets[bucket].as_mut()?;
        let node = locate(chain, key)?;
        chain.get_mut(node).ok()
    }

    /// Removes and returns some entry whose key equals `key`
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.compress(hash_code(key));
        let chain = self.buckets[bucket].as_mut()?;
        let node = locate(chain, key)?;

        match chain.remove(node) {
            Ok(entry) => {
                self.entries -= 1;
                Some(entry)
            }
            Err(err) => {
                error!("ChainedHashMap::remove: {err}");
                None
            }
        }
    }

    /// Resolves a handle returned by [`insert`](Self::insert)
    ///
    /// Returns `None` once the table has grown or been cleared since the
    /// handle was issued, or after the entry was removed.
    pub fn entry(&self, handle: EntryHandle) -> Option<&Entry<K, V>> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.buckets
            .get(handle.bucket)?
            .as_ref()?
            .get(handle.node)
            .ok()
    }

    /// Removes all entries, keeping the current bucket count
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.buckets.len());
        self.entries = 0;
        self.epoch += 1;
    }

    /// All entries in bucket order
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.buckets
            .iter()
            .flatten()
            .flat_map(|chain| chain.iter().map(|(_, entry)| entry))
    }

    /// Bucket occupancy and collision statistics
    pub fn histogram(&self) -> BucketHistogram {
        let mut collision_counts = Vec::new();
        let mut max_collisions = 0;
        let mut total_collisions = 0;

        for chain in self.buckets.iter().flatten().filter(|chain| !chain.is_empty()) {
            let collisions = chain.len() - 1;
            if collision_counts.len() <= collisions {
                collision_counts.resize(collisions + 1, 0);
            }
            collision_counts[collisions] += 1;
            max_collisions = max_collisions.max(collisions);
            total_collisions += collisions;
        }

        let n = self.entries as f64;
        let b = self.buckets.len() as f64;
        let expected_collisions = n - b + b * (1.0 - 1.0 / b).powf(n);

        BucketHistogram {
            entries: self.entries,
            buckets: self.buckets.len(),
            load_factor: self.load_factor(),
            collision_counts,
            max_collisions,
            total_collisions,
            expected_collisions,
        }
    }

    fn chain<Q>(&self, key: &Q) -> Option<&NodeList<Entry<K, V>>>
    where
        Q: Hash + ?Sized,
    {
        self.buckets[self.compress(hash_code(key))].as_ref()
    }

    /// Doubles the bucket array and moves every entry across
    fn grow(&mut self) {
        let new_count = self.buckets.len() * 2;
        let old = mem::replace(&mut self.buckets, empty_buckets(new_count));
        self.epoch += 1;

        for chain in old.into_iter().flatten() {
            for entry in chain {
                let bucket = self.compress(hash_code(&entry.key));
                self.buckets[bucket]
                    .get_or_insert_with(NodeList::new)
                    .insert_front(entry);
            }
        }

        debug!(
            "ChainedHashMap grew to {} buckets ({} entries)",
            new_count, self.entries
        );
    }
}

fn empty_buckets<K, V>(count: usize) -> Vec<Option<NodeList<Entry<K, V>>>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, || None);
    buckets
}

fn locate<K, V, Q>(chain: &NodeList<Entry<K, V>>, key: &Q) -> Option<ListHandle>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    chain
        .iter()
        .find(|(_, entry)| entry.key.borrow() == key)
        .map(|(node, _)| node)
}
