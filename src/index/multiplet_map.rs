// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Multi-valued map keyed by undirected simplices

use super::Multiplet;
use crate::error::{MeshError, Result};
use ahash::AHashMap;

/// Bucket of every payload inserted under the same canonical multiplet.
///
/// The first multiplet inserted for a key is kept as the bucket's
/// representative, so the oriented form of a face seen exactly once can be
/// recovered through [`Multiplet::ori_data`].
#[derive(Debug, Clone)]
struct Bucket<const N: usize, T> {
    key: Multiplet<N>,
    values: Vec<T>,
}

/// Accumulates all payloads inserted under equal multiplets.
///
/// Feeding every face's edges in as [`Duplet`](super::Duplet)s yields, per
/// edge, the faces incident to it: one face marks a boundary edge, two an
/// interior manifold edge, three or more a non-manifold edge.
#[derive(Debug, Clone)]
pub struct MultipletMap<const N: usize, T> {
    buckets: AHashMap<Multiplet<N>, Bucket<N, T>>,
}

impl<const N: usize, T> MultipletMap<N, T> {
    pub fn new() -> Self {
        Self {
            buckets: AHashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: AHashMap::with_capacity(capacity),
        }
    }

    /// Append `value` to the bucket for `key`, creating it if absent
    pub fn insert(&mut self, key: Multiplet<N>, value: T) {
        self.buckets
            .entry(key)
            .or_insert_with(|| Bucket {
                key,
                values: Vec::new(),
            })
            .values
            .push(value);
    }

    /// Every payload stored under `key`
    pub fn get(&self, key: &Multiplet<N>) -> Result<&[T]> {
        self.try_get(key)
            .ok_or_else(|| MeshError::NotFound(format!("multiplet {}", key)))
    }

    pub fn try_get(&self, key: &Multiplet<N>) -> Option<&[T]> {
        self.buckets.get(key).map(|bucket| bucket.values.as_slice())
    }

    /// First multiplet inserted under the same canonical key
    pub fn representative(&self, key: &Multiplet<N>) -> Option<&Multiplet<N>> {
        self.buckets.get(key).map(|bucket| &bucket.key)
    }

    pub fn contains_key(&self, key: &Multiplet<N>) -> bool {
        self.buckets.contains_key(key)
    }

    /// Number of distinct canonical keys
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of payloads across all buckets
    pub fn total_values(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.values.len()).sum()
    }

    /// Buckets in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&Multiplet<N>, &[T])> + '_ {
        self.buckets
            .values()
            .map(|bucket| (&bucket.key, bucket.values.as_slice()))
    }

    /// Representatives sorted by canonical order
    pub fn sorted_keys(&self) -> Vec<Multiplet<N>> {
        let mut keys: Vec<Multiplet<N>> = self.buckets.values().map(|bucket| bucket.key).collect();
        keys.sort();
        keys
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl<const N: usize, T> Default for MultipletMap<N, T> {
    fn default() -> Self {
        Self::new()
    }
}
