// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Order-sensitive integer keys addressing grid cells

use crate::error::{MeshError, Result};
use std::hash::{Hash, Hasher};
use std::ops::Index;

const HASH_MULTIPLIER: u64 = 0x100_0000_01b3;
const HASH_SEED: u64 = 0xcbf2_9ce4_8422_2325;

/// Fixed-arity integer coordinate of a grid cell.
///
/// Unlike [`Multiplet`](super::Multiplet) no canonicalization happens: the
/// cells at `(1, 2)` and `(2, 1)` are different places, so equality, ordering
/// and hashing all respect axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalKey<const DIM: usize> {
    data: [i64; DIM],
}

impl<const DIM: usize> CanonicalKey<DIM> {
    pub fn new(data: [i64; DIM]) -> Self {
        Self { data }
    }

    /// Key with every component zero
    pub fn zero() -> Self {
        Self { data: [0; DIM] }
    }

    /// Cell containing `point`: `floor(p_i / cell_size)` on every axis
    pub fn from_point(point: &[f64; DIM], cell_size: f64) -> Result<Self> {
        let mut data = [0i64; DIM];
        for (axis, (slot, &coord)) in data.iter_mut().zip(point.iter()).enumerate() {
            let scaled = (coord / cell_size).floor();
            if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
                return Err(MeshError::MalformedInput(format!(
                    "coordinate {} on axis {} cannot be bucketed with cell size {}",
                    coord, axis, cell_size
                )));
            }
            *slot = scaled as i64;
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &[i64; DIM] {
        &self.data
    }

    pub fn dim(&self) -> usize {
        DIM
    }

    /// Key shifted by `offset` on each axis
    pub fn offset(&self, offset: &[i64; DIM]) -> Self {
        let mut data = self.data;
        for (value, delta) in data.iter_mut().zip(offset.iter()) {
            *value += delta;
        }
        Self { data }
    }

    /// Deterministic, axis-order sensitive hash of the components
    pub fn hash_value(&self) -> u64 {
        let mut hash = HASH_SEED;
        for &value in &self.data {
            hash = hash
                .wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(value as u64);
        }
        finalize(hash)
    }
}

impl<const DIM: usize> Default for CanonicalKey<DIM> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const DIM: usize> Hash for CanonicalKey<DIM> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<const DIM: usize> Index<usize> for CanonicalKey<DIM> {
    type Output = i64;

    fn index(&self, axis: usize) -> &i64 {
        &self.data[axis]
    }
}

impl<const DIM: usize> From<[i64; DIM]> for CanonicalKey<DIM> {
    fn from(data: [i64; DIM]) -> Self {
        Self::new(data)
    }
}

/// 64-bit avalanche finalizer (splitmix64); a bijection, so distinct
/// pre-hashes stay distinct
pub(crate) fn finalize(mut hash: u64) -> u64 {
    hash ^= hash >> 30;
    hash = hash.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x94d0_49bb_1331_11eb);
    hash ^ (hash >> 31)
}
