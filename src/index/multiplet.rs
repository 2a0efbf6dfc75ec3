// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Order-invariant vertex tuples identifying undirected simplices

use super::canonical_key::finalize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Undirected edge
pub type Duplet = Multiplet<2>;
/// Triangle corner set
pub type Triplet = Multiplet<3>;
/// Tetrahedron corner set or quad
pub type Quadruplet = Multiplet<4>;

/// A set of 2 to 4 vertex indices with identity defined by its sorted form.
///
/// The indices are kept both as given and sorted ascending. Equality, hashing
/// and ordering only ever look at the sorted form, so `Multiplet([3, 7])` and
/// `Multiplet([7, 3])` are the same edge. Repeated indices are kept.
#[derive(Clone, Copy)]
pub struct Multiplet<const N: usize> {
    data: [usize; N],
    ori_data: [usize; N],
}

impl<const N: usize> Multiplet<N> {
    const ARITY_CHECK: () = assert!(N >= 2 && N <= 4, "multiplets hold 2, 3 or 4 indices");

    pub fn new(indices: [usize; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let _ = Self::ARITY_CHECK;
        let mut data = indices;
        data.sort_unstable();
        Self {
            data,
            ori_data: indices,
        }
    }

    /// Indices in ascending order
    pub fn data(&self) -> &[usize; N] {
        &self.data
    }

    /// Indices in the order they were supplied
    pub fn ori_data(&self) -> &[usize; N] {
        &self.ori_data
    }

    pub fn arity(&self) -> usize {
        N
    }

    pub fn contains(&self, index: usize) -> bool {
        self.data.contains(&index)
    }

    /// True for collapsed simplices such as a zero-length edge `(4, 4)`
    pub fn has_repeats(&self) -> bool {
        self.data.windows(2).any(|pair| pair[0] == pair[1])
    }

    /// Deterministic hash of the sorted indices
    pub fn hash_value(&self) -> u64 {
        let mut hash = 0x9e37_79b9_7f4a_7c15u64 ^ N as u64;
        for &value in &self.data {
            hash = finalize(hash ^ value as u64);
        }
        hash
    }
}

impl Multiplet<2> {
    pub fn pair(a: usize, b: usize) -> Self {
        Self::new([a, b])
    }
}

impl<const N: usize> From<[usize; N]> for Multiplet<N> {
    fn from(indices: [usize; N]) -> Self {
        Self::new(indices)
    }
}

impl<const N: usize> PartialEq for Multiplet<N> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<const N: usize> Eq for Multiplet<N> {}

impl<const N: usize> Hash for Multiplet<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl<const N: usize> Ord for Multiplet<N> {
    /// Co-lexicographic: the largest sorted index decides first
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.iter().rev().cmp(other.data.iter().rev())
    }
}

impl<const N: usize> PartialOrd for Multiplet<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> fmt::Debug for Multiplet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiplet{:?}", self.ori_data)
    }
}

impl<const N: usize> fmt::Display for Multiplet<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.data.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}
