// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric indexing - canonical keys, multiplets and spatial hashing

mod canonical_key;
mod hash_grid;
mod multiplet;
mod multiplet_map;

pub use canonical_key::CanonicalKey;
pub use hash_grid::{GridIndex, HashGrid, ItemId};
pub use multiplet::{Duplet, Multiplet, Quadruplet, Triplet};
pub use multiplet_map::MultipletMap;
