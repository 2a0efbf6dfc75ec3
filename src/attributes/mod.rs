// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named per-element mesh attributes, computed on demand and cached
//!
//! Each attribute is bound to one element domain and produces a dense table
//! with one row per element. Computations are plain functions registered by
//! name together with the attributes they need first; see
//! [`AttributeRegistry`]. The cache itself ([`AttributeStore`]) lives inside
//! the owning [`Mesh`](crate::geometry::Mesh).

mod edge;
mod face;
mod registry;
mod store;
mod table;
mod vertex;
mod voxel;

pub use registry::{AttributeDefinition, AttributeRegistry, ComputeFn};
pub use store::AttributeStore;
pub use table::AttributeTable;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mesh element kind an attribute has one row per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementDomain {
    Vertex,
    Face,
    Voxel,
    Edge,
}

impl fmt::Display for ElementDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementDomain::Vertex => "vertex",
            ElementDomain::Face => "face",
            ElementDomain::Voxel => "voxel",
            ElementDomain::Edge => "edge",
        };
        f.write_str(name)
    }
}
