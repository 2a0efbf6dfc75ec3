// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, adjacency and proximity helpers

mod analytics;
mod bbox;
mod connectivity;
mod mesh;
mod primitives;
mod proximity;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use connectivity::{
    extract_boundary_faces, Connectivity, HEX_EDGES, HEX_FACES, TET_EDGES, TET_FACES,
};
pub use mesh::{Mesh, MeshBuilder};
pub use primitives::Primitive;
pub use proximity::{map_indices, weld_mesh, weld_vertices, PointLocator};
