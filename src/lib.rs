// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe geometry indexing core
//!
//! Canonical integer keys, order-insensitive index tuples and a uniform
//! spatial hash grid, plus the mesh connectivity and named-attribute layer
//! built on top of them.

pub mod attributes;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod utils;

pub use attributes::{AttributeRegistry, AttributeTable, ElementDomain};
pub use config::GeometryConfig;
pub use error::{MeshError, Result};
pub use geometry::{Connectivity, Mesh, MeshBuilder, Primitive};
pub use index::{
    CanonicalKey, Duplet, GridIndex, HashGrid, Multiplet, MultipletMap, Quadruplet, Triplet,
};

/// Compute several attributes in order, stopping at the first failure
pub fn compute_attributes(mesh: &mut Mesh, names: &[&str]) -> Result<()> {
    for name in names {
        mesh.add_attribute(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_basic_cube() {
        let mut mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false)
            .to_mesh()
            .unwrap();
        compute_attributes(&mut mesh, &["face_area", "vertex_normal"]).unwrap();
        assert_eq!(mesh.attribute_names(), vec!["face_area", "face_normal", "vertex_normal"]);
    }
}
