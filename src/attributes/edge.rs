// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge attributes, one row per edge in [`Connectivity::edges`] order
//!
//! [`Connectivity::edges`]: crate::geometry::Connectivity::edges

use super::AttributeTable;
use crate::error::{MeshError, Result};
use crate::geometry::Mesh;
use nalgebra::Vector3;

pub(super) fn edge_length(mesh: &Mesh) -> Result<AttributeTable> {
    let lengths = mesh
        .topology()?
        .edges()
        .iter()
        .map(|edge| {
            let [a, b] = *edge.data();
            (mesh.position(b) - mesh.position(a)).norm()
        })
        .collect();
    Ok(AttributeTable::from_scalars(lengths))
}

/// Angle between the normals of the two faces sharing each edge: 0 where the
/// surface is flat, pi/2 along a cube edge. Boundary edges report 0.
pub(super) fn edge_dihedral_angle(mesh: &Mesh) -> Result<AttributeTable> {
    let normals = mesh.get_attribute("face_normal")?;
    let topology = mesh.topology()?;
    let normal = |f: usize| {
        let n = normals.row(f);
        Vector3::new(n[0], n[1], n[2])
    };

    let mut angles = Vec::with_capacity(topology.num_edges());
    let mut boundary = 0;
    for (e, edge) in topology.edges().iter().enumerate() {
        match topology.edge_adjacent_faces(e) {
            [f0, f1] => {
                let cos = normal(*f0).dot(&normal(*f1)).clamp(-1.0, 1.0);
                angles.push(cos.acos());
            }
            [_] => {
                boundary += 1;
                angles.push(0.0);
            }
            owners => {
                let [v0, v1] = *edge.data();
                return Err(MeshError::NonManifoldEdge {
                    v0,
                    v1,
                    faces: owners.len(),
                });
            }
        }
    }
    if boundary > 0 {
        log::debug!("{} boundary edges have no dihedral angle", boundary);
    }
    Ok(AttributeTable::from_scalars(angles))
}
