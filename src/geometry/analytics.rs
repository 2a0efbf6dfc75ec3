// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use crate::error::Result;
use crate::utils::math::tet_signed_volume;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume: summed voxel volumes for volume meshes, otherwise the
    /// divergence-theorem volume of the surface (0 for planar meshes)
    pub volume: f64,
    /// Total face area
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub face_count: usize,
    pub voxel_count: usize,
    pub edge_count: usize,
    /// Every edge shared by exactly two faces
    pub is_watertight: bool,
}

impl GeometryStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            face_count: 0,
            voxel_count: 0,
            edge_count: 0,
            is_watertight: false,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for GeometryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Volume:        {:>12.4}", self.volume)?;
        writeln!(f, "Surface area:  {:>12.4}", self.surface_area)?;
        writeln!(
            f,
            "Centroid:      ({:.3}, {:.3}, {:.3})",
            self.centroid[0], self.centroid[1], self.centroid[2]
        )?;
        writeln!(
            f,
            "Bounds:        ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3], self.bbox[4], self.bbox[5]
        )?;
        writeln!(
            f,
            "Elements:      {} vertices, {} edges, {} faces, {} voxels",
            self.vertex_count, self.edge_count, self.face_count, self.voxel_count
        )?;
        write!(
            f,
            "Watertight:    {}",
            if self.is_watertight { "yes" } else { "no" }
        )
    }
}

/// Analyze mesh geometry; caches `face_area` (and `voxel_volume` on volume
/// meshes) on the way
pub fn analyze(mesh: &mut Mesh) -> Result<GeometryStats> {
    if mesh.num_vertices() == 0 {
        return Ok(GeometryStats::empty());
    }

    mesh.add_attribute("face_area")?;
    let surface_area = mesh.get_attribute("face_area")?.column_sums()[0];

    let volume = if mesh.num_voxels() > 0 {
        mesh.add_attribute("voxel_volume")?;
        mesh.get_attribute("voxel_volume")?.column_sums()[0]
    } else if mesh.dim() == 3 {
        surface_volume(mesh)
    } else {
        0.0
    };

    let bounds = mesh.bounding_box();
    let topology = mesh.topology()?;

    Ok(GeometryStats {
        volume,
        surface_area,
        bbox: [
            bounds.min.x,
            bounds.min.y,
            bounds.min.z,
            bounds.max.x,
            bounds.max.y,
            bounds.max.z,
        ],
        centroid: vertex_centroid(mesh),
        vertex_count: mesh.num_vertices(),
        face_count: mesh.num_faces(),
        voxel_count: mesh.num_voxels(),
        edge_count: topology.num_edges(),
        is_watertight: topology.num_edges() > 0 && topology.is_closed(),
    })
}

/// Signed volumes of the cones from the origin over each face fan
fn surface_volume(mesh: &Mesh) -> f64 {
    let origin = Point3::origin();
    let mut volume = 0.0;
    for f in 0..mesh.num_faces() {
        let face = mesh.face(f);
        let p0 = mesh.position(face[0]);
        for k in 1..face.len() - 1 {
            let p1 = mesh.position(face[k]);
            let p2 = mesh.position(face[k + 1]);
            volume += tet_signed_volume(&origin, &p0, &p1, &p2);
        }
    }
    volume.abs()
}

fn vertex_centroid(mesh: &Mesh) -> [f64; 3] {
    let sum = (0..mesh.num_vertices()).fold(Point3::origin().coords, |acc, v| {
        acc + mesh.position(v).coords
    });
    let mean = sum / mesh.num_vertices() as f64;
    [mean.x, mean.y, mean.z]
}
