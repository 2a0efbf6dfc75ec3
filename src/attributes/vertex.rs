// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex attributes

use super::face::{corners, is_collapsed};
use super::AttributeTable;
use crate::error::{MeshError, Result};
use crate::geometry::Mesh;
use crate::utils::math::cotangent;
use nalgebra::Vector3;
use std::f64::consts::{PI, TAU};

pub(super) fn vertex_index(mesh: &Mesh) -> Result<AttributeTable> {
    Ok(AttributeTable::from_scalars(
        (0..mesh.num_vertices()).map(|v| v as f64).collect(),
    ))
}

/// Number of distinct neighbors along edges
pub(super) fn vertex_valance(mesh: &Mesh) -> Result<AttributeTable> {
    let topology = mesh.topology()?;
    Ok(AttributeTable::from_scalars(
        (0..mesh.num_vertices())
            .map(|v| topology.vertex_adjacent_vertices(v).len() as f64)
            .collect(),
    ))
}

/// Barycentric area: each face shares its area evenly among its corners
pub(super) fn vertex_area(mesh: &Mesh) -> Result<AttributeTable> {
    let face_area = mesh.get_attribute("face_area")?;
    let share = 1.0 / mesh.vertex_per_face() as f64;
    let mut areas = vec![0.0; mesh.num_vertices()];
    for f in 0..mesh.num_faces() {
        for &v in mesh.face(f) {
            areas[v] += face_area.scalar(f) * share;
        }
    }
    Ok(AttributeTable::from_scalars(areas))
}

/// Area-weighted average of incident face normals; isolated vertices get zero
pub(super) fn vertex_normal(mesh: &Mesh) -> Result<AttributeTable> {
    let face_normal = mesh.get_attribute("face_normal")?;
    let face_area = mesh.get_attribute("face_area")?;
    let mut sums = vec![Vector3::zeros(); mesh.num_vertices()];
    for f in 0..mesh.num_faces() {
        let n = face_normal.row(f);
        let weighted = Vector3::new(n[0], n[1], n[2]) * face_area.scalar(f);
        for &v in mesh.face(f) {
            sums[v] += weighted;
        }
    }

    let rows: Vec<[f64; 3]> = sums
        .iter()
        .map(|sum| {
            let n = sum.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            [n.x, n.y, n.z]
        })
        .collect();
    Ok(AttributeTable::from_rows(&rows))
}

/// Cotangent Laplacian `0.5 * sum (cot a + cot b) (x_j - x_i)` over the one-ring,
/// with `dim` columns. Rows sum to zero over the whole mesh.
pub(super) fn vertex_laplacian(mesh: &Mesh) -> Result<AttributeTable> {
    if mesh.num_faces() > 0 && mesh.vertex_per_face() != 3 {
        return Err(MeshError::NotImplemented(format!(
            "vertex_laplacian for faces with {} vertices",
            mesh.vertex_per_face()
        )));
    }

    let tolerance = mesh.config().degenerate_tolerance;
    let mut laplacian = vec![Vector3::zeros(); mesh.num_vertices()];
    for f in 0..mesh.num_faces() {
        let points = corners(mesh, f);
        if is_collapsed(&points, tolerance) {
            return Err(MeshError::DegenerateGeometry(format!(
                "face {} has no area, cotangent weights are undefined",
                f
            )));
        }
        let face = mesh.face(f);
        for corner in 0..3 {
            let a = (corner + 1) % 3;
            let b = (corner + 2) % 3;
            let weight = 0.5 * cotangent(&points[corner], &points[a], &points[b]);
            let delta = (points[b] - points[a]) * weight;
            laplacian[face[a]] += delta;
            laplacian[face[b]] -= delta;
        }
    }

    let dim = mesh.dim();
    let mut table = AttributeTable::zeros(mesh.num_vertices(), dim);
    for (v, value) in laplacian.iter().enumerate() {
        table.row_mut(v).copy_from_slice(&value.as_slice()[..dim]);
    }
    Ok(table)
}

/// `H = -(L . n) / (2 A)`, positive on convex surfaces with outward normals
pub(super) fn vertex_mean_curvature(mesh: &Mesh) -> Result<AttributeTable> {
    if mesh.dim() != 3 {
        return Err(MeshError::dimension(mesh.dim(), "3 for mean curvature"));
    }
    let laplacian = mesh.get_attribute("vertex_laplacian")?;
    let normal = mesh.get_attribute("vertex_normal")?;
    let area = mesh.get_attribute("vertex_area")?;

    let curvature = (0..mesh.num_vertices())
        .map(|v| {
            let a = area.scalar(v);
            if a <= 0.0 {
                return 0.0;
            }
            let l = laplacian.row(v);
            let n = normal.row(v);
            let dot = l[0] * n[0] + l[1] * n[1] + l[2] * n[2];
            -dot / (2.0 * a)
        })
        .collect();
    Ok(AttributeTable::from_scalars(curvature))
}

/// Angle defect over vertex area. Interior vertices measure against 2 pi,
/// boundary vertices against pi.
pub(super) fn vertex_gaussian_curvature(mesh: &Mesh) -> Result<AttributeTable> {
    let angles = mesh.get_attribute("face_corner_angle")?;
    let area = mesh.get_attribute("vertex_area")?;
    let boundary = mesh.topology()?.boundary_vertices();

    let mut angle_sums = vec![0.0; mesh.num_vertices()];
    for f in 0..mesh.num_faces() {
        for (k, &v) in mesh.face(f).iter().enumerate() {
            angle_sums[v] += angles.value(f, k);
        }
    }

    let curvature = (0..mesh.num_vertices())
        .map(|v| {
            let a = area.scalar(v);
            if a <= 0.0 {
                return 0.0;
            }
            let full = if boundary[v] { PI } else { TAU };
            (full - angle_sums[v]) / a
        })
        .collect();
    Ok(AttributeTable::from_scalars(curvature))
}

/// Sharpest dihedral angle among the edges touching each vertex
pub(super) fn vertex_dihedral_angle(mesh: &Mesh) -> Result<AttributeTable> {
    let edge_angle = mesh.get_attribute("edge_dihedral_angle")?;
    let topology = mesh.topology()?;
    let mut sharpest = vec![0.0_f64; mesh.num_vertices()];
    for (e, edge) in topology.edges().iter().enumerate() {
        let angle = edge_angle.scalar(e);
        for &v in edge.data() {
            sharpest[v] = sharpest[v].max(angle);
        }
    }
    Ok(AttributeTable::from_scalars(sharpest))
}
