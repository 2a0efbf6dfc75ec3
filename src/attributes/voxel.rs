// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Voxel attributes for tetrahedral and hexahedral meshes
//!
//! Every voxel attribute needs a 3D mesh. Measures that only have a closed
//! form for tetrahedra report `NotImplemented` on hexahedral meshes.

use super::face::vector_area;
use super::AttributeTable;
use crate::error::{MeshError, Result};
use crate::geometry::{Mesh, HEX_EDGES, HEX_FACES, TET_EDGES, TET_FACES};
use crate::utils::math::{tet_circumcenter, tet_signed_volume};
use nalgebra::Point3;

/// Hexahedron split into six tetrahedra around the 0-6 diagonal
const HEX_TETS: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
    [0, 5, 1, 6],
];

fn require_volume(mesh: &Mesh) -> Result<()> {
    if mesh.dim() != 3 {
        return Err(MeshError::dimension(mesh.dim(), "3 for voxel attributes"));
    }
    Ok(())
}

fn require_tets(mesh: &Mesh, attribute: &str) -> Result<()> {
    require_volume(mesh)?;
    if mesh.num_voxels() > 0 && mesh.vertex_per_voxel() != 4 {
        return Err(MeshError::NotImplemented(format!(
            "{} for voxels with {} vertices",
            attribute,
            mesh.vertex_per_voxel()
        )));
    }
    Ok(())
}

fn corners(mesh: &Mesh, voxel: usize) -> Vec<Point3<f64>> {
    mesh.voxel(voxel).iter().map(|&v| mesh.position(v)).collect()
}

fn local_edges(mesh: &Mesh) -> &'static [[usize; 2]] {
    if mesh.vertex_per_voxel() == 4 {
        &TET_EDGES[..]
    } else {
        &HEX_EDGES[..]
    }
}

fn edge_lengths(mesh: &Mesh, points: &[Point3<f64>]) -> Vec<f64> {
    local_edges(mesh)
        .iter()
        .map(|[a, b]| (points[*b] - points[*a]).norm())
        .collect()
}

fn volume_of(points: &[Point3<f64>]) -> f64 {
    if points.len() == 4 {
        tet_signed_volume(&points[0], &points[1], &points[2], &points[3]).abs()
    } else {
        HEX_TETS
            .iter()
            .map(|t| tet_signed_volume(&points[t[0]], &points[t[1]], &points[t[2]], &points[t[3]]))
            .sum::<f64>()
            .abs()
    }
}

/// Tetrahedron whose squared volume is negligible against the sixth power of
/// its longest edge
fn tet(mesh: &Mesh, voxel: usize) -> Result<Vec<Point3<f64>>> {
    let points = corners(mesh, voxel);
    let longest = edge_lengths(mesh, &points).into_iter().fold(0.0, f64::max);
    let volume = volume_of(&points);
    if volume * volume <= mesh.config().degenerate_tolerance * longest.powi(6) {
        return Err(MeshError::DegenerateGeometry(format!("voxel {} has no volume", voxel)));
    }
    Ok(points)
}

pub(super) fn voxel_index(mesh: &Mesh) -> Result<AttributeTable> {
    require_volume(mesh)?;
    Ok(AttributeTable::from_scalars(
        (0..mesh.num_voxels()).map(|c| c as f64).collect(),
    ))
}

pub(super) fn voxel_volume(mesh: &Mesh) -> Result<AttributeTable> {
    require_volume(mesh)?;
    let volumes = (0..mesh.num_voxels())
        .map(|c| volume_of(&corners(mesh, c)))
        .collect();
    Ok(AttributeTable::from_scalars(volumes))
}

pub(super) fn voxel_centroid(mesh: &Mesh) -> Result<AttributeTable> {
    require_volume(mesh)?;
    let rows: Vec<[f64; 3]> = (0..mesh.num_voxels())
        .map(|c| {
            let points = corners(mesh, c);
            let sum = points.iter().fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
            let mean = sum / points.len() as f64;
            [mean.x, mean.y, mean.z]
        })
        .collect();
    Ok(AttributeTable::from_rows(&rows))
}

/// Area of each local face: 4 columns for tetrahedra, 6 for hexahedra
pub(super) fn voxel_face_area(mesh: &Mesh) -> Result<AttributeTable> {
    require_volume(mesh)?;
    let per_voxel = if mesh.vertex_per_voxel() == 4 { 4 } else { 6 };
    let mut table = AttributeTable::zeros(mesh.num_voxels(), per_voxel);
    for c in 0..mesh.num_voxels() {
        let points = corners(mesh, c);
        let row = table.row_mut(c);
        if points.len() == 4 {
            for (slot, face) in row.iter_mut().zip(&TET_FACES) {
                let face_points: Vec<_> = face.iter().map(|&k| points[k]).collect();
                *slot = vector_area(&face_points).norm() * 0.5;
            }
        } else {
            for (slot, face) in row.iter_mut().zip(&HEX_FACES) {
                let face_points: Vec<_> = face.iter().map(|&k| points[k]).collect();
                *slot = vector_area(&face_points).norm() * 0.5;
            }
        }
    }
    Ok(table)
}

/// `r = 3 V / sum(face areas)`
pub(super) fn voxel_inradius(mesh: &Mesh) -> Result<AttributeTable> {
    require_tets(mesh, "voxel_inradius")?;
    let volume = mesh.get_attribute("voxel_volume")?;
    let face_area = mesh.get_attribute("voxel_face_area")?;
    let mut radii = Vec::with_capacity(mesh.num_voxels());
    for c in 0..mesh.num_voxels() {
        tet(mesh, c)?;
        let surface: f64 = face_area.row(c).iter().sum();
        radii.push(3.0 * volume.scalar(c) / surface);
    }
    Ok(AttributeTable::from_scalars(radii))
}

pub(super) fn voxel_circumcenter(mesh: &Mesh) -> Result<AttributeTable> {
    require_tets(mesh, "voxel_circumcenter")?;
    let mut rows = Vec::with_capacity(mesh.num_voxels());
    for c in 0..mesh.num_voxels() {
        let p = tet(mesh, c)?;
        let center = tet_circumcenter(&p[0], &p[1], &p[2], &p[3])
            .ok_or_else(|| MeshError::DegenerateGeometry(format!("voxel {} is flat", c)))?;
        rows.push([center.x, center.y, center.z]);
    }
    Ok(AttributeTable::from_rows(&rows))
}

pub(super) fn voxel_circumradius(mesh: &Mesh) -> Result<AttributeTable> {
    let centers = mesh.get_attribute("voxel_circumcenter")?;
    let radii = (0..mesh.num_voxels())
        .map(|c| {
            let center = centers.row(c);
            let corner = mesh.position(mesh.voxel(c)[0]);
            (Point3::new(center[0], center[1], center[2]) - corner).norm()
        })
        .collect();
    Ok(AttributeTable::from_scalars(radii))
}

/// Interior dihedral angle at each of the six tetrahedron edges, in
/// [`TET_EDGES`] order
pub(super) fn voxel_dihedral_angle(mesh: &Mesh) -> Result<AttributeTable> {
    require_tets(mesh, "voxel_dihedral_angle")?;
    let mut table = AttributeTable::zeros(mesh.num_voxels(), TET_EDGES.len());
    for c in 0..mesh.num_voxels() {
        let p = tet(mesh, c)?;
        let row = table.row_mut(c);
        for (slot, &[i, j]) in row.iter_mut().zip(&TET_EDGES) {
            let (k, l) = opposite(i, j);
            let axis = (p[j] - p[i]).normalize();
            // Project the two wing vertices onto the plane normal to the edge
            let wing = |m: usize| {
                let d = p[m] - p[i];
                d - axis * d.dot(&axis)
            };
            *slot = wing(k).angle(&wing(l));
        }
    }
    Ok(table)
}

fn opposite(i: usize, j: usize) -> (usize, usize) {
    let mut rest = (0..4).filter(|&m| m != i && m != j);
    let k = rest.next().unwrap_or(0);
    let l = rest.next().unwrap_or(0);
    (k, l)
}

/// Longest over shortest edge
pub(super) fn voxel_edge_ratio(mesh: &Mesh) -> Result<AttributeTable> {
    require_volume(mesh)?;
    let mut ratios = Vec::with_capacity(mesh.num_voxels());
    for c in 0..mesh.num_voxels() {
        let lengths = edge_lengths(mesh, &corners(mesh, c));
        let shortest = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        let longest = lengths.iter().copied().fold(0.0, f64::max);
        if shortest <= 0.0 {
            return Err(MeshError::DegenerateGeometry(format!(
                "voxel {} has a zero-length edge",
                c
            )));
        }
        ratios.push(longest / shortest);
    }
    Ok(AttributeTable::from_scalars(ratios))
}

/// Circumradius over shortest edge; sqrt(6)/4 for a regular tetrahedron
pub(super) fn voxel_radius_edge_ratio(mesh: &Mesh) -> Result<AttributeTable> {
    let radius = mesh.get_attribute("voxel_circumradius")?;
    let mut ratios = Vec::with_capacity(mesh.num_voxels());
    for c in 0..mesh.num_voxels() {
        let shortest = edge_lengths(mesh, &corners(mesh, c))
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        if shortest <= 0.0 {
            return Err(MeshError::DegenerateGeometry(format!(
                "voxel {} has a zero-length edge",
                c
            )));
        }
        ratios.push(radius.scalar(c) / shortest);
    }
    Ok(AttributeTable::from_scalars(ratios))
}
