// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face attributes

use super::AttributeTable;
use crate::error::{MeshError, Result};
use crate::geometry::Mesh;
use crate::utils::math::{corner_angle, triangle_circumcenter, triangle_cross};
use nalgebra::{Point3, Vector3};

pub(super) fn corners(mesh: &Mesh, face: usize) -> Vec<Point3<f64>> {
    mesh.face(face).iter().map(|&v| mesh.position(v)).collect()
}

/// Fan-summed vector area; its norm is twice the face area for planar faces
pub(super) fn vector_area(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut sum = Vector3::zeros();
    for k in 1..points.len().saturating_sub(1) {
        sum += triangle_cross(&points[0], &points[k], &points[k + 1]);
    }
    sum
}

fn longest_edge_squared(points: &[Point3<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|k| (points[(k + 1) % n] - points[k]).norm_squared())
        .fold(0.0, f64::max)
}

/// Collapsed when the squared doubled area is negligible against the fourth
/// power of the longest edge
pub(super) fn is_collapsed(points: &[Point3<f64>], tolerance: f64) -> bool {
    let scale = longest_edge_squared(points);
    vector_area(points).norm_squared() <= tolerance * scale * scale
}

fn require_triangles(mesh: &Mesh, attribute: &str) -> Result<()> {
    if mesh.vertex_per_face() != 3 {
        return Err(MeshError::NotImplemented(format!(
            "{} for faces with {} vertices",
            attribute,
            mesh.vertex_per_face()
        )));
    }
    Ok(())
}

fn triangle(mesh: &Mesh, face: usize) -> Result<[Point3<f64>; 3]> {
    let points = corners(mesh, face);
    if is_collapsed(&points, mesh.config().degenerate_tolerance) {
        return Err(MeshError::DegenerateGeometry(format!("face {} has no area", face)));
    }
    Ok([points[0], points[1], points[2]])
}

fn truncate(point: &Point3<f64>, dim: usize) -> &[f64] {
    &point.coords.as_slice()[..dim]
}

pub(super) fn face_index(mesh: &Mesh) -> Result<AttributeTable> {
    Ok(AttributeTable::from_scalars(
        (0..mesh.num_faces()).map(|f| f as f64).collect(),
    ))
}

pub(super) fn face_area(mesh: &Mesh) -> Result<AttributeTable> {
    let areas = (0..mesh.num_faces())
        .map(|f| vector_area(&corners(mesh, f)).norm() * 0.5)
        .collect();
    Ok(AttributeTable::from_scalars(areas))
}

/// Unit normals, always three columns (planar meshes point along +z or -z)
pub(super) fn face_normal(mesh: &Mesh) -> Result<AttributeTable> {
    let tolerance = mesh.config().degenerate_tolerance;
    let mut normals = Vec::with_capacity(mesh.num_faces());
    for f in 0..mesh.num_faces() {
        let points = corners(mesh, f);
        if is_collapsed(&points, tolerance) {
            return Err(MeshError::DegenerateGeometry(format!(
                "face {} has no well-defined normal",
                f
            )));
        }
        let n = vector_area(&points).normalize();
        normals.push([n.x, n.y, n.z]);
    }
    Ok(AttributeTable::from_rows(&normals))
}

pub(super) fn face_centroid(mesh: &Mesh) -> Result<AttributeTable> {
    let dim = mesh.dim();
    let mut table = AttributeTable::zeros(mesh.num_faces(), dim);
    for f in 0..mesh.num_faces() {
        let face = mesh.face(f);
        let row = table.row_mut(f);
        for &v in face {
            for (acc, c) in row.iter_mut().zip(mesh.vertex(v)) {
                *acc += c;
            }
        }
        for acc in row.iter_mut() {
            *acc /= face.len() as f64;
        }
    }
    Ok(table)
}

/// Interior angle at every corner, one column per face vertex
pub(super) fn face_corner_angle(mesh: &Mesh) -> Result<AttributeTable> {
    let per_face = mesh.vertex_per_face();
    let mut table = AttributeTable::zeros(mesh.num_faces(), per_face);
    for f in 0..mesh.num_faces() {
        let points = corners(mesh, f);
        let row = table.row_mut(f);
        for k in 0..per_face {
            let prev = &points[(k + per_face - 1) % per_face];
            let next = &points[(k + 1) % per_face];
            row[k] = corner_angle(&points[k], next, prev);
        }
    }
    Ok(table)
}

pub(super) fn face_circumcenter(mesh: &Mesh) -> Result<AttributeTable> {
    require_triangles(mesh, "face_circumcenter")?;
    let dim = mesh.dim();
    let mut table = AttributeTable::zeros(mesh.num_faces(), dim);
    for f in 0..mesh.num_faces() {
        let [p0, p1, p2] = triangle(mesh, f)?;
        let center = triangle_circumcenter(&p0, &p1, &p2)
            .ok_or_else(|| MeshError::DegenerateGeometry(format!("face {} is collinear", f)))?;
        table.row_mut(f).copy_from_slice(truncate(&center, dim));
    }
    Ok(table)
}

pub(super) fn face_circumradius(mesh: &Mesh) -> Result<AttributeTable> {
    require_triangles(mesh, "face_circumradius")?;
    let mut radii = Vec::with_capacity(mesh.num_faces());
    for f in 0..mesh.num_faces() {
        let [p0, p1, p2] = triangle(mesh, f)?;
        let a = (p2 - p1).norm();
        let b = (p0 - p2).norm();
        let c = (p1 - p0).norm();
        let area = triangle_cross(&p0, &p1, &p2).norm() * 0.5;
        radii.push(a * b * c / (4.0 * area));
    }
    Ok(AttributeTable::from_scalars(radii))
}

pub(super) fn face_incircle_center(mesh: &Mesh) -> Result<AttributeTable> {
    require_triangles(mesh, "face_incircle_center")?;
    let dim = mesh.dim();
    let mut table = AttributeTable::zeros(mesh.num_faces(), dim);
    for f in 0..mesh.num_faces() {
        let [p0, p1, p2] = triangle(mesh, f)?;
        // Each corner weighted by the length of the opposite side
        let a = (p2 - p1).norm();
        let b = (p0 - p2).norm();
        let c = (p1 - p0).norm();
        let center = Point3::from((p0.coords * a + p1.coords * b + p2.coords * c) / (a + b + c));
        table.row_mut(f).copy_from_slice(truncate(&center, dim));
    }
    Ok(table)
}

pub(super) fn face_incircle_radius(mesh: &Mesh) -> Result<AttributeTable> {
    require_triangles(mesh, "face_incircle_radius")?;
    let mut radii = Vec::with_capacity(mesh.num_faces());
    for f in 0..mesh.num_faces() {
        let [p0, p1, p2] = triangle(mesh, f)?;
        let perimeter = (p1 - p0).norm() + (p2 - p1).norm() + (p0 - p2).norm();
        radii.push(triangle_cross(&p0, &p1, &p2).norm() / perimeter);
    }
    Ok(AttributeTable::from_scalars(radii))
}

/// Circumradius over twice the inradius; 1 for an equilateral triangle
pub(super) fn face_aspect_ratio(mesh: &Mesh) -> Result<AttributeTable> {
    let outer = mesh.get_attribute("face_circumradius")?;
    let inner = mesh.get_attribute("face_incircle_radius")?;
    let ratios = (0..mesh.num_faces())
        .map(|f| outer.scalar(f) / (2.0 * inner.scalar(f)))
        .collect();
    Ok(AttributeTable::from_scalars(ratios))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshBuilder;
    use approx::assert_relative_eq;

    fn right_triangle() -> Mesh {
        MeshBuilder::new(2)
            .vertices(vec![0.0, 0.0, 3.0, 0.0, 0.0, 4.0])
            .faces(vec![0, 1, 2], 3)
            .build()
            .unwrap()
    }

    #[test]
    fn test_right_triangle_measures() {
        let mesh = right_triangle();
        assert_relative_eq!(face_area(&mesh).unwrap().scalar(0), 6.0);
        assert_relative_eq!(face_circumradius(&mesh).unwrap().scalar(0), 2.5, epsilon = 1e-12);
        assert_relative_eq!(face_incircle_radius(&mesh).unwrap().scalar(0), 1.0, epsilon = 1e-12);

        let center = face_circumcenter(&mesh).unwrap();
        assert_eq!(center.cols(), 2);
        assert_relative_eq!(center.value(0, 0), 1.5, epsilon = 1e-12);
        assert_relative_eq!(center.value(0, 1), 2.0, epsilon = 1e-12);

        let incenter = face_incircle_center(&mesh).unwrap();
        assert_relative_eq!(incenter.value(0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(incenter.value(0, 1), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_angles_sum_to_pi() {
        let mesh = right_triangle();
        let angles = face_corner_angle(&mesh).unwrap();
        let sum: f64 = angles.row(0).iter().sum();
        assert_relative_eq!(sum, std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(angles.value(0, 0), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_planar_normal_points_up() {
        let normals = face_normal(&right_triangle()).unwrap();
        assert_eq!(normals.row(0), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_collinear_face_is_degenerate() {
        let mesh = MeshBuilder::new(2)
            .vertices(vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0])
            .faces(vec![0, 1, 2], 3)
            .build()
            .unwrap();
        assert!(matches!(face_normal(&mesh), Err(MeshError::DegenerateGeometry(_))));
        assert!(matches!(face_circumcenter(&mesh), Err(MeshError::DegenerateGeometry(_))));
        assert_eq!(face_area(&mesh).unwrap().scalar(0), 0.0);
    }

    #[test]
    fn test_quad_only_measures() {
        let mesh = MeshBuilder::new(2)
            .vertices(vec![0.0, 0.0, 2.0, 0.0, 2.0, 1.0, 0.0, 1.0])
            .faces(vec![0, 1, 2, 3], 4)
            .build()
            .unwrap();
        assert_relative_eq!(face_area(&mesh).unwrap().scalar(0), 2.0);
        assert_eq!(face_centroid(&mesh).unwrap().row(0), &[1.0, 0.5]);
        assert!(matches!(face_circumradius(&mesh), Err(MeshError::NotImplemented(_))));
    }
}
