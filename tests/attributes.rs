// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attribute computation, caching and registry behavior

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::Vector3;
use polyframe_geoindex::attributes::{AttributeRegistry, AttributeTable, ElementDomain};
use polyframe_geoindex::geometry::{Mesh, MeshBuilder, Primitive};
use polyframe_geoindex::MeshError;
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

fn unit_cube() -> Result<Mesh> {
    Ok(Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh()?)
}

fn total_curvature(mesh: &mut Mesh) -> Result<f64> {
    mesh.add_attribute("vertex_gaussian_curvature")?;
    let curvature = mesh.get_attribute("vertex_gaussian_curvature")?;
    let area = mesh.get_attribute("vertex_area")?;
    Ok((0..mesh.num_vertices())
        .map(|v| curvature.scalar(v) * area.scalar(v))
        .sum())
}

#[test]
fn test_index_attributes_enumerate_elements() -> Result<()> {
    let mut mesh = Primitive::tet_cube(2.0).to_mesh()?;
    mesh.add_attribute("vertex_index")?;
    mesh.add_attribute("face_index")?;
    mesh.add_attribute("voxel_index")?;

    let expect = |n: usize| (0..n).map(|i| i as f64).collect::<Vec<_>>();
    assert_eq!(mesh.get_attribute("vertex_index")?.column(0), expect(8));
    assert_eq!(mesh.get_attribute("face_index")?.column(0), expect(12));
    assert_eq!(mesh.get_attribute("voxel_index")?.column(0), expect(6));
    assert_eq!(mesh.attribute_domain("voxel_index"), Some(ElementDomain::Voxel));
    Ok(())
}

#[test]
fn test_laplacian_sums_to_zero() -> Result<()> {
    for mut mesh in [
        unit_cube()?,
        Primitive::tetrahedron(1.0).to_mesh()?,
        Primitive::icosphere(3.0, 2).to_mesh()?,
    ] {
        mesh.add_attribute("vertex_laplacian")?;
        let laplacian = mesh.get_attribute("vertex_laplacian")?;
        assert_eq!(laplacian.cols(), 3);
        for sum in laplacian.column_sums() {
            assert!(sum.abs() < 1e-6, "column sum {}", sum);
        }
    }
    Ok(())
}

#[test]
fn test_planar_laplacian_vanishes_inside() -> Result<()> {
    let mut grid = Primitive::triangle_grid(4, 4, 0.5).to_mesh()?;
    grid.add_attribute("vertex_laplacian")?;
    let laplacian = grid.get_attribute("vertex_laplacian")?;
    assert_eq!(laplacian.cols(), 2);
    // Vertex (2, 2) of the 5 x 5 lattice
    let center = laplacian.row(12);
    assert!(center.iter().all(|c| c.abs() < 1e-12));

    assert!(matches!(
        grid.add_attribute("vertex_mean_curvature"),
        Err(MeshError::InvalidDimension { found: 2, .. })
    ));
    Ok(())
}

#[test]
fn test_laplacian_requires_triangles() -> Result<()> {
    let mut mesh = Primitive::quad_cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()?;
    assert!(matches!(
        mesh.add_attribute("vertex_laplacian"),
        Err(MeshError::NotImplemented(_))
    ));
    assert!(!mesh.has_attribute("vertex_laplacian"));
    Ok(())
}

#[test]
fn test_inradius_identity() -> Result<()> {
    let mut mesh = Primitive::tet_cube(1.5).to_mesh()?;
    mesh.add_attribute("voxel_inradius")?;
    let inradius = mesh.get_attribute("voxel_inradius")?;
    let volume = mesh.get_attribute("voxel_volume")?;
    let face_area = mesh.get_attribute("voxel_face_area")?;
    for c in 0..mesh.num_voxels() {
        let surface: f64 = face_area.row(c).iter().sum();
        assert_relative_eq!(inradius.scalar(c) * surface, 3.0 * volume.scalar(c), epsilon = 1e-12);
    }
    assert_relative_eq!(volume.column_sums()[0], 1.5f64.powi(3), epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_regular_tet_quality() -> Result<()> {
    let mut mesh = Primitive::tet_voxel(1.0).to_mesh()?;
    mesh.add_attribute("voxel_inradius")?;
    mesh.add_attribute("voxel_radius_edge_ratio")?;
    mesh.add_attribute("voxel_dihedral_angle")?;
    mesh.add_attribute("face_aspect_ratio")?;

    let scalar = |name: &str| -> Result<f64> { Ok(mesh.get_attribute(name)?.scalar(0)) };
    assert_relative_eq!(scalar("voxel_volume")?, 1.0 / (6.0 * 2f64.sqrt()), epsilon = 1e-12);
    assert_relative_eq!(scalar("voxel_inradius")?, 1.0 / 24f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(scalar("voxel_circumradius")?, 6f64.sqrt() / 4.0, epsilon = 1e-12);
    assert_relative_eq!(scalar("voxel_radius_edge_ratio")?, 6f64.sqrt() / 4.0, epsilon = 1e-12);
    for angle in mesh.get_attribute("voxel_dihedral_angle")?.row(0) {
        assert_relative_eq!(*angle, (1.0f64 / 3.0).acos(), epsilon = 1e-12);
    }
    let aspect = mesh.get_attribute("face_aspect_ratio")?;
    for f in 0..mesh.num_faces() {
        assert_relative_eq!(aspect.scalar(f), 1.0, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_hex_only_measures_are_not_implemented() -> Result<()> {
    let mut block = Primitive::hex_grid([1, 1, 1], 1.0).to_mesh()?;
    block.add_attribute("voxel_volume")?;
    assert!(matches!(
        block.add_attribute("voxel_inradius"),
        Err(MeshError::NotImplemented(_))
    ));
    assert!(matches!(
        block.add_attribute("voxel_radius_edge_ratio"),
        Err(MeshError::NotImplemented(_))
    ));
    assert_eq!(block.attribute_names(), vec!["voxel_volume"]);
    Ok(())
}

#[test]
fn test_gauss_bonnet() -> Result<()> {
    for mut mesh in [
        unit_cube()?,
        Primitive::quad_cube(Vector3::new(2.0, 1.0, 3.0), false).to_mesh()?,
        Primitive::tetrahedron(2.0).to_mesh()?,
        Primitive::icosphere(1.0, 2).to_mesh()?,
    ] {
        assert_relative_eq!(total_curvature(&mut mesh)?, 4.0 * PI, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_flat_grid_has_no_curvature_away_from_corners() -> Result<()> {
    let mut grid = Primitive::triangle_grid(3, 3, 1.0).to_mesh()?;
    grid.add_attribute("vertex_gaussian_curvature")?;
    let curvature = grid.get_attribute("vertex_gaussian_curvature")?;
    let corners = [0, 3, 12, 15];
    for v in 0..grid.num_vertices() {
        if !corners.contains(&v) {
            assert!(curvature.scalar(v).abs() < 1e-12, "vertex {}", v);
        }
    }
    // Total turning of a square boundary
    assert_relative_eq!(total_curvature(&mut grid)?, 2.0 * PI, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_cube_dihedral_angles() -> Result<()> {
    let mut quads = Primitive::quad_cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()?;
    quads.add_attribute("edge_dihedral_angle")?;
    let angles = quads.get_attribute("edge_dihedral_angle")?;
    assert_eq!(angles.rows(), 12);
    for e in 0..angles.rows() {
        assert_relative_eq!(angles.scalar(e), FRAC_PI_2, epsilon = 1e-12);
    }

    let mut triangles = unit_cube()?;
    triangles.add_attribute("vertex_dihedral_angle")?;
    let angles = triangles.get_attribute("edge_dihedral_angle")?;
    let flat = (0..angles.rows()).filter(|&e| angles.scalar(e) < 1e-12).count();
    let sharp = (0..angles.rows())
        .filter(|&e| (angles.scalar(e) - FRAC_PI_2).abs() < 1e-12)
        .count();
    assert_eq!((flat, sharp), (6, 12));
    for v in 0..triangles.num_vertices() {
        assert_relative_eq!(
            triangles.get_attribute("vertex_dihedral_angle")?.scalar(v),
            FRAC_PI_2,
            epsilon = 1e-12
        );
    }
    Ok(())
}

#[test]
fn test_boundary_edges_are_flat() -> Result<()> {
    let mut quad = Primitive::quad(2.0).to_mesh()?;
    quad.add_attribute("edge_dihedral_angle")?;
    quad.add_attribute("edge_length")?;
    assert_eq!(quad.get_attribute("edge_dihedral_angle")?.column(0), vec![0.0; 4]);
    assert_eq!(quad.get_attribute("edge_length")?.column(0), vec![2.0; 4]);
    Ok(())
}

#[test]
fn test_icosphere_mean_curvature() -> Result<()> {
    let radius = 2.0;
    let mut sphere = Primitive::icosphere(radius, 3).to_mesh()?;
    sphere.add_attribute("vertex_mean_curvature")?;
    let curvature = sphere.get_attribute("vertex_mean_curvature")?;

    let values = curvature.column(0);
    assert!(values.iter().all(|&h| h > 0.0));
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    assert!(
        (mean - 1.0 / radius).abs() < 0.15 / radius,
        "mean curvature {} too far from {}",
        mean,
        1.0 / radius
    );
    Ok(())
}

#[test]
fn test_vertex_normals_point_outward() -> Result<()> {
    let mut cube = unit_cube()?;
    cube.add_attribute("vertex_normal")?;
    let normals = cube.get_attribute("vertex_normal")?;
    for v in 0..cube.num_vertices() {
        let n = normals.row(v);
        let p = cube.position(v);
        assert!(n[0] * p.x + n[1] * p.y + n[2] * p.z > 0.0);
        assert_relative_eq!(Vector3::new(n[0], n[1], n[2]).norm(), 1.0, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_add_attribute_is_idempotent() -> Result<()> {
    let mut mesh = unit_cube()?;
    mesh.add_attribute("vertex_area")?;
    let first = mesh.get_attribute("vertex_area")?.clone();
    mesh.add_attribute("vertex_area")?;
    assert_eq!(mesh.get_attribute("vertex_area")?, &first);
    assert_eq!(mesh.attribute_names(), vec!["face_area", "vertex_area"]);
    assert_relative_eq!(first.column_sums()[0], 6.0, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_missing_attributes_are_not_found() -> Result<()> {
    let mut mesh = unit_cube()?;
    assert!(matches!(mesh.get_attribute("face_area"), Err(MeshError::NotFound(_))));
    assert!(matches!(mesh.add_attribute("face_volume"), Err(MeshError::NotFound(_))));
    assert!(mesh.attribute_names().is_empty());
    Ok(())
}

#[test]
fn test_voxel_attributes_need_three_dimensions() -> Result<()> {
    let mut quad = Primitive::quad(1.0).to_mesh()?;
    assert!(matches!(
        quad.add_attribute("voxel_volume"),
        Err(MeshError::InvalidDimension { found: 2, .. })
    ));
    Ok(())
}

#[test]
fn test_degenerate_face_reports_error() -> Result<()> {
    let mut sliver = MeshBuilder::new(3)
        .vertices(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0])
        .faces(vec![0, 1, 2], 3)
        .build()?;
    assert!(matches!(
        sliver.add_attribute("vertex_normal"),
        Err(MeshError::DegenerateGeometry(_))
    ));
    assert!(sliver.attribute_names().is_empty());
    Ok(())
}

fn ones(mesh: &Mesh) -> polyframe_geoindex::Result<AttributeTable> {
    Ok(AttributeTable::from_scalars(vec![1.0; mesh.num_vertices()]))
}

fn failing(_mesh: &Mesh) -> polyframe_geoindex::Result<AttributeTable> {
    Err(MeshError::DegenerateGeometry("always fails".to_string()))
}

fn too_short(_mesh: &Mesh) -> polyframe_geoindex::Result<AttributeTable> {
    Ok(AttributeTable::from_scalars(vec![1.0]))
}

fn custom_mesh(registry: AttributeRegistry) -> Result<Mesh> {
    Ok(MeshBuilder::new(3)
        .vertices(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .faces(vec![0, 1, 2], 3)
        .registry(Arc::new(registry))
        .build()?)
}

#[test]
fn test_failed_chain_leaves_cache_untouched() -> Result<()> {
    let mut registry = AttributeRegistry::builtin();
    registry
        .register("weight", ElementDomain::Vertex, &[], ones)
        .register("broken", ElementDomain::Vertex, &["weight"], failing)
        .register("short", ElementDomain::Vertex, &["weight"], too_short);
    let mut mesh = custom_mesh(registry)?;

    assert!(matches!(
        mesh.add_attribute("broken"),
        Err(MeshError::DegenerateGeometry(_))
    ));
    assert!(!mesh.has_attribute("weight"));

    assert!(matches!(mesh.add_attribute("short"), Err(MeshError::MalformedInput(_))));
    assert!(mesh.attribute_names().is_empty());

    mesh.add_attribute("weight")?;
    assert!(matches!(
        mesh.add_attribute("broken"),
        Err(MeshError::DegenerateGeometry(_))
    ));
    assert!(mesh.has_attribute("weight"));
    Ok(())
}

#[test]
fn test_cyclic_prerequisites_are_rejected() -> Result<()> {
    let mut registry = AttributeRegistry::new();
    registry
        .register("left", ElementDomain::Vertex, &["right"], ones)
        .register("right", ElementDomain::Vertex, &["left"], ones);
    let mut mesh = custom_mesh(registry)?;
    assert!(matches!(
        mesh.add_attribute("left"),
        Err(MeshError::CyclicDependency(_))
    ));
    assert!(mesh.attribute_names().is_empty());
    Ok(())
}

#[test]
fn test_edge_attribute_rows_follow_edge_list() -> Result<()> {
    let mut mesh = Primitive::tetrahedron(1.0).to_mesh()?;
    mesh.add_attribute("edge_length")?;
    let lengths = mesh.get_attribute("edge_length")?;
    assert_eq!(lengths.rows(), mesh.connectivity().unwrap().num_edges());
    for e in 0..lengths.rows() {
        assert_relative_eq!(lengths.scalar(e), 1.0, epsilon = 1e-12);
    }

    let json = serde_json::to_string(lengths)?;
    let back: AttributeTable = serde_json::from_str(&json)?;
    assert_eq!(&back, lengths);

    let edges = mesh.connectivity().unwrap().num_edges();
    mesh.set_attribute("edge_weight", ElementDomain::Edge, AttributeTable::zeros(edges, 2))?;
    assert_eq!(mesh.get_attribute("edge_weight")?.cols(), 2);
    Ok(())
}
