// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed primitive meshes with shared vertices and outward winding

use super::connectivity::HEX_FACES;
use super::{Mesh, MeshBuilder};
use crate::error::Result;
use crate::index::Duplet;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// 8 vertices, 12 triangles
    Cube { size: Vector3<f64>, center: bool },
    /// 8 vertices, 6 quads
    QuadCube { size: Vector3<f64>, center: bool },
    /// Regular tetrahedron surface, centered on the origin
    Tetrahedron { edge: f64 },
    /// Regular tetrahedron as a single voxel
    TetVoxel { edge: f64 },
    /// Cube split into six tetrahedra around its main diagonal
    TetCube { size: f64 },
    /// Block of `cells` hexahedra with unit spacing times `size`
    HexGrid { cells: [usize; 3], size: f64 },
    /// Planar `nx` by `ny` grid of triangles
    TriangleGrid { nx: usize, ny: usize, spacing: f64 },
    /// Planar square as a single quad
    Quad { size: f64 },
    /// Subdivided icosahedron projected onto a sphere
    Icosphere { radius: f64, subdivisions: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn quad_cube(size: Vector3<f64>, center: bool) -> Self {
        Self::QuadCube { size, center }
    }

    pub fn tetrahedron(edge: f64) -> Self {
        Self::Tetrahedron { edge }
    }

    pub fn tet_voxel(edge: f64) -> Self {
        Self::TetVoxel { edge }
    }

    pub fn tet_cube(size: f64) -> Self {
        Self::TetCube { size }
    }

    pub fn hex_grid(cells: [usize; 3], size: f64) -> Self {
        Self::HexGrid { cells, size }
    }

    pub fn triangle_grid(nx: usize, ny: usize, spacing: f64) -> Self {
        Self::TriangleGrid { nx, ny, spacing }
    }

    pub fn quad(size: f64) -> Self {
        Self::Quad { size }
    }

    pub fn icosphere(radius: f64, subdivisions: u32) -> Self {
        Self::Icosphere { radius, subdivisions }
    }

    pub fn to_mesh(&self) -> Result<Mesh> {
        match self {
            Self::Cube { size, center } => {
                let quads = hex_faces(&[0, 1, 2, 3, 4, 5, 6, 7]);
                MeshBuilder::new(3)
                    .vertices(box_corners(*size, *center))
                    .faces(split_quads(&quads), 3)
                    .build()
            }
            Self::QuadCube { size, center } => MeshBuilder::new(3)
                .vertices(box_corners(*size, *center))
                .faces(hex_faces(&[0, 1, 2, 3, 4, 5, 6, 7]), 4)
                .build(),
            Self::Tetrahedron { edge } => MeshBuilder::new(3)
                .vertices(regular_tet(*edge))
                .faces(vec![1, 2, 3, 0, 3, 2, 0, 1, 3, 0, 2, 1], 3)
                .build(),
            Self::TetVoxel { edge } => Mesh::from_voxels(regular_tet(*edge), vec![0, 1, 2, 3], 4),
            Self::TetCube { size } => Mesh::from_voxels(
                box_corners(Vector3::repeat(*size), false),
                vec![
                    0, 1, 2, 6, //
                    0, 2, 3, 6, //
                    0, 3, 7, 6, //
                    0, 7, 4, 6, //
                    0, 4, 5, 6, //
                    0, 5, 1, 6,
                ],
                4,
            ),
            Self::HexGrid { cells, size } => generate_hex_grid(*cells, *size),
            Self::TriangleGrid { nx, ny, spacing } => generate_triangle_grid(*nx, *ny, *spacing),
            Self::Quad { size } => MeshBuilder::new(2)
                .vertices(vec![0.0, 0.0, *size, 0.0, *size, *size, 0.0, *size])
                .faces(vec![0, 1, 2, 3], 4)
                .build(),
            Self::Icosphere { radius, subdivisions } => generate_icosphere(*radius, *subdivisions),
        }
    }
}

/// Box corners: bottom face 0-3 counter-clockwise seen from above, top 4-7
fn box_corners(size: Vector3<f64>, center: bool) -> Vec<f64> {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;
    let mut coords = Vec::with_capacity(24);
    for z in [min.z, max.z] {
        for (x, y) in [(min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y)] {
            coords.extend_from_slice(&[x, y, z]);
        }
    }
    coords
}

fn hex_faces(hex: &[usize; 8]) -> Vec<usize> {
    HEX_FACES
        .iter()
        .flat_map(|face| face.iter().map(|&k| hex[k]))
        .collect()
}

fn split_quads(quads: &[usize]) -> Vec<usize> {
    quads
        .chunks_exact(4)
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect()
}

/// Regular tetrahedron with positive orientation
fn regular_tet(edge: f64) -> Vec<f64> {
    let s = edge / (2.0 * 2f64.sqrt());
    [
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ]
    .iter()
    .flat_map(|p| p.iter().map(|c| c * s))
    .collect()
}

fn generate_hex_grid(cells: [usize; 3], size: f64) -> Result<Mesh> {
    let [nx, ny, nz] = cells;
    let index = |i: usize, j: usize, k: usize| (k * (ny + 1) + j) * (nx + 1) + i;

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1) * 3);
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.extend_from_slice(&[i as f64 * size, j as f64 * size, k as f64 * size]);
            }
        }
    }

    let mut voxels = Vec::with_capacity(nx * ny * nz * 8);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                voxels.extend_from_slice(&[
                    index(i, j, k),
                    index(i + 1, j, k),
                    index(i + 1, j + 1, k),
                    index(i, j + 1, k),
                    index(i, j, k + 1),
                    index(i + 1, j, k + 1),
                    index(i + 1, j + 1, k + 1),
                    index(i, j + 1, k + 1),
                ]);
            }
        }
    }
    Mesh::from_voxels(vertices, voxels, 8)
}

fn generate_triangle_grid(nx: usize, ny: usize, spacing: f64) -> Result<Mesh> {
    let index = |i: usize, j: usize| j * (nx + 1) + i;

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * 2);
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.extend_from_slice(&[i as f64 * spacing, j as f64 * spacing]);
        }
    }

    let mut faces = Vec::with_capacity(nx * ny * 6);
    for j in 0..ny {
        for i in 0..nx {
            let (a, b, c, d) = (index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
            faces.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    Mesh::from_triangles(2, vertices, faces)
}

fn generate_icosphere(radius: f64, subdivisions: u32) -> Result<Mesh> {
    let phi = (1.0 + 5f64.sqrt()) / 2.0;
    let mut points: Vec<Point3<f64>> = [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(|[x, y, z]| Point3::from(Vector3::new(*x, *y, *z).normalize() * radius))
    .collect();

    let mut triangles: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        // Each edge is split once no matter which side reaches it first
        let mut midpoints: AHashMap<Duplet, usize> =
            AHashMap::with_capacity(triangles.len() * 3 / 2);
        let mut midpoint = |a: usize, b: usize, points: &mut Vec<Point3<f64>>| {
            *midpoints.entry(Duplet::pair(a, b)).or_insert_with(|| {
                let mid = nalgebra::center(&points[a], &points[b]);
                points.push(Point3::from(mid.coords.normalize() * radius));
                points.len() - 1
            })
        };

        let mut refined = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let ab = midpoint(a, b, &mut points);
            let bc = midpoint(b, c, &mut points);
            let ca = midpoint(c, a, &mut points);
            refined.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        triangles = refined;
    }

    let vertices: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
    let faces: Vec<usize> = triangles.into_iter().flatten().collect();
    log::trace!("Icosphere with {} triangles", faces.len() / 3);
    Mesh::from_triangles(3, vertices, faces)
}
