// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh adjacency derived from raw face and voxel index arrays
//!
//! Shared sub-elements are found by keying them as multiplets: every face
//! contributes its edges as [`Duplet`]s and every voxel its faces as
//! [`Triplet`](crate::index::Triplet)s or [`Quadruplet`](crate::index::Quadruplet)s.
//! The payload lists gathered per key are the incidence relations; no
//! half-edge structure is needed.

use crate::error::{MeshError, Result};
use crate::index::{Duplet, Multiplet, MultipletMap};
use ahash::AHashMap;

/// Faces of a tetrahedron `[v0, v1, v2, v3]` with positive orientation,
/// wound so their normals point outward
pub const TET_FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Edges of a tetrahedron
pub const TET_EDGES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// Faces of a hexahedron (bottom quad 0-3, top quad 4-7), outward winding
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Edges of a hexahedron
pub const HEX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Adjacency tables of a mesh. Every list is sorted ascending and free of
/// duplicates, so results never depend on hash iteration order.
#[derive(Debug, Clone, Default)]
pub struct Connectivity {
    vertex_vertices: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
    vertex_voxels: Vec<Vec<usize>>,
    face_faces: Vec<Vec<usize>>,
    face_voxels: Vec<Vec<usize>>,
    voxel_faces: Vec<Vec<usize>>,
    voxel_voxels: Vec<Vec<usize>>,
    edges: Vec<Duplet>,
    edge_faces: Vec<Vec<usize>>,
    edge_lookup: AHashMap<Duplet, usize>,
}

impl Connectivity {
    /// Build adjacency from flat index arrays; out-of-range indices are rejected
    pub fn build(
        num_vertices: usize,
        faces: &[usize],
        vertex_per_face: usize,
        voxels: &[usize],
        vertex_per_voxel: usize,
    ) -> Result<Self> {
        let num_faces = element_count(faces, vertex_per_face)?;
        let num_voxels = element_count(voxels, vertex_per_voxel)?;
        if num_voxels > 0 && vertex_per_voxel != 4 && vertex_per_voxel != 8 {
            return Err(MeshError::NotImplemented(format!(
                "voxels with {} vertices (only tetrahedra and hexahedra)",
                vertex_per_voxel
            )));
        }
        if let Some(&bad) = faces.iter().chain(voxels).find(|&&v| v >= num_vertices) {
            return Err(MeshError::MalformedInput(format!(
                "vertex index {} out of range for {} vertices",
                bad, num_vertices
            )));
        }

        let mut vertex_vertices = vec![Vec::new(); num_vertices];
        let mut vertex_faces = vec![Vec::new(); num_vertices];
        let mut vertex_voxels = vec![Vec::new(); num_vertices];
        let mut face_faces = vec![Vec::new(); num_faces];

        // Edge census: consecutive corner pairs in face order
        let mut edge_map: MultipletMap<2, usize> = MultipletMap::with_capacity(faces.len());
        if num_faces > 0 {
            for (face_idx, face) in faces.chunks_exact(vertex_per_face).enumerate() {
                for (corner, &v) in face.iter().enumerate() {
                    let next = face[(corner + 1) % vertex_per_face];
                    edge_map.insert(Duplet::pair(v, next), face_idx);
                    vertex_faces[v].push(face_idx);
                    link(&mut vertex_vertices, v, next);
                }
            }
        }

        // Canonical copies; a representative keeps whatever orientation came first
        let edges: Vec<Duplet> = edge_map
            .sorted_keys()
            .iter()
            .map(|edge| Duplet::new(*edge.data()))
            .collect();
        let mut edge_faces = Vec::with_capacity(edges.len());
        let mut edge_lookup = AHashMap::with_capacity(edges.len());
        for (edge_idx, edge) in edges.iter().enumerate() {
            let mut owners = edge_map.get(edge)?.to_vec();
            owners.sort_unstable();
            owners.dedup();
            for (i, &a) in owners.iter().enumerate() {
                for &b in &owners[i + 1..] {
                    face_faces[a].push(b);
                    face_faces[b].push(a);
                }
            }
            edge_faces.push(owners);
            edge_lookup.insert(*edge, edge_idx);
        }

        let non_manifold = edge_faces.iter().filter(|owners| owners.len() > 2).count();
        if non_manifold > 0 {
            log::warn!("{} non-manifold edges found while building connectivity", non_manifold);
        }

        let (face_voxels, voxel_faces, voxel_voxels) = if num_voxels == 0 {
            (vec![Vec::new(); num_faces], Vec::new(), Vec::new())
        } else {
            let voxel_edges: &[[usize; 2]] = match vertex_per_voxel {
                4 => &TET_EDGES,
                _ => &HEX_EDGES,
            };
            for (voxel_idx, voxel) in voxels.chunks_exact(vertex_per_voxel).enumerate() {
                for &v in voxel {
                    vertex_voxels[v].push(voxel_idx);
                }
                for [a, b] in voxel_edges {
                    link(&mut vertex_vertices, voxel[*a], voxel[*b]);
                }
            }
            match vertex_per_voxel {
                4 => voxel_face_incidence(faces, vertex_per_face, voxels, 4, &TET_FACES[..])?,
                _ => voxel_face_incidence(faces, vertex_per_face, voxels, 8, &HEX_FACES[..])?,
            }
        };

        let mut connectivity = Self {
            vertex_vertices,
            vertex_faces,
            vertex_voxels,
            face_faces,
            face_voxels,
            voxel_faces,
            voxel_voxels,
            edges,
            edge_faces,
            edge_lookup,
        };
        connectivity.normalize();

        log::debug!(
            "built connectivity: {} vertices, {} faces, {} voxels, {} edges",
            num_vertices,
            num_faces,
            num_voxels,
            connectivity.edges.len()
        );
        Ok(connectivity)
    }

    fn normalize(&mut self) {
        for table in [
            &mut self.vertex_vertices,
            &mut self.vertex_faces,
            &mut self.vertex_voxels,
            &mut self.face_faces,
            &mut self.face_voxels,
            &mut self.voxel_faces,
            &mut self.voxel_voxels,
        ] {
            for list in table.iter_mut() {
                list.sort_unstable();
                list.dedup();
            }
        }
    }

    pub fn vertex_adjacent_vertices(&self, vertex: usize) -> &[usize] {
        lookup(&self.vertex_vertices, vertex)
    }

    pub fn vertex_adjacent_faces(&self, vertex: usize) -> &[usize] {
        lookup(&self.vertex_faces, vertex)
    }

    pub fn vertex_adjacent_voxels(&self, vertex: usize) -> &[usize] {
        lookup(&self.vertex_voxels, vertex)
    }

    /// Faces sharing at least one edge with `face`
    pub fn face_adjacent_faces(&self, face: usize) -> &[usize] {
        lookup(&self.face_faces, face)
    }

    pub fn face_adjacent_voxels(&self, face: usize) -> &[usize] {
        lookup(&self.face_voxels, face)
    }

    /// Mesh faces lying on the boundary of `voxel`
    pub fn voxel_adjacent_faces(&self, voxel: usize) -> &[usize] {
        lookup(&self.voxel_faces, voxel)
    }

    /// Voxels sharing a face with `voxel`
    pub fn voxel_adjacent_voxels(&self, voxel: usize) -> &[usize] {
        lookup(&self.voxel_voxels, voxel)
    }

    /// Unique edges in canonical order
    pub fn edges(&self) -> &[Duplet] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Faces incident to the edge at `edge_idx` of [`Connectivity::edges`]
    pub fn edge_adjacent_faces(&self, edge_idx: usize) -> &[usize] {
        lookup(&self.edge_faces, edge_idx)
    }

    /// Position of `edge` in [`Connectivity::edges`]
    pub fn edge_index(&self, edge: &Duplet) -> Result<usize> {
        self.edge_lookup
            .get(edge)
            .copied()
            .ok_or_else(|| MeshError::NotFound(format!("edge {}", edge)))
    }

    /// Edges with exactly one incident face
    pub fn boundary_edges(&self) -> Vec<Duplet> {
        self.edges_with(|count| count == 1)
    }

    /// Edges with three or more incident faces
    pub fn non_manifold_edges(&self) -> Vec<Duplet> {
        self.edges_with(|count| count > 2)
    }

    /// Every edge has at most two faces
    pub fn is_manifold(&self) -> bool {
        self.edge_faces.iter().all(|owners| owners.len() <= 2)
    }

    /// Every edge has exactly two faces
    pub fn is_closed(&self) -> bool {
        self.edge_faces.iter().all(|owners| owners.len() == 2)
    }

    /// Per-vertex flag: true when the vertex touches a boundary edge
    pub fn boundary_vertices(&self) -> Vec<bool> {
        let mut flags = vec![false; self.vertex_vertices.len()];
        for edge in self.boundary_edges() {
            for &v in edge.data() {
                flags[v] = true;
            }
        }
        flags
    }

    fn edges_with(&self, predicate: impl Fn(usize) -> bool) -> Vec<Duplet> {
        self.edges
            .iter()
            .zip(&self.edge_faces)
            .filter(|(_, owners)| predicate(owners.len()))
            .map(|(edge, _)| *edge)
            .collect()
    }
}

/// Boundary faces of a voxel mesh: voxel faces not shared with any other
/// voxel, kept in their outward winding and ordered by (voxel, local face).
/// Returns the flat face array and the number of vertices per face.
pub fn extract_boundary_faces(
    voxels: &[usize],
    vertex_per_voxel: usize,
) -> Result<(Vec<usize>, usize)> {
    match vertex_per_voxel {
        4 => Ok((boundary_of(voxels, 4, &TET_FACES[..]), 3)),
        8 => Ok((boundary_of(voxels, 8, &HEX_FACES[..]), 4)),
        other => Err(MeshError::NotImplemented(format!(
            "voxels with {} vertices (only tetrahedra and hexahedra)",
            other
        ))),
    }
}

fn boundary_of<const N: usize>(
    voxels: &[usize],
    vertex_per_voxel: usize,
    local_faces: &[[usize; N]],
) -> Vec<usize> {
    let mut face_map: MultipletMap<N, (usize, usize)> = MultipletMap::new();
    for (voxel_idx, voxel) in voxels.chunks_exact(vertex_per_voxel).enumerate() {
        for (local_idx, local) in local_faces.iter().enumerate() {
            let corners: [usize; N] = std::array::from_fn(|k| voxel[local[k]]);
            face_map.insert(Multiplet::new(corners), (voxel_idx, local_idx));
        }
    }

    let mut boundary: Vec<((usize, usize), [usize; N])> = face_map
        .iter()
        .filter(|(_, owners)| owners.len() == 1)
        .map(|(face, owners)| (owners[0], *face.ori_data()))
        .collect();
    boundary.sort_unstable_by_key(|(owner, _)| *owner);
    boundary.into_iter().flat_map(|(_, corners)| corners).collect()
}

type VoxelIncidence = (Vec<Vec<usize>>, Vec<Vec<usize>>, Vec<Vec<usize>>);

fn voxel_face_incidence<const N: usize>(
    faces: &[usize],
    vertex_per_face: usize,
    voxels: &[usize],
    vertex_per_voxel: usize,
    local_faces: &[[usize; N]],
) -> Result<VoxelIncidence> {
    let num_voxels = voxels.len() / vertex_per_voxel;
    let num_faces = if vertex_per_face == 0 { 0 } else { faces.len() / vertex_per_face };
    if num_faces > 0 && vertex_per_face != N {
        return Err(MeshError::MalformedInput(format!(
            "faces have {} vertices but voxel faces have {}",
            vertex_per_face, N
        )));
    }

    let mut face_map: MultipletMap<N, usize> =
        MultipletMap::with_capacity(num_voxels * local_faces.len());
    for (voxel_idx, voxel) in voxels.chunks_exact(vertex_per_voxel).enumerate() {
        for local in local_faces {
            let corners: [usize; N] = std::array::from_fn(|k| voxel[local[k]]);
            face_map.insert(Multiplet::new(corners), voxel_idx);
        }
    }

    let mut voxel_voxels = vec![Vec::new(); num_voxels];
    for (_, owners) in face_map.iter() {
        for (i, &a) in owners.iter().enumerate() {
            for &b in &owners[i + 1..] {
                if a != b {
                    voxel_voxels[a].push(b);
                    voxel_voxels[b].push(a);
                }
            }
        }
    }

    let mut face_voxels = vec![Vec::new(); num_faces];
    let mut voxel_faces = vec![Vec::new(); num_voxels];
    if num_faces > 0 {
        for (face_idx, face) in faces.chunks_exact(N).enumerate() {
            let corners: [usize; N] = std::array::from_fn(|k| face[k]);
            if let Some(owners) = face_map.try_get(&Multiplet::new(corners)) {
                for &owner in owners {
                    face_voxels[face_idx].push(owner);
                    voxel_faces[owner].push(face_idx);
                }
            }
        }
    }

    Ok((face_voxels, voxel_faces, voxel_voxels))
}

fn element_count(indices: &[usize], per_element: usize) -> Result<usize> {
    if indices.is_empty() {
        return Ok(0);
    }
    if per_element == 0 || indices.len() % per_element != 0 {
        return Err(MeshError::MalformedInput(format!(
            "{} indices cannot be split into elements of {} vertices",
            indices.len(),
            per_element
        )));
    }
    Ok(indices.len() / per_element)
}

fn link(adjacency: &mut [Vec<usize>], a: usize, b: usize) {
    if a != b {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
}

fn lookup(table: &[Vec<usize>], idx: usize) -> &[usize] {
    table.get(idx).map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_triangles_share_an_edge() {
        let faces = [0, 1, 2, 2, 1, 3];
        let conn = Connectivity::build(4, &faces, 3, &[], 0).unwrap();

        assert_eq!(conn.num_edges(), 5);
        let shared = conn.edge_index(&Duplet::pair(2, 1)).unwrap();
        assert_eq!(conn.edge_adjacent_faces(shared), &[0, 1]);
        assert_eq!(conn.face_adjacent_faces(0), &[1]);
        assert_eq!(conn.vertex_adjacent_vertices(1), &[0, 2, 3]);
        assert_eq!(conn.boundary_edges().len(), 4);
        assert!(conn.is_manifold());
        assert!(!conn.is_closed());
    }

    #[test]
    fn test_non_manifold_census() {
        // Three triangles fanned around edge (0, 1)
        let faces = [0, 1, 2, 1, 0, 3, 0, 1, 4];
        let conn = Connectivity::build(5, &faces, 3, &[], 0).unwrap();
        assert_eq!(conn.non_manifold_edges(), vec![Duplet::pair(0, 1)]);
        assert!(!conn.is_manifold());
    }

    #[test]
    fn test_edges_are_sorted_canonically() {
        let faces = [2, 1, 0];
        let conn = Connectivity::build(3, &faces, 3, &[], 0).unwrap();
        let edges: Vec<[usize; 2]> = conn.edges().iter().map(|e| *e.data()).collect();
        assert_eq!(edges, vec![[0, 1], [0, 2], [1, 2]]);
    }

    #[test]
    fn test_tet_boundary_extraction() {
        let (faces, vertex_per_face) = extract_boundary_faces(&[0, 1, 2, 3], 4).unwrap();
        assert_eq!(vertex_per_face, 3);
        assert_eq!(faces, vec![1, 2, 3, 0, 3, 2, 0, 1, 3, 0, 2, 1]);
    }

    #[test]
    fn test_shared_face_between_tets_is_interior() {
        let voxels = [0, 1, 2, 3, 1, 2, 3, 4];
        let (faces, _) = extract_boundary_faces(&voxels, 4).unwrap();
        assert_eq!(faces.len() / 3, 6);

        let conn = Connectivity::build(5, &faces, 3, &voxels, 4).unwrap();
        assert_eq!(conn.voxel_adjacent_voxels(0), &[1]);
        assert_eq!(conn.voxel_adjacent_faces(0).len(), 3);
        for face in 0..6 {
            assert_eq!(conn.face_adjacent_voxels(face).len(), 1);
        }
        assert_eq!(conn.vertex_adjacent_voxels(2), &[0, 1]);
    }

    #[test]
    fn test_unsupported_voxel_arity() {
        assert!(matches!(
            extract_boundary_faces(&[0, 1, 2, 3, 4, 5], 6),
            Err(MeshError::NotImplemented(_))
        ));
    }
}
