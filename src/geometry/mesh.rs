// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed surface and volume meshes with lazily built adjacency and a
//! per-mesh attribute cache

use super::connectivity::{extract_boundary_faces, Connectivity};
use super::BoundingBox;
use crate::attributes::{AttributeRegistry, AttributeStore, AttributeTable, ElementDomain};
use crate::config::GeometryConfig;
use crate::error::{MeshError, Result};
use crate::utils::math::lift;
use nalgebra::Point3;
use std::sync::Arc;

/// Mesh over flat arrays: `dim` coordinates per vertex, `vertex_per_face`
/// indices per face and `vertex_per_voxel` indices per voxel.
///
/// Vertex positions and element arrays are immutable once built, so cached
/// connectivity and attributes never go stale.
#[derive(Debug, Clone)]
pub struct Mesh {
    dim: usize,
    vertices: Vec<f64>,
    faces: Vec<usize>,
    vertex_per_face: usize,
    voxels: Vec<usize>,
    vertex_per_voxel: usize,
    config: GeometryConfig,
    connectivity: Option<Connectivity>,
    attributes: AttributeStore,
    registry: Arc<AttributeRegistry>,
}

/// Validating constructor for [`Mesh`]
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    dim: usize,
    vertices: Vec<f64>,
    faces: Vec<usize>,
    vertex_per_face: usize,
    voxels: Vec<usize>,
    vertex_per_voxel: usize,
    config: GeometryConfig,
    registry: Option<Arc<AttributeRegistry>>,
}

impl MeshBuilder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vertices: Vec::new(),
            faces: Vec::new(),
            vertex_per_face: 3,
            voxels: Vec::new(),
            vertex_per_voxel: 4,
            config: GeometryConfig::default(),
            registry: None,
        }
    }

    /// Flat coordinates, `dim` per vertex
    pub fn vertices(mut self, vertices: Vec<f64>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn faces(mut self, faces: Vec<usize>, vertex_per_face: usize) -> Self {
        self.faces = faces;
        self.vertex_per_face = vertex_per_face;
        self
    }

    pub fn voxels(mut self, voxels: Vec<usize>, vertex_per_voxel: usize) -> Self {
        self.voxels = voxels;
        self.vertex_per_voxel = vertex_per_voxel;
        self
    }

    pub fn config(mut self, config: GeometryConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom attribute registry instead of the shared built-in one
    pub fn registry(mut self, registry: Arc<AttributeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Mesh> {
        let MeshBuilder {
            dim,
            vertices,
            mut faces,
            mut vertex_per_face,
            voxels,
            mut vertex_per_voxel,
            config,
            registry,
        } = self;

        if dim != 2 && dim != 3 {
            return Err(MeshError::dimension(dim, "2 or 3"));
        }
        if vertices.len() % dim != 0 {
            return Err(MeshError::MalformedInput(format!(
                "{} coordinates is not a multiple of dimension {}",
                vertices.len(),
                dim
            )));
        }
        if let Some(pos) = vertices.iter().position(|c| !c.is_finite()) {
            return Err(MeshError::MalformedInput(format!(
                "vertex {} has a non-finite coordinate",
                pos / dim
            )));
        }
        let num_vertices = vertices.len() / dim;

        if voxels.is_empty() {
            vertex_per_voxel = 4;
        } else {
            if dim != 3 {
                return Err(MeshError::dimension(dim, "3 for voxel meshes"));
            }
            if vertex_per_voxel != 4 && vertex_per_voxel != 8 {
                return Err(MeshError::dimension(vertex_per_voxel, "4 or 8 vertices per voxel"));
            }
            check_indices(&voxels, vertex_per_voxel, num_vertices, "voxel")?;

            if faces.is_empty() {
                let (boundary, per_face) = extract_boundary_faces(&voxels, vertex_per_voxel)?;
                log::info!(
                    "Derived {} boundary faces from {} voxels",
                    boundary.len() / per_face,
                    voxels.len() / vertex_per_voxel
                );
                faces = boundary;
                vertex_per_face = per_face;
            } else {
                let expected = if vertex_per_voxel == 4 { 3 } else { 4 };
                if vertex_per_face != expected {
                    return Err(MeshError::MalformedInput(format!(
                        "faces have {} vertices but voxel faces have {}",
                        vertex_per_face, expected
                    )));
                }
            }
        }

        if vertex_per_face != 3 && vertex_per_face != 4 {
            return Err(MeshError::dimension(vertex_per_face, "3 or 4 vertices per face"));
        }
        check_indices(&faces, vertex_per_face, num_vertices, "face")?;

        log::debug!(
            "Built {}D mesh: {} vertices, {} faces, {} voxels",
            dim,
            num_vertices,
            faces.len() / vertex_per_face,
            voxels.len() / vertex_per_voxel
        );

        Ok(Mesh {
            dim,
            vertices,
            faces,
            vertex_per_face,
            voxels,
            vertex_per_voxel,
            config,
            connectivity: None,
            attributes: AttributeStore::new(),
            registry: registry.unwrap_or_else(AttributeRegistry::shared),
        })
    }
}

fn check_indices(
    indices: &[usize],
    per_element: usize,
    num_vertices: usize,
    kind: &str,
) -> Result<()> {
    if indices.len() % per_element != 0 {
        return Err(MeshError::MalformedInput(format!(
            "{} {} indices cannot be split into elements of {} vertices",
            indices.len(),
            kind,
            per_element
        )));
    }
    if let Some(pos) = indices.iter().position(|&v| v >= num_vertices) {
        return Err(MeshError::MalformedInput(format!(
            "{} {} references vertex {} but the mesh has {} vertices",
            kind,
            pos / per_element,
            indices[pos],
            num_vertices
        )));
    }
    Ok(())
}

impl Mesh {
    /// Triangle surface mesh from flat arrays
    pub fn from_triangles(dim: usize, vertices: Vec<f64>, faces: Vec<usize>) -> Result<Self> {
        MeshBuilder::new(dim).vertices(vertices).faces(faces, 3).build()
    }

    /// Volume mesh from flat arrays; boundary faces are derived
    pub fn from_voxels(
        vertices: Vec<f64>,
        voxels: Vec<usize>,
        vertex_per_voxel: usize,
    ) -> Result<Self> {
        MeshBuilder::new(3)
            .vertices(vertices)
            .voxels(voxels, vertex_per_voxel)
            .build()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / self.dim
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len() / self.vertex_per_face
    }

    pub fn num_voxels(&self) -> usize {
        self.voxels.len() / self.vertex_per_voxel
    }

    pub fn vertex_per_face(&self) -> usize {
        self.vertex_per_face
    }

    pub fn vertex_per_voxel(&self) -> usize {
        self.vertex_per_voxel
    }

    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    pub fn voxels(&self) -> &[usize] {
        &self.voxels
    }

    pub fn vertex(&self, index: usize) -> &[f64] {
        &self.vertices[index * self.dim..(index + 1) * self.dim]
    }

    pub fn face(&self, index: usize) -> &[usize] {
        &self.faces[index * self.vertex_per_face..(index + 1) * self.vertex_per_face]
    }

    pub fn voxel(&self, index: usize) -> &[usize] {
        &self.voxels[index * self.vertex_per_voxel..(index + 1) * self.vertex_per_voxel]
    }

    /// Vertex position lifted to 3D
    pub fn position(&self, index: usize) -> Point3<f64> {
        lift(self.vertex(index))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let points: Vec<Point3<f64>> = (0..self.num_vertices()).map(|i| self.position(i)).collect();
        BoundingBox::from_points(&points)
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Registry consulted by [`Mesh::add_attribute`]
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    /// Build adjacency tables; a no-op once built
    pub fn enable_connectivity(&mut self) -> Result<()> {
        if self.connectivity.is_none() {
            let connectivity = Connectivity::build(
                self.num_vertices(),
                &self.faces,
                self.vertex_per_face,
                &self.voxels,
                self.vertex_per_voxel,
            )?;
            self.connectivity = Some(connectivity);
        }
        Ok(())
    }

    pub fn connectivity(&self) -> Option<&Connectivity> {
        self.connectivity.as_ref()
    }

    /// Adjacency tables, or `NotFound` before [`Mesh::enable_connectivity`]
    pub fn topology(&self) -> Result<&Connectivity> {
        self.connectivity
            .as_ref()
            .ok_or_else(|| MeshError::NotFound("connectivity has not been enabled".to_string()))
    }

    pub fn vertex_adjacent_vertices(&self, vertex: usize) -> Result<&[usize]> {
        Ok(self.topology()?.vertex_adjacent_vertices(vertex))
    }

    pub fn vertex_adjacent_faces(&self, vertex: usize) -> Result<&[usize]> {
        Ok(self.topology()?.vertex_adjacent_faces(vertex))
    }

    pub fn vertex_adjacent_voxels(&self, vertex: usize) -> Result<&[usize]> {
        Ok(self.topology()?.vertex_adjacent_voxels(vertex))
    }

    pub fn face_adjacent_faces(&self, face: usize) -> Result<&[usize]> {
        Ok(self.topology()?.face_adjacent_faces(face))
    }

    pub fn face_adjacent_voxels(&self, face: usize) -> Result<&[usize]> {
        Ok(self.topology()?.face_adjacent_voxels(face))
    }

    pub fn voxel_adjacent_faces(&self, voxel: usize) -> Result<&[usize]> {
        Ok(self.topology()?.voxel_adjacent_faces(voxel))
    }

    pub fn voxel_adjacent_voxels(&self, voxel: usize) -> Result<&[usize]> {
        Ok(self.topology()?.voxel_adjacent_voxels(voxel))
    }

    /// Number of elements of a domain; edges need connectivity
    pub fn element_count(&self, domain: ElementDomain) -> Result<usize> {
        Ok(match domain {
            ElementDomain::Vertex => self.num_vertices(),
            ElementDomain::Face => self.num_faces(),
            ElementDomain::Voxel => self.num_voxels(),
            ElementDomain::Edge => self.topology()?.num_edges(),
        })
    }

    /// Compute `name` and any missing prerequisites, caching every result.
    ///
    /// Connectivity is enabled on demand. Already cached attributes are not
    /// recomputed. When any computation in the chain fails, everything cached
    /// by this call is discarded again and the error is returned.
    pub fn add_attribute(&mut self, name: &str) -> Result<()> {
        if self.attributes.contains(name) {
            log::trace!("Attribute {} already cached", name);
            return Ok(());
        }

        let registry = Arc::clone(&self.registry);
        let order = registry.resolution_order(name)?;
        self.enable_connectivity()?;

        let mut added: Vec<&str> = Vec::new();
        for definition in order {
            if self.attributes.contains(&definition.name) {
                continue;
            }
            match self.compute_checked(definition.domain, definition.compute, &definition.name) {
                Ok(table) => {
                    log::debug!(
                        "Computed {} attribute {} ({} x {})",
                        definition.domain,
                        definition.name,
                        table.rows(),
                        table.cols()
                    );
                    self.attributes.insert(definition.name.clone(), definition.domain, table);
                    added.push(&definition.name);
                }
                Err(err) => {
                    for computed in added {
                        self.attributes.remove(computed);
                    }
                    log::debug!("Attribute {} failed: {}", definition.name, err);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn compute_checked(
        &self,
        domain: ElementDomain,
        compute: crate::attributes::ComputeFn,
        name: &str,
    ) -> Result<AttributeTable> {
        let table = compute(self)?;
        let expected = self.element_count(domain)?;
        if table.rows() != expected {
            return Err(MeshError::MalformedInput(format!(
                "attribute {} produced {} rows for {} {} elements",
                name,
                table.rows(),
                expected,
                domain
            )));
        }
        Ok(table)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Cached table, or `NotFound` when it was never computed
    pub fn get_attribute(&self, name: &str) -> Result<&AttributeTable> {
        self.attributes.get(name)
    }

    pub fn attribute_domain(&self, name: &str) -> Option<ElementDomain> {
        self.attributes.domain(name)
    }

    /// Store a caller-supplied table, replacing any cached value
    pub fn set_attribute(
        &mut self,
        name: &str,
        domain: ElementDomain,
        table: AttributeTable,
    ) -> Result<()> {
        if domain == ElementDomain::Edge {
            self.enable_connectivity()?;
        }
        let expected = self.element_count(domain)?;
        if table.rows() != expected {
            return Err(MeshError::MalformedInput(format!(
                "attribute {} has {} rows but the mesh has {} {} elements",
                name,
                table.rows(),
                expected,
                domain
            )));
        }
        self.attributes.insert(name, domain, table);
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeTable> {
        self.attributes.remove(name)
    }

    /// Cached attribute names in alphabetical order
    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.names()
    }
}
