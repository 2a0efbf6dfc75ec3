// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Attribute definitions and prerequisite resolution

use super::{edge, face, vertex, voxel, AttributeTable, ElementDomain};
use crate::error::{MeshError, Result};
use crate::geometry::Mesh;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;

/// Computes one attribute table from a mesh whose prerequisites are cached
pub type ComputeFn = fn(&Mesh) -> Result<AttributeTable>;

/// How to compute a named attribute
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    pub name: String,
    pub domain: ElementDomain,
    /// Attributes that must be cached before `compute` runs
    pub prerequisites: Vec<String>,
    pub compute: ComputeFn,
}

static BUILTIN: Lazy<Arc<AttributeRegistry>> = Lazy::new(|| Arc::new(AttributeRegistry::builtin()));

/// Name -> definition table consulted by [`Mesh::add_attribute`]
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    definitions: AHashMap<String, AttributeDefinition>,
}

impl AttributeRegistry {
    /// Registry with no definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry holding the built-in attributes
    pub fn shared() -> Arc<AttributeRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Every built-in vertex, face, voxel and edge attribute
    pub fn builtin() -> Self {
        use ElementDomain::{Edge, Face, Vertex, Voxel};

        let mut registry = Self::new();
        registry
            .register("vertex_index", Vertex, &[], vertex::vertex_index)
            .register("vertex_valance", Vertex, &[], vertex::vertex_valance)
            .register("vertex_area", Vertex, &["face_area"], vertex::vertex_area)
            .register(
                "vertex_normal",
                Vertex,
                &["face_normal", "face_area"],
                vertex::vertex_normal,
            )
            .register("vertex_laplacian", Vertex, &[], vertex::vertex_laplacian)
            .register(
                "vertex_mean_curvature",
                Vertex,
                &["vertex_laplacian", "vertex_normal", "vertex_area"],
                vertex::vertex_mean_curvature,
            )
            .register(
                "vertex_gaussian_curvature",
                Vertex,
                &["face_corner_angle", "vertex_area"],
                vertex::vertex_gaussian_curvature,
            )
            .register(
                "vertex_dihedral_angle",
                Vertex,
                &["edge_dihedral_angle"],
                vertex::vertex_dihedral_angle,
            )
            .register("face_index", Face, &[], face::face_index)
            .register("face_area", Face, &[], face::face_area)
            .register("face_normal", Face, &[], face::face_normal)
            .register("face_centroid", Face, &[], face::face_centroid)
            .register("face_corner_angle", Face, &[], face::face_corner_angle)
            .register("face_circumcenter", Face, &[], face::face_circumcenter)
            .register("face_circumradius", Face, &[], face::face_circumradius)
            .register("face_incircle_center", Face, &[], face::face_incircle_center)
            .register("face_incircle_radius", Face, &[], face::face_incircle_radius)
            .register(
                "face_aspect_ratio",
                Face,
                &["face_circumradius", "face_incircle_radius"],
                face::face_aspect_ratio,
            )
            .register("voxel_index", Voxel, &[], voxel::voxel_index)
            .register("voxel_volume", Voxel, &[], voxel::voxel_volume)
            .register("voxel_centroid", Voxel, &[], voxel::voxel_centroid)
            .register("voxel_face_area", Voxel, &[], voxel::voxel_face_area)
            .register(
                "voxel_inradius",
                Voxel,
                &["voxel_volume", "voxel_face_area"],
                voxel::voxel_inradius,
            )
            .register("voxel_circumcenter", Voxel, &[], voxel::voxel_circumcenter)
            .register(
                "voxel_circumradius",
                Voxel,
                &["voxel_circumcenter"],
                voxel::voxel_circumradius,
            )
            .register("voxel_dihedral_angle", Voxel, &[], voxel::voxel_dihedral_angle)
            .register("voxel_edge_ratio", Voxel, &[], voxel::voxel_edge_ratio)
            .register(
                "voxel_radius_edge_ratio",
                Voxel,
                &["voxel_circumradius"],
                voxel::voxel_radius_edge_ratio,
            )
            .register("edge_length", Edge, &[], edge::edge_length)
            .register(
                "edge_dihedral_angle",
                Edge,
                &["face_normal"],
                edge::edge_dihedral_angle,
            );
        registry
    }

    /// Add or replace a definition
    pub fn register(
        &mut self,
        name: &str,
        domain: ElementDomain,
        prerequisites: &[&str],
        compute: ComputeFn,
    ) -> &mut Self {
        let definition = AttributeDefinition {
            name: name.to_string(),
            domain,
            prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
            compute,
        };
        if self.definitions.insert(name.to_string(), definition).is_some() {
            log::debug!("Replaced attribute definition {}", name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&AttributeDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| MeshError::NotFound(format!("attribute definition {}", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions needed for `name`, prerequisites first and `name` last.
    /// Each definition appears once even when several attributes share it.
    pub fn resolution_order(&self, name: &str) -> Result<Vec<&AttributeDefinition>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut path = Vec::new();
        self.visit(name, &mut order, &mut done, &mut path)?;
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        order: &mut Vec<&'a AttributeDefinition>,
        done: &mut HashSet<String>,
        path: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|visiting| visiting == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            return Err(MeshError::CyclicDependency(cycle.join(" -> ")));
        }

        let definition = self.get(name)?;
        path.push(name.to_string());
        for prerequisite in &definition.prerequisites {
            self.visit(prerequisite, order, done, path)?;
        }
        path.pop();

        done.insert(name.to_string());
        order.push(definition);
        Ok(())
    }
}
