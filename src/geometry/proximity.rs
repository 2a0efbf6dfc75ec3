// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact proximity queries on top of the [`HashGrid`] candidate search

use super::{Mesh, MeshBuilder};
use crate::error::{MeshError, Result};
use crate::index::{HashGrid, ItemId};
use std::sync::Arc;

/// Point set with a grid accelerating radius queries
#[derive(Debug, Clone)]
pub struct PointLocator {
    grid: HashGrid,
    dim: usize,
    coords: Vec<f64>,
}

impl PointLocator {
    /// Empty locator for `dim`-dimensional points
    pub fn new(dim: usize, cell_size: f64) -> Result<Self> {
        Ok(Self {
            grid: HashGrid::create(cell_size, dim)?,
            dim,
            coords: Vec::new(),
        })
    }

    /// Locator over flat coordinates; point `i` gets id `i`
    pub fn from_points(coords: &[f64], dim: usize, cell_size: f64) -> Result<Self> {
        let mut locator = Self::new(dim, cell_size)?;
        if coords.len() % dim != 0 {
            return Err(MeshError::MalformedInput(format!(
                "{} coordinates is not a multiple of dimension {}",
                coords.len(),
                dim
            )));
        }
        let ids: Vec<ItemId> = (0..coords.len() / dim).collect();
        locator.grid.insert_multiple(&ids, coords)?;
        locator.coords = coords.to_vec();
        Ok(locator)
    }

    /// Locator over a mesh's vertices at the configured grid cell size
    pub fn for_mesh(mesh: &Mesh) -> Result<Self> {
        Self::from_points(mesh.vertices(), mesh.dim(), mesh.config().grid_cell_size)
    }

    /// Append a point and return its id
    pub fn push(&mut self, point: &[f64]) -> Result<ItemId> {
        let id = self.len();
        self.grid.insert(id, point)?;
        self.coords.extend_from_slice(point);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn point(&self, id: ItemId) -> &[f64] {
        &self.coords[id * self.dim..(id + 1) * self.dim]
    }

    fn distance_squared(&self, id: ItemId, query: &[f64]) -> f64 {
        self.point(id)
            .iter()
            .zip(query)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Ids at distance `<= radius` from `query`, ascending
    pub fn within(&self, query: &[f64], radius: f64) -> Result<Vec<ItemId>> {
        let limit = radius * radius;
        let candidates = self.grid.get_items_within(query, radius)?;
        Ok(candidates
            .into_iter()
            .filter(|&id| self.distance_squared(id, query) <= limit)
            .collect())
    }

    /// Closest point within `radius`; ties go to the lowest id
    pub fn nearest_within(&self, query: &[f64], radius: f64) -> Result<Option<ItemId>> {
        let limit = radius * radius;
        let mut best: Option<(f64, ItemId)> = None;
        for id in self.grid.get_items_within(query, radius)? {
            let d = self.distance_squared(id, query);
            if d > limit {
                continue;
            }
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, id));
            }
        }
        Ok(best.map(|(_, id)| id))
    }

    /// Lowest id strictly closer than `distance` to `query`
    fn first_closer_than(&self, query: &[f64], distance: f64) -> Result<Option<ItemId>> {
        let limit = distance * distance;
        Ok(self
            .grid
            .get_items_within(query, distance)?
            .into_iter()
            .find(|&id| self.distance_squared(id, query) < limit))
    }
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(MeshError::MalformedInput(format!(
            "tolerance must be finite and positive, got {}",
            tolerance
        )));
    }
    Ok(())
}

/// Merge every vertex closer than `tolerance` to an earlier kept vertex.
///
/// Returns the welded flat coordinates and, for every input vertex, the index
/// of the vertex it became. A vertex joins the first kept vertex (lowest id)
/// strictly within `tolerance`, not the nearest one.
pub fn weld_vertices(
    vertices: &[f64],
    dim: usize,
    tolerance: f64,
) -> Result<(Vec<f64>, Vec<usize>)> {
    check_tolerance(tolerance)?;
    let mut kept = PointLocator::new(dim, tolerance)?;
    if vertices.len() % dim != 0 {
        return Err(MeshError::MalformedInput(format!(
            "{} coordinates is not a multiple of dimension {}",
            vertices.len(),
            dim
        )));
    }

    let mut mapping = Vec::with_capacity(vertices.len() / dim);
    for point in vertices.chunks_exact(dim) {
        let target = match kept.first_closer_than(point, tolerance)? {
            Some(existing) => existing,
            None => kept.push(point)?,
        };
        mapping.push(target);
    }

    log::debug!("Welded {} vertices into {}", mapping.len(), kept.len());
    Ok((kept.coords, mapping))
}

/// Copy of `mesh` with its vertices welded at the configured weld tolerance.
/// Element arrays are remapped; cached attributes are not carried over.
pub fn weld_mesh(mesh: &Mesh) -> Result<Mesh> {
    let (vertices, mapping) =
        weld_vertices(mesh.vertices(), mesh.dim(), mesh.config().weld_tolerance)?;
    let remap = |indices: &[usize]| indices.iter().map(|&v| mapping[v]).collect::<Vec<_>>();

    let mut builder = MeshBuilder::new(mesh.dim())
        .vertices(vertices)
        .config(*mesh.config())
        .registry(Arc::clone(mesh.registry()));
    if mesh.num_faces() > 0 {
        builder = builder.faces(remap(mesh.faces()), mesh.vertex_per_face());
    }
    if mesh.num_voxels() > 0 {
        builder = builder.voxels(remap(mesh.voxels()), mesh.vertex_per_voxel());
    }
    builder.build()
}

/// For every source vertex, the nearest target vertex within `tolerance`.
///
/// Useful for carrying indices across a tool that re-emits a subset of the
/// input vertices, such as a convex hull.
pub fn map_indices(
    source: &[f64],
    target: &[f64],
    dim: usize,
    tolerance: f64,
) -> Result<Vec<Option<usize>>> {
    check_tolerance(tolerance)?;
    let locator = PointLocator::from_points(target, dim, tolerance)?;
    if source.len() % dim != 0 {
        return Err(MeshError::MalformedInput(format!(
            "{} coordinates is not a multiple of dimension {}",
            source.len(),
            dim
        )));
    }
    source
        .chunks_exact(dim)
        .map(|point| locator.nearest_within(point, tolerance))
        .collect()
}
