// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Uniform spatial hash grid over floating-point coordinates
//!
//! Space is cut into cubes of side `cell_size`; a point lands in cell
//! `floor(p / cell_size)`. Boxes and triangles are registered in every cell
//! their bounding box overlaps, which makes the grid a conservative
//! containment filter rather than an exact rasterizer.
//!
//! Proximity queries scan a block of cells around the query cell
//! ([`GridIndex::get_items_near_point`] uses the 3^dim block), because an
//! item just across a cell wall is invisible to a single-cell lookup. The
//! results are candidates: exact distance filtering is left to the caller.

use super::CanonicalKey;
use crate::config::GeometryConfig;
use crate::error::{MeshError, Result};
use ahash::{AHashMap, AHashSet};

/// Identifier of an item stored in the grid
pub type ItemId = usize;

/// Upper bound on cells a single item or query may touch
const MAX_CELLS_PER_ITEM: usize = 1 << 24;

#[derive(Debug, Clone, Default)]
struct Registration<const DIM: usize> {
    inserts: usize,
    cells: AHashSet<CanonicalKey<DIM>>,
}

/// Hash grid with a compile-time dimension
#[derive(Debug, Clone)]
pub struct GridIndex<const DIM: usize> {
    cell_size: f64,
    degenerate_tolerance: f64,
    cells: AHashMap<CanonicalKey<DIM>, Vec<ItemId>>,
    registrations: AHashMap<ItemId, Registration<DIM>>,
    size: usize,
}

impl<const DIM: usize> GridIndex<DIM> {
    pub fn new(cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MeshError::MalformedInput(format!(
                "cell size must be finite and positive, got {}",
                cell_size
            )));
        }
        Ok(Self {
            cell_size,
            degenerate_tolerance: GeometryConfig::default().degenerate_tolerance,
            cells: AHashMap::new(),
            registrations: AHashMap::new(),
            size: 0,
        })
    }

    /// Relative tolerance used to reject collinear triangles
    pub fn with_degenerate_tolerance(mut self, tolerance: f64) -> Self {
        self.degenerate_tolerance = tolerance;
        self
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn dim(&self) -> usize {
        DIM
    }

    /// Cell containing `point`
    pub fn key_of(&self, point: &[f64; DIM]) -> Result<CanonicalKey<DIM>> {
        CanonicalKey::from_point(point, self.cell_size)
    }

    /// Center coordinate of the cell addressed by `key`
    pub fn cell_center(&self, key: &CanonicalKey<DIM>) -> [f64; DIM] {
        let mut center = [0.0; DIM];
        for (axis, value) in center.iter_mut().enumerate() {
            *value = (key[axis] as f64 + 0.5) * self.cell_size;
        }
        center
    }

    pub fn insert(&mut self, id: ItemId, point: &[f64; DIM]) -> Result<()> {
        let key = self.key_of(point)?;
        self.register(id, std::iter::once(key));
        Ok(())
    }

    /// Register `id` in every cell the axis-aligned box overlaps
    pub fn insert_bbox(&mut self, id: ItemId, min: &[f64; DIM], max: &[f64; DIM]) -> Result<()> {
        let keys = self.bbox_keys(min, max)?;
        self.register(id, keys);
        Ok(())
    }

    /// Register `id` in every cell the triangle's bounding box overlaps
    pub fn insert_triangle(
        &mut self,
        id: ItemId,
        a: &[f64; DIM],
        b: &[f64; DIM],
        c: &[f64; DIM],
    ) -> Result<()> {
        let keys = self.triangle_keys(a, b, c)?;
        self.register(id, keys);
        Ok(())
    }

    /// Insert many points under the same id
    pub fn insert_batch(&mut self, id: ItemId, points: &[[f64; DIM]]) -> Result<()> {
        let keys = points
            .iter()
            .map(|point| self.key_of(point))
            .collect::<Result<Vec<_>>>()?;
        for key in keys {
            self.register(id, std::iter::once(key));
        }
        Ok(())
    }

    /// Insert `points[i]` under `ids[i]`
    pub fn insert_multiple(&mut self, ids: &[ItemId], points: &[[f64; DIM]]) -> Result<()> {
        check_row_count(ids.len(), points.len(), "points")?;
        let keys = points
            .iter()
            .map(|point| self.key_of(point))
            .collect::<Result<Vec<_>>>()?;
        for (&id, key) in ids.iter().zip(keys) {
            self.register(id, std::iter::once(key));
        }
        Ok(())
    }

    /// Insert `triangles[i]` under `ids[i]`
    pub fn insert_multiple_triangles(
        &mut self,
        ids: &[ItemId],
        triangles: &[[[f64; DIM]; 3]],
    ) -> Result<()> {
        check_row_count(ids.len(), triangles.len(), "triangles")?;
        let footprints = triangles
            .iter()
            .map(|[a, b, c]| self.triangle_keys(a, b, c))
            .collect::<Result<Vec<_>>>()?;
        for (&id, keys) in ids.iter().zip(footprints) {
            self.register(id, keys);
        }
        Ok(())
    }

    /// Remove every occurrence of `id`; returns false if it was never inserted
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(registration) = self.registrations.remove(&id) else {
            return false;
        };
        for key in registration.cells {
            if let Some(items) = self.cells.get_mut(&key) {
                if let Ok(pos) = items.binary_search(&id) {
                    items.remove(pos);
                }
                if items.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
        self.size -= registration.inserts;
        true
    }

    pub fn occupied(&self, key: &CanonicalKey<DIM>) -> bool {
        self.cells.contains_key(key)
    }

    /// Number of distinct non-empty cells
    pub fn bucket_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of insertions currently held (not de-duplicated by cell)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Ids registered in exactly this cell, sorted
    pub fn items_in_cell(&self, key: &CanonicalKey<DIM>) -> &[ItemId] {
        self.cells.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids registered in the cell containing `point`
    pub fn get_items_in_cell(&self, point: &[f64; DIM]) -> Result<Vec<ItemId>> {
        let key = self.key_of(point)?;
        Ok(self.items_in_cell(&key).to_vec())
    }

    /// Ids registered in the 3^dim block of cells around `point`
    pub fn get_items_near_point(&self, point: &[f64; DIM]) -> Result<Vec<ItemId>> {
        let key = self.key_of(point)?;
        self.collect_rings(&key, 1)
    }

    /// Candidate ids for everything within `radius` of `point`
    pub fn get_items_within(&self, point: &[f64; DIM], radius: f64) -> Result<Vec<ItemId>> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(MeshError::MalformedInput(format!(
                "query radius must be finite and non-negative, got {}",
                radius
            )));
        }
        let key = self.key_of(point)?;
        let rings = (radius / self.cell_size).ceil() as i64;
        self.collect_rings(&key, rings)
    }

    /// Lazy sequence of the centers of all non-empty cells, in no particular order
    pub fn get_occupied_cell_centers(&self) -> impl Iterator<Item = [f64; DIM]> + '_ {
        self.cells.keys().map(move |key| self.cell_center(key))
    }

    /// Occupied cells in ascending key order
    pub fn occupied_keys(&self) -> Vec<CanonicalKey<DIM>> {
        let mut keys: Vec<_> = self.cells.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.registrations.clear();
        self.size = 0;
    }

    fn register(&mut self, id: ItemId, keys: impl IntoIterator<Item = CanonicalKey<DIM>>) {
        let registration = self.registrations.entry(id).or_default();
        registration.inserts += 1;
        for key in keys {
            let items = self.cells.entry(key).or_default();
            if let Err(pos) = items.binary_search(&id) {
                items.insert(pos, id);
            }
            registration.cells.insert(key);
        }
        self.size += 1;
    }

    fn bbox_keys(&self, min: &[f64; DIM], max: &[f64; DIM]) -> Result<Vec<CanonicalKey<DIM>>> {
        for axis in 0..DIM {
            if min[axis] > max[axis] {
                return Err(MeshError::MalformedInput(format!(
                    "bounding box min {} exceeds max {} on axis {}",
                    min[axis], max[axis], axis
                )));
            }
        }
        let lo = self.key_of(min)?;
        let hi = self.key_of(max)?;
        keys_in_range(&lo, &hi)
    }

    fn triangle_keys(
        &self,
        a: &[f64; DIM],
        b: &[f64; DIM],
        c: &[f64; DIM],
    ) -> Result<Vec<CanonicalKey<DIM>>> {
        let mut u_u = 0.0;
        let mut v_v = 0.0;
        let mut u_v = 0.0;
        let mut min = *a;
        let mut max = *a;
        for axis in 0..DIM {
            let u = b[axis] - a[axis];
            let v = c[axis] - a[axis];
            u_u += u * u;
            v_v += v * v;
            u_v += u * v;
            min[axis] = a[axis].min(b[axis]).min(c[axis]);
            max[axis] = a[axis].max(b[axis]).max(c[axis]);
        }
        // Gram determinant is 4 * area^2
        let gram = u_u * v_v - u_v * u_v;
        if !gram.is_finite() {
            return Err(MeshError::MalformedInput(
                "triangle has non-finite coordinates".to_string(),
            ));
        }
        if gram <= self.degenerate_tolerance * u_u * v_v {
            return Err(MeshError::DegenerateGeometry(format!(
                "zero-area triangle {:?} {:?} {:?}",
                a, b, c
            )));
        }
        self.bbox_keys(&min, &max)
    }

    fn collect_rings(&self, center: &CanonicalKey<DIM>, rings: i64) -> Result<Vec<ItemId>> {
        let block = 2.0 * rings as f64 + 1.0;
        let mut found = Vec::new();
        if block.powi(DIM as i32) > self.cells.len() as f64 {
            // Sparse grid: walking the occupied cells is cheaper than the block
            for (key, items) in &self.cells {
                let inside = (0..DIM).all(|axis| key[axis].abs_diff(center[axis]) <= rings as u64);
                if inside {
                    found.extend_from_slice(items);
                }
            }
        } else {
            let lo = center.offset(&[-rings; DIM]);
            let hi = center.offset(&[rings; DIM]);
            for key in keys_in_range(&lo, &hi)? {
                found.extend_from_slice(self.items_in_cell(&key));
            }
        }
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }
}

/// Every key in the inclusive box `lo..=hi`
fn keys_in_range<const DIM: usize>(
    lo: &CanonicalKey<DIM>,
    hi: &CanonicalKey<DIM>,
) -> Result<Vec<CanonicalKey<DIM>>> {
    let mut count: usize = 1;
    for axis in 0..DIM {
        let span = hi[axis]
            .checked_sub(lo[axis])
            .and_then(|d| d.checked_add(1))
            .and_then(|d| usize::try_from(d).ok())
            .unwrap_or(usize::MAX);
        count = count.saturating_mul(span);
    }
    if count > MAX_CELLS_PER_ITEM {
        return Err(MeshError::MalformedInput(format!(
            "region spans {} cells (limit {}); increase the cell size",
            count, MAX_CELLS_PER_ITEM
        )));
    }

    let mut keys = Vec::with_capacity(count);
    let mut current = *lo.data();
    loop {
        keys.push(CanonicalKey::new(current));
        let mut axis = 0;
        loop {
            if axis == DIM {
                return Ok(keys);
            }
            if current[axis] < hi[axis] {
                current[axis] += 1;
                break;
            }
            current[axis] = lo[axis];
            axis += 1;
        }
    }
}

fn check_row_count(ids: usize, rows: usize, what: &str) -> Result<()> {
    if ids != rows {
        return Err(MeshError::MalformedInput(format!(
            "{} ids supplied for {} {}",
            ids, rows, what
        )));
    }
    Ok(())
}

fn to_array<const DIM: usize>(point: &[f64]) -> Result<[f64; DIM]> {
    <[f64; DIM]>::try_from(point)
        .map_err(|_| MeshError::dimension(point.len(), "one coordinate per grid axis"))
}

fn to_key<const DIM: usize>(key: &[i64]) -> Result<CanonicalKey<DIM>> {
    let data = <[i64; DIM]>::try_from(key)
        .map_err(|_| MeshError::dimension(key.len(), "one key component per grid axis"))?;
    Ok(CanonicalKey::new(data))
}

fn check_flat_len(flat: &[f64], expected: usize, rows: usize) -> Result<()> {
    if flat.len() != expected {
        return Err(MeshError::MalformedInput(format!(
            "expected {} values for {} rows, got {}",
            expected,
            rows,
            flat.len()
        )));
    }
    Ok(())
}

fn to_points<const DIM: usize>(flat: &[f64], rows: usize) -> Result<Vec<[f64; DIM]>> {
    check_flat_len(flat, rows * DIM, rows)?;
    flat.chunks_exact(DIM).map(to_array).collect()
}

fn to_triangles<const DIM: usize>(flat: &[f64], rows: usize) -> Result<Vec<[[f64; DIM]; 3]>> {
    check_flat_len(flat, rows * DIM * 3, rows)?;
    flat.chunks_exact(DIM * 3)
        .map(|row| {
            Ok([
                to_array(&row[..DIM])?,
                to_array(&row[DIM..2 * DIM])?,
                to_array(&row[2 * DIM..])?,
            ])
        })
        .collect()
}

/// Hash grid whose dimension is chosen at runtime.
///
/// Coordinates are passed as slices (or flat row-major arrays for the bulk
/// variants) and checked against the grid dimension.
#[derive(Debug, Clone)]
pub enum HashGrid {
    Planar(GridIndex<2>),
    Spatial(GridIndex<3>),
}

macro_rules! with_grid {
    ($self:expr, $grid:ident => $body:expr) => {
        match $self {
            HashGrid::Planar($grid) => $body,
            HashGrid::Spatial($grid) => $body,
        }
    };
}

impl HashGrid {
    /// Create a grid for `dim`-dimensional coordinates (2 or 3)
    pub fn create(cell_size: f64, dim: usize) -> Result<Self> {
        match dim {
            2 => Ok(Self::Planar(GridIndex::new(cell_size)?)),
            3 => Ok(Self::Spatial(GridIndex::new(cell_size)?)),
            other => Err(MeshError::dimension(other, "2 or 3")),
        }
    }

    pub fn dim(&self) -> usize {
        with_grid!(self, grid => grid.dim())
    }

    pub fn cell_size(&self) -> f64 {
        with_grid!(self, grid => grid.cell_size())
    }

    pub fn insert(&mut self, id: ItemId, point: &[f64]) -> Result<()> {
        with_grid!(self, grid => grid.insert(id, &to_array(point)?))
    }

    pub fn insert_bbox(&mut self, id: ItemId, min: &[f64], max: &[f64]) -> Result<()> {
        with_grid!(self, grid => grid.insert_bbox(id, &to_array(min)?, &to_array(max)?))
    }

    pub fn insert_triangle(&mut self, id: ItemId, a: &[f64], b: &[f64], c: &[f64]) -> Result<()> {
        with_grid!(self, grid => {
            grid.insert_triangle(id, &to_array(a)?, &to_array(b)?, &to_array(c)?)
        })
    }

    /// Insert every row of the flat `points` array under `id`
    pub fn insert_batch(&mut self, id: ItemId, points: &[f64]) -> Result<()> {
        let rows = points.len() / self.dim();
        with_grid!(self, grid => grid.insert_batch(id, &to_points(points, rows)?))
    }

    /// Insert row `i` of the flat `points` array under `ids[i]`
    pub fn insert_multiple(&mut self, ids: &[ItemId], points: &[f64]) -> Result<()> {
        with_grid!(self, grid => grid.insert_multiple(ids, &to_points(points, ids.len())?))
    }

    /// Insert triangle `i` (three consecutive points of the flat array) under `ids[i]`
    pub fn insert_multiple_triangles(&mut self, ids: &[ItemId], triangles: &[f64]) -> Result<()> {
        with_grid!(self, grid => {
            grid.insert_multiple_triangles(ids, &to_triangles(triangles, ids.len())?)
        })
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        with_grid!(self, grid => grid.remove(id))
    }

    /// Whether the cell with integer coordinates `key` holds any item
    pub fn occupied(&self, key: &[i64]) -> Result<bool> {
        with_grid!(self, grid => Ok(grid.occupied(&to_key(key)?)))
    }

    /// Integer cell coordinates of `point`
    pub fn key_of(&self, point: &[f64]) -> Result<Vec<i64>> {
        with_grid!(self, grid => Ok(grid.key_of(&to_array(point)?)?.data().to_vec()))
    }

    pub fn bucket_count(&self) -> usize {
        with_grid!(self, grid => grid.bucket_count())
    }

    pub fn size(&self) -> usize {
        with_grid!(self, grid => grid.size())
    }

    pub fn is_empty(&self) -> bool {
        with_grid!(self, grid => grid.is_empty())
    }

    pub fn get_items_in_cell(&self, point: &[f64]) -> Result<Vec<ItemId>> {
        with_grid!(self, grid => grid.get_items_in_cell(&to_array(point)?))
    }

    pub fn get_items_near_point(&self, point: &[f64]) -> Result<Vec<ItemId>> {
        with_grid!(self, grid => grid.get_items_near_point(&to_array(point)?))
    }

    pub fn get_items_within(&self, point: &[f64], radius: f64) -> Result<Vec<ItemId>> {
        with_grid!(self, grid => grid.get_items_within(&to_array(point)?, radius))
    }

    /// Lazy sequence of occupied cell centers; call again to restart
    pub fn get_occupied_cell_centers(&self) -> Box<dyn Iterator<Item = Vec<f64>> + '_> {
        match self {
            HashGrid::Planar(grid) => {
                Box::new(grid.get_occupied_cell_centers().map(|c| c.to_vec()))
            }
            HashGrid::Spatial(grid) => {
                Box::new(grid.get_occupied_cell_centers().map(|c| c.to_vec()))
            }
        }
    }

    pub fn clear(&mut self) {
        with_grid!(self, grid => grid.clear())
    }
}
