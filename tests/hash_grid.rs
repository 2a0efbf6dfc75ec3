// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Spatial hash grid behavior through the runtime-dimension interface

use anyhow::Result;
use polyframe_geoindex::index::HashGrid;
use polyframe_geoindex::MeshError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_planar_point_queries() -> Result<()> {
    let mut grid = HashGrid::create(1.0, 2)?;
    grid.insert(0, &[0.5, 0.5])?;
    grid.insert(1, &[1.5, 0.5])?;
    grid.insert(2, &[5.5, 5.5])?;

    assert_eq!(grid.get_items_in_cell(&[0.1, 0.9])?, vec![0]);
    assert_eq!(grid.get_items_near_point(&[0.2, 0.2])?, vec![0, 1]);
    assert_eq!(grid.get_items_near_point(&[3.5, 3.5])?, Vec::<usize>::new());
    assert_eq!(grid.get_items_within(&[0.2, 0.2], 6.0)?, vec![0, 1, 2]);
    assert_eq!(grid.size(), 3);
    assert_eq!(grid.bucket_count(), 3);
    Ok(())
}

#[test]
fn test_wrong_dimension_is_rejected() -> Result<()> {
    let mut grid = HashGrid::create(0.5, 3)?;
    assert!(matches!(
        grid.insert(0, &[1.0, 2.0]),
        Err(MeshError::InvalidDimension { found: 2, .. })
    ));
    assert!(matches!(
        HashGrid::create(1.0, 4),
        Err(MeshError::InvalidDimension { found: 4, .. })
    ));
    assert!(grid.is_empty());
    Ok(())
}

#[test]
fn test_bulk_insert_is_all_or_nothing() -> Result<()> {
    let mut grid = HashGrid::create(1.0, 3)?;
    let points = [0.0, 0.0, 0.0, 1.0, 1.0, f64::NAN];
    assert!(matches!(
        grid.insert_multiple(&[0, 1], &points),
        Err(MeshError::MalformedInput(_))
    ));
    assert!(grid.is_empty());

    let triangles = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0,
    ];
    assert!(matches!(
        grid.insert_multiple_triangles(&[0, 1], &triangles),
        Err(MeshError::DegenerateGeometry(_))
    ));
    assert!(grid.is_empty());
    Ok(())
}

#[test]
fn test_triangle_covers_its_cells() -> Result<()> {
    let mut grid = HashGrid::create(1.0, 3)?;
    grid.insert_triangle(7, &[0.1, 0.1, 0.1], &[2.9, 0.1, 0.1], &[0.1, 2.9, 0.1])?;
    assert_eq!(grid.get_items_in_cell(&[2.5, 0.5, 0.5])?, vec![7]);
    assert_eq!(grid.get_items_in_cell(&[0.5, 2.5, 0.5])?, vec![7]);
    assert!(grid.occupied(&[0, 0, 0])?);
    assert!(!grid.occupied(&[0, 0, 5])?);
    Ok(())
}

#[test]
fn test_cell_centers_and_removal() -> Result<()> {
    let mut grid = HashGrid::create(2.0, 2)?;
    grid.insert_batch(3, &[0.5, 0.5, 2.5, 0.5, -0.5, 0.5])?;
    assert_eq!(grid.size(), 3);

    let mut centers: Vec<Vec<f64>> = grid.get_occupied_cell_centers().collect();
    centers.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(centers, vec![vec![-1.0, 1.0], vec![1.0, 1.0], vec![3.0, 1.0]]);

    assert!(grid.remove(3));
    assert!(!grid.remove(3));
    assert!(grid.is_empty());
    assert_eq!(grid.bucket_count(), 0);
    Ok(())
}

#[test]
fn test_near_point_finds_every_close_item() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let cell = 0.25;
    let mut grid = HashGrid::create(cell, 3)?;
    let points: Vec<[f64; 3]> = (0..500)
        .map(|_| [rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)])
        .collect();
    for (id, p) in points.iter().enumerate() {
        grid.insert(id, p)?;
    }

    for _ in 0..50 {
        let q = [rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)];
        let candidates = grid.get_items_near_point(&q)?;
        for (id, p) in points.iter().enumerate() {
            let d2: f64 = p.iter().zip(&q).map(|(a, b)| (a - b) * (a - b)).sum();
            if d2 < cell * cell {
                assert!(candidates.binary_search(&id).is_ok(), "missed item {}", id);
            }
        }
    }
    Ok(())
}
