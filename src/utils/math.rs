// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Lift a 2D or 3D coordinate slice into 3D (z = 0 for planar input)
pub fn lift(coords: &[f64]) -> Point3<f64> {
    Point3::new(
        coords.first().copied().unwrap_or(0.0),
        coords.get(1).copied().unwrap_or(0.0),
        coords.get(2).copied().unwrap_or(0.0),
    )
}

/// Unnormalized triangle normal; its length is twice the triangle area
pub fn triangle_cross(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    (p1 - p0).cross(&(p2 - p0))
}

/// Interior angle at `corner` between the rays to `a` and `b`
pub fn corner_angle(corner: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let u = a - corner;
    let v = b - corner;
    // atan2 stays accurate near 0 and pi where acos does not
    u.cross(&v).norm().atan2(u.dot(&v))
}

/// Cotangent of the angle at `corner`
pub fn cotangent(corner: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let u = a - corner;
    let v = b - corner;
    u.dot(&v) / u.cross(&v).norm()
}

/// Signed volume of a tetrahedron; positive when `p3` lies on the side
/// `(p1 - p0) x (p2 - p0)` points to
pub fn tet_signed_volume(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> f64 {
    (p1 - p0).dot(&(p2 - p0).cross(&(p3 - p0))) / 6.0
}

/// Circumcenter of a triangle in 3D, `None` when collinear
pub fn triangle_circumcenter(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<Point3<f64>> {
    let u = p1 - p0;
    let v = p2 - p0;
    let w = u.cross(&v);
    let denom = 2.0 * w.norm_squared();
    if denom == 0.0 {
        return None;
    }
    let offset = (u.norm_squared() * v - v.norm_squared() * u).cross(&w) / denom;
    Some(p0 + offset)
}

/// Circumcenter of a tetrahedron, `None` when flat
pub fn tet_circumcenter(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> Option<Point3<f64>> {
    let a = p1 - p0;
    let b = p2 - p0;
    let c = p3 - p0;
    let denom = 2.0 * a.dot(&b.cross(&c));
    if denom == 0.0 {
        return None;
    }
    let offset = (a.norm_squared() * b.cross(&c)
        + b.norm_squared() * c.cross(&a)
        + c.norm_squared() * a.cross(&b))
        / denom;
    Some(p0 + offset)
}
