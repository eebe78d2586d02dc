// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Convex hull volume using parry3d

use nalgebra::Point3;
use parry3d::math::Point as ParryPoint;
use parry3d::transformation::try_convex_hull;

/// Volume of the convex hull of a point set.
///
/// Fewer than four points, flat point sets and hulls parry cannot build all
/// yield `0.0`.
pub fn convex_hull_volume(points: &[Point3<f64>]) -> f64 {
    if points.len() < 4 || spans_no_volume(points) {
        return 0.0;
    }

    let parry_points: Vec<ParryPoint<f32>> = points
        .iter()
        .map(|p| ParryPoint::new(p.x as f32, p.y as f32, p.z as f32))
        .collect();

    let (hull_points, hull_indices) = match try_convex_hull(&parry_points) {
        Ok(hull) => hull,
        Err(err) => {
            tracing::debug!(?err, points = points.len(), "convex hull failed, treating as flat");
            return 0.0;
        }
    };

    let corner = |i: u32| {
        let p = &hull_points[i as usize];
        Point3::new(p.x as f64, p.y as f64, p.z as f64)
    };

    // Sum of signed tetrahedra against the origin
    let signed: f64 = hull_indices
        .iter()
        .map(|tri| {
            let (a, b, c) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));
            a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
        })
        .sum();

    let volume = signed.abs();
    if volume.is_finite() {
        volume
    } else {
        0.0
    }
}

/// Collinear or coplanar point sets (within a scale-relative epsilon).
///
/// Grows an initial simplex greedily: farthest point from the first, farthest
/// from that line, farthest from that plane.
fn spans_no_volume(points: &[Point3<f64>]) -> bool {
    const EPS: f64 = 1e-9;
    let origin = points[0];

    let (far, extent) = farthest_by(points, |p| (p - origin).norm());
    if !extent.is_finite() || extent <= EPS {
        return true;
    }
    let axis = (far - origin) / extent;

    let (side, area) = farthest_by(points, |p| axis.cross(&(p - origin)).norm());
    if area <= EPS * extent {
        return true;
    }
    let normal = axis.cross(&(side - origin)).normalize();

    let (_, height) = farthest_by(points, |p| normal.dot(&(p - origin)).abs());
    height <= EPS * extent
}

fn farthest_by(points: &[Point3<f64>], metric: impl Fn(&Point3<f64>) -> f64) -> (Point3<f64>, f64) {
    points
        .iter()
        .map(|p| (*p, metric(p)))
        .fold((points[0], 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
}
