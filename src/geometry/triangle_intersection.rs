// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Open triangle-triangle intersection test
//!
//! Implements Möller's "A Fast Triangle-Triangle Intersection Test" (1997) with
//! open-triangle semantics: triangles that only share a vertex, an edge, or touch
//! along a boundary are not considered to intersect. Faces of the same
//! tetrahedron must never register as colliding.

use nalgebra::{Point3, Vector3};

/// Tolerance for coplanarity, plane-side and barycentric checks
pub const TOLERANCE: f64 = 1e-12;

/// Plane in Hessian form: `normal · p + offset = 0` for points `p` on the plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    /// Plane through a triangle, oriented by its vertex order (right-hand rule).
    ///
    /// Returns `None` for degenerate (zero-area) triangles.
    pub fn from_triangle(tri: &[Point3<f64>; 3]) -> Option<Self> {
        let normal = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
        let length = normal.norm();
        if !length.is_finite() || length <= TOLERANCE {
            return None;
        }
        let normal = normal / length;
        Some(Self {
            normal,
            offset: -normal.dot(&tri[0].coords),
        })
    }

    /// Signed distance of a point to the plane, positive on the normal side
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }
}

/// Test two triangles for intersection given their planes.
///
/// `n1`/`d1` and `n2`/`d2` are the unit normal and offset of each triangle's plane.
pub fn intersects(
    t1: &[Point3<f64>; 3],
    n1: &Vector3<f64>,
    d1: f64,
    t2: &[Point3<f64>; 3],
    n2: &Vector3<f64>,
    d2: f64,
) -> bool {
    let dist1 = t1.map(|p| n2.dot(&p.coords) + d2);
    let dist2 = t2.map(|p| n1.dot(&p.coords) + d1);

    let near_zero = |d: &f64| d.abs() <= TOLERANCE;
    if dist1.iter().all(near_zero) && dist2.iter().all(near_zero) {
        return coplanar_overlap(t1, t2);
    }

    if one_sided(&dist1) || one_sided(&dist2) {
        return false;
    }

    let direction = n1.cross(n2);
    let interval1 = line_interval(t1, &dist1, &direction);
    let interval2 = line_interval(t2, &dist2, &direction);

    intervals_overlap(interval1, interval2)
}

/// Convenience wrapper computing both planes; degenerate triangles never intersect
pub fn triangles_intersect(t1: &[Point3<f64>; 3], t2: &[Point3<f64>; 3]) -> bool {
    match (Plane::from_triangle(t1), Plane::from_triangle(t2)) {
        (Some(p1), Some(p2)) => intersects(t1, &p1.normal, p1.offset, t2, &p2.normal, p2.offset),
        _ => false,
    }
}

/// Whether two open intervals overlap. Endpoints may be given in either order.
pub fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    let (start_a, end_a) = if a.0 <= a.1 { a } else { (a.1, a.0) };
    let (start_b, end_b) = if b.0 <= b.1 { b } else { (b.1, b.0) };

    start_a.max(start_b) < end_a.min(end_b)
}

/// Strict barycentric point-in-triangle test.
///
/// Assumes the point lies in the triangle's plane. Points on an edge or vertex,
/// and any point tested against a degenerate triangle, are reported as outside.
pub fn point_in_triangle(point: &Point3<f64>, tri: &[Point3<f64>; 3]) -> bool {
    let [a, b, c] = tri;
    let v0 = c - a;
    let v1 = b - a;
    let v2 = point - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < TOLERANCE {
        return false;
    }

    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;

    u > TOLERANCE && v > TOLERANCE && u + v < 1.0 - TOLERANCE
}

fn coplanar_overlap(t1: &[Point3<f64>; 3], t2: &[Point3<f64>; 3]) -> bool {
    t1.iter().any(|p| point_in_triangle(p, t2)) || t2.iter().any(|p| point_in_triangle(p, t1))
}

/// All vertices on one side of the other plane, counting contact as "same side"
fn one_sided(dist: &[f64; 3]) -> bool {
    dist.iter().all(|&d| d >= -TOLERANCE) || dist.iter().all(|&d| d <= TOLERANCE)
}

/// Interval covered by a triangle on the line `direction`, given the signed
/// distances of its vertices to the other triangle's plane.
///
/// The caller guarantees the triangle straddles the plane, so exactly one vertex
/// (the apex) is alone on its side.
fn line_interval(tri: &[Point3<f64>; 3], dist: &[f64; 3], direction: &Vector3<f64>) -> (f64, f64) {
    let non_negative: Vec<usize> = (0..3).filter(|&i| dist[i] >= 0.0).collect();
    let negative: Vec<usize> = (0..3).filter(|&i| dist[i] < 0.0).collect();

    let (pair, apex) = if non_negative.len() > negative.len() {
        ([non_negative[0], non_negative[1]], negative[0])
    } else {
        ([negative[0], negative[1]], non_negative[0])
    };

    let project = |i: usize| direction.dot(&tri[i].coords);
    let p_apex = project(apex);
    let d_apex = dist[apex];

    let endpoint = |i: usize| {
        let p = project(i);
        p + (p_apex - p) * (dist[i] / (dist[i] - d_apex))
    };

    (endpoint(pair[0]), endpoint(pair[1]))
}
