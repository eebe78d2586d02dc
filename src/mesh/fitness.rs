// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Read-only measurements used as fitness signals

use nalgebra::Point3;

use super::tetra_mesh::TetraMesh;
use crate::geometry::{self, BoundingBox};

impl<'g> TetraMesh<'g> {
    /// Volume of the convex hull of all vertices; 0 for flat or tiny point sets
    pub fn convex_hull_volume(&self) -> f64 {
        geometry::convex_hull_volume(&self.vertices)
    }

    /// Smallest distance from any vertex to `point`
    pub fn distance_to_point(&self, point: &Point3<f64>) -> f64 {
        self.vertices
            .iter()
            .map(|vertex| nalgebra::distance(vertex, point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Sum of squared centroid distances from the origin, times the face count
    pub fn outward_score(&self) -> f64 {
        let spread: f64 = self
            .faces()
            .map(|(_, face)| face.centroid(&self.vertices).coords.norm_squared())
            .sum();
        spread * self.face_count() as f64
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }
}
