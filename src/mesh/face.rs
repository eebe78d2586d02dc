// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Labeled faces and their stable handles

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::TOLERANCE;
use crate::grammar::Label;

/// Stable handle of a face in the mesh's face arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub usize);

impl FaceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Triangle defined by three vertex indices plus a grammar label.
///
/// Vertex order fixes the outward normal (right-hand rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub(super) label: Label,
    pub(super) vertices: [usize; 3],
    pub(super) removed: bool,
}

impl Face {
    pub fn new(label: Label, vertices: [usize; 3]) -> Self {
        Self {
            label,
            vertices,
            removed: false,
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn vertices(&self) -> [usize; 3] {
        self.vertices
    }

    /// Removed by a divide; the slot is kept so queued handles stay valid
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn positions(&self, vertices: &[Point3<f64>]) -> [Point3<f64>; 3] {
        self.vertices.map(|i| vertices[i])
    }

    /// Edge lengths `|v1 - v0|`, `|v2 - v1|`, `|v2 - v0|`
    pub fn edge_lengths(&self, vertices: &[Point3<f64>]) -> [f64; 3] {
        let [v0, v1, v2] = self.positions(vertices);
        [(v1 - v0).norm(), (v2 - v1).norm(), (v2 - v0).norm()]
    }

    pub fn centroid(&self, vertices: &[Point3<f64>]) -> Point3<f64> {
        let [v0, v1, v2] = self.positions(vertices);
        Point3::from((v0.coords + v1.coords + v2.coords) / 3.0)
    }

    /// Unit outward normal, `None` for a zero-area face
    pub fn unit_normal(&self, vertices: &[Point3<f64>]) -> Option<Vector3<f64>> {
        let [v0, v1, v2] = self.positions(vertices);
        let normal = (v1 - v0).cross(&(v2 - v0));
        let length = normal.norm();
        (length.is_finite() && length > TOLERANCE).then(|| normal / length)
    }
}
