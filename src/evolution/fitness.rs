// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fitness functions selectable by name

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mesh::TetraMesh;

/// Scalar score of a grown mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessFunction {
    /// Convex hull volume of all vertices
    #[default]
    HullVolume,
    /// Number of live faces
    NumFaces,
    /// Closest vertex distance to the target point (minimized)
    DistToPoint,
    /// Outward spread of face centroids scaled by face count
    OutThereScore,
}

impl FitnessFunction {
    pub const ALL: [FitnessFunction; 4] = [
        FitnessFunction::HullVolume,
        FitnessFunction::NumFaces,
        FitnessFunction::DistToPoint,
        FitnessFunction::OutThereScore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FitnessFunction::HullVolume => "hull_volume",
            FitnessFunction::NumFaces => "num_faces",
            FitnessFunction::DistToPoint => "dist_to_point",
            FitnessFunction::OutThereScore => "out_there_score",
        }
    }

    pub fn higher_is_better(self) -> bool {
        !matches!(self, FitnessFunction::DistToPoint)
    }

    /// Score a mesh; `target` is only read by [`FitnessFunction::DistToPoint`]
    pub fn evaluate(self, mesh: &TetraMesh<'_>, target: &Point3<f64>) -> f64 {
        match self {
            FitnessFunction::HullVolume => mesh.convex_hull_volume(),
            FitnessFunction::NumFaces => mesh.face_count() as f64,
            FitnessFunction::DistToPoint => mesh.distance_to_point(target),
            FitnessFunction::OutThereScore => mesh.outward_score(),
        }
    }

    /// Order two scores best-first
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        if self.higher_is_better() {
            b.total_cmp(&a)
        } else {
            a.total_cmp(&b)
        }
    }
}

impl fmt::Display for FitnessFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitnessFunction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hull_volume" | "hull" => Ok(FitnessFunction::HullVolume),
            "num_faces" | "faces" => Ok(FitnessFunction::NumFaces),
            "dist_to_point" | "distance" => Ok(FitnessFunction::DistToPoint),
            "out_there_score" | "outward_score" => Ok(FitnessFunction::OutThereScore),
            _ => Err(ConfigError::UnknownFitness(s.to_string())),
        }
    }
}
