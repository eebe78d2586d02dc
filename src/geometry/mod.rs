// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - intersection kernel, bounding boxes and hull volume

mod bbox;
mod hull;
pub mod triangle_intersection;

pub use bbox::BoundingBox;
pub use hull::convex_hull_volume;
pub use triangle_intersection::{intersects, triangles_intersect, Plane, TOLERANCE};
