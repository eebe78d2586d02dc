// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh engine - labeled faces, production queue, growth operations and fitness queries

mod face;
mod fitness;
mod growth;
mod tetra_mesh;

pub use face::{Face, FaceId};
pub use growth::{BlockReason, GrowOutcome, SEPARATION_TOLERANCE};
pub use tetra_mesh::{GrowthStats, RuleOutcome, TetraMesh};
