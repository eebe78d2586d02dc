// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tetragen
//!
//! Grammar-driven growth of tetrahedral meshes, evolved with a genetic algorithm.
//! A grammar maps face labels to relabel, grow or divide rules; the mesh engine
//! applies them in queue order with an open triangle-triangle collision guard,
//! and the evolution driver selects grammars by the shape they grow.

pub mod cli;
pub mod error;
pub mod evolution;
pub mod geometry;
pub mod grammar;
pub mod io;
pub mod mesh;

pub use error::{ConfigError, GrammarError, MeshError};
pub use evolution::{EvolutionConfig, EvolutionRun, FitnessFunction, RunSummary};
pub use grammar::{CrossoverStrategy, Grammar, GrammarRecord, Label, Operation, Production};
pub use mesh::{FaceId, GrowthStats, RuleOutcome, TetraMesh};

use anyhow::Result;

/// Crate version, recorded in run metadata and exported files
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Grow a mesh from the seed tetrahedron by applying `iterations` rules
pub fn grow(grammar: &Grammar, iterations: usize, check_collision: bool) -> Result<TetraMesh<'_>> {
    let mut mesh = TetraMesh::new(grammar, check_collision)?;
    mesh.apply_rules(iterations)?;
    Ok(mesh)
}

/// Run a complete evolution
pub fn evolve(config: EvolutionConfig) -> Result<RunSummary> {
    EvolutionRun::new(config)?.run()
}
