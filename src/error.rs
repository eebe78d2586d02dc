// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the grammar, mesh engine and run configuration

use thiserror::Error;

use crate::grammar::Label;

/// Errors raised while building, mutating or crossing grammars
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("unknown grammar operation '{0}'")]
    UnknownOperation(String),

    #[error("operation {operation} expects {expected} rhs labels, got {actual}")]
    ArityMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unknown crossover strategy '{0}' (expected one, two or uniform)")]
    UnknownCrossover(String),

    #[error("tried to cross grammars with {0}")]
    Incompatible(&'static str),

    #[error("alphabet of {available} labels cannot supply {required} distinct rhs labels")]
    AlphabetTooSmall { available: usize, required: usize },

    #[error("grammar has no enabled operations")]
    NoOperations,

    #[error("label '{0}' is not part of the alphabet")]
    UnknownLabel(Label),

    #[error("malformed grammar record: {0}")]
    MalformedRecord(String),
}

/// Errors raised by the mesh engine
///
/// These indicate a malformed grammar or an engine bug and are never swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("grammar has no rule for label '{0}'")]
    MissingRule(Label),

    #[error("face {0} was removed by a divide and cannot be used")]
    RemovedFace(usize),

    #[error("face {index} out of bounds for mesh with {len} faces")]
    FaceOutOfRange { index: usize, len: usize },

    #[error("vertex {index} out of bounds for mesh with {len} vertices")]
    VertexOutOfRange { index: usize, len: usize },

    #[error("seed tetrahedron needs 4 labels but the alphabet has {0}")]
    SeedAlphabet(usize),
}

/// Errors raised while reading or validating a run configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown fitness function '{0}' (expected hull_volume, num_faces, dist_to_point or out_there_score)")]
    UnknownFitness(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type GrammarResult<T> = std::result::Result<T, GrammarError>;
pub type MeshResult<T> = std::result::Result<T, MeshError>;
