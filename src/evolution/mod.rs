// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evolution driver - configuration, fitness selection, population and the generational loop

mod config;
mod driver;
mod fitness;
mod metadata;
mod population;

pub use config::{EvolutionConfig, CONFIG_FILE};
pub use driver::{EvolutionRun, GenerationStats, RunSummary};
pub use fitness::FitnessFunction;
pub use metadata::{RunMetadata, METADATA_FILE};
pub use population::{Breeding, Evaluation, Individual, Population};
