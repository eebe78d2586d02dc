// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Evolution run configuration

use anyhow::{Context, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::fitness::FitnessFunction;
use crate::error::ConfigError;
use crate::grammar::{CrossoverStrategy, Label, Operation, DEFAULT_ALPHABET};

/// Default config file picked up by [`EvolutionConfig::load`]
pub const CONFIG_FILE: &str = "tetragen.toml";

/// Evolution run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of generations to evolve
    pub generations: usize,
    /// Individuals per generation
    pub population_size: usize,
    /// Individuals kept unchanged between generations
    pub num_elites: usize,
    /// Per-rule probability of regenerating a child's rule
    pub mutation_rate: f64,
    /// Probability that two parents are crossed
    pub crossover_rate: f64,
    pub crossover_strategy: CrossoverStrategy,
    /// Rules applied to each mesh before scoring
    pub iters_per_run: usize,
    /// Reject growth that would self-intersect
    pub check_collision: bool,
    pub alphabet: Vec<Label>,
    pub operations: Vec<Operation>,
    pub fitness_function: FitnessFunction,
    /// Target for `dist_to_point`
    pub point: [f64; 3],
    /// Write a CSV of every individual for each generation
    pub export_generations: bool,
    /// Write an STL of each generation's best mesh
    pub export_stl: bool,
    /// Root directory for run output; nothing is written when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    /// Run directory name under `data_path`; a timestamp when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
    /// RNG seed; drawn from entropy when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            population_size: 10,
            num_elites: 5,
            mutation_rate: 0.2,
            crossover_rate: 0.5,
            crossover_strategy: CrossoverStrategy::Two,
            iters_per_run: 50,
            check_collision: true,
            alphabet: DEFAULT_ALPHABET.to_vec(),
            operations: Operation::ALL.to_vec(),
            fitness_function: FitnessFunction::HullVolume,
            point: [25.0, 0.0, 25.0],
            export_generations: true,
            export_stl: true,
            data_path: Some(PathBuf::from("runs")),
            run_name: None,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EvolutionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `tetragen.toml` if present, then apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(generations) = std::env::var("TETRAGEN_GENERATIONS") {
            config.generations = generations
                .parse()
                .context("TETRAGEN_GENERATIONS must be a count")?;
        }

        if let Ok(size) = std::env::var("TETRAGEN_POPULATION_SIZE") {
            config.population_size = size
                .parse()
                .context("TETRAGEN_POPULATION_SIZE must be a count")?;
        }

        if let Ok(fitness) = std::env::var("TETRAGEN_FITNESS") {
            config.fitness_function = fitness.parse()?;
        }

        if let Ok(seed) = std::env::var("TETRAGEN_SEED") {
            config.seed = seed.parse().ok();
        }

        if let Ok(collision) = std::env::var("TETRAGEN_CHECK_COLLISION") {
            config.check_collision = collision.parse().unwrap_or(config.check_collision);
        }

        if let Ok(data_path) = std::env::var("TETRAGEN_DATA_PATH") {
            config.data_path = Some(PathBuf::from(data_path));
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Reject settings the driver cannot run with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::Invalid("population_size must be at least 1".into()));
        }
        if self.num_elites == 0 || self.num_elites > self.population_size {
            return Err(ConfigError::Invalid(format!(
                "num_elites must be between 1 and population_size ({}), got {}",
                self.population_size, self.num_elites
            )));
        }
        for (name, rate) in [("mutation_rate", self.mutation_rate), ("crossover_rate", self.crossover_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!("{} must be in [0, 1], got {}", name, rate)));
            }
        }
        if self.operations.is_empty() {
            return Err(ConfigError::Invalid("at least one operation must be enabled".into()));
        }

        if let Some(label) = self.alphabet.iter().find(|c| **c == ',' || c.is_whitespace()) {
            return Err(ConfigError::Invalid(format!(
                "alphabet label {:?} cannot be stored in grammar files",
                label
            )));
        }
        let mut labels = self.alphabet.clone();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != self.alphabet.len() {
            return Err(ConfigError::Invalid("alphabet labels must be distinct".into()));
        }
        let required = self
            .operations
            .iter()
            .map(|op| op.arity())
            .max()
            .unwrap_or(0)
            .max(4);
        if self.alphabet.len() < required {
            return Err(ConfigError::Invalid(format!(
                "alphabet needs at least {} labels for the seed and enabled operations, got {}",
                required,
                self.alphabet.len()
            )));
        }

        if !self.point.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid("point must have finite coordinates".into()));
        }
        Ok(())
    }

    /// Target point for `dist_to_point`
    pub fn target(&self) -> Point3<f64> {
        Point3::from(self.point)
    }

    /// Whether the run writes anything to disk
    pub fn persists(&self) -> bool {
        self.data_path.is_some()
    }
}
