// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Generational evolution loop
//!
//! Each generation is evaluated in parallel, sorted best-first, persisted,
//! truncated to its elites and refilled with mutated offspring. All randomness
//! comes from one seeded [`StdRng`], so a seed reproduces a run exactly.

use anyhow::{Context, Result};
use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

use super::config::EvolutionConfig;
use super::metadata::RunMetadata;
use super::population::{Breeding, Evaluation, Individual, Population};
use crate::grammar::Grammar;
use crate::io::{self, records};
use crate::mesh::TetraMesh;

/// Summary of one evaluated generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
    pub worst: f64,
    pub best_grammar: Grammar,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub best: Individual,
    pub history: Vec<GenerationStats>,
    pub seed: u64,
    pub run_dir: Option<PathBuf>,
}

/// A configured evolution run
pub struct EvolutionRun {
    config: EvolutionConfig,
    seed: u64,
    rng: StdRng,
    population: Population,
    generation: usize,
    history: Vec<GenerationStats>,
    run_dir: Option<PathBuf>,
}

impl EvolutionRun {
    /// Validate the config, seed the RNG and create the initial random population.
    ///
    /// With a `data_path`, the run directory and `metadata.json` are created here.
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        let population = Population::random(
            config.population_size,
            &config.alphabet,
            &config.operations,
            &mut rng,
        )
        .context("Failed to create the initial population")?;

        let run_dir = match &config.data_path {
            Some(data_path) => {
                let name = config
                    .run_name
                    .clone()
                    .unwrap_or_else(|| Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
                let dir = data_path.join(&name);
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create run directory: {:?}", dir))?;
                RunMetadata::new(name, seed, &config).save(&dir)?;
                Some(dir)
            }
            None => None,
        };

        tracing::info!(
            seed,
            population = config.population_size,
            generations = config.generations,
            fitness = %config.fitness_function,
            "starting evolution run"
        );

        Ok(Self {
            config,
            seed,
            rng,
            population,
            generation: 0,
            history: Vec::new(),
            run_dir,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation {
            fitness: self.config.fitness_function,
            iterations: self.config.iters_per_run,
            check_collision: self.config.check_collision,
            target: self.config.target(),
        }
    }

    /// Evaluate any new individuals and sort best-first
    fn evaluate(&mut self) -> Result<()> {
        let evaluation = self.evaluation();
        self.population
            .evaluate(&evaluation)
            .context("Failed to evaluate population")?;
        self.population.sort(self.config.fitness_function);
        Ok(())
    }

    /// Run one generation and return its statistics
    pub fn step(&mut self) -> Result<GenerationStats> {
        self.evaluate()?;
        let stats = self.statistics()?;
        self.persist(&stats)?;

        tracing::info!(
            generation = stats.generation,
            best = stats.best,
            mean = stats.mean,
            worst = stats.worst,
            "generation evaluated"
        );

        self.population.truncate(self.config.num_elites);
        let breeding = Breeding {
            crossover_rate: self.config.crossover_rate,
            crossover_strategy: self.config.crossover_strategy,
            mutation_rate: self.config.mutation_rate,
        };
        let born = self
            .population
            .breed(self.config.population_size, &breeding, &mut self.rng)
            .context("Failed to breed the next generation")?;
        tracing::debug!(born, elites = self.config.num_elites, "population refilled");

        self.history.push(stats.clone());
        self.generation += 1;
        Ok(stats)
    }

    /// Run every remaining generation, then score the final population
    pub fn run(mut self) -> Result<RunSummary> {
        while self.generation < self.config.generations {
            self.step()?;
        }
        self.finish()
    }

    /// Score the final population and summarize the run
    pub fn finish(mut self) -> Result<RunSummary> {
        self.evaluate()?;
        let best = self
            .population
            .best()
            .cloned()
            .context("Population is empty")?;

        if let Some(dir) = &self.run_dir {
            tracing::info!(dir = %dir.display(), "run written");
        }

        Ok(RunSummary {
            best,
            history: self.history,
            seed: self.seed,
            run_dir: self.run_dir,
        })
    }

    fn statistics(&self) -> Result<GenerationStats> {
        let best = self.population.best().context("Population is empty")?;
        let scores: Vec<f64> = self.population.scores().collect();
        let worst = scores.last().copied().unwrap_or(f64::NAN);

        Ok(GenerationStats {
            generation: self.generation,
            best: best.fitness.unwrap_or(f64::NAN),
            mean: scores.iter().sum::<f64>() / scores.len().max(1) as f64,
            worst,
            best_grammar: best.grammar.clone(),
        })
    }

    fn persist(&self, stats: &GenerationStats) -> Result<()> {
        let Some(dir) = &self.run_dir else {
            return Ok(());
        };

        records::append_generation(
            dir.join(records::GENERATIONS_FILE),
            stats.generation,
            stats.best,
            &stats.best_grammar,
        )?;

        if self.config.export_generations {
            records::write_population(
                dir.join(records::generation_file(stats.generation)),
                self.population
                    .individuals
                    .iter()
                    .map(|i| (i.fitness.unwrap_or(f64::NAN), &i.grammar)),
            )?;
        }

        if self.config.export_stl {
            let mut mesh = TetraMesh::new(&stats.best_grammar, self.config.check_collision)?;
            mesh.apply_rules(self.config.iters_per_run)?;
            io::export_stl(&mesh, dir.join(format!("generation_{}.stl", stats.generation)))?;
        }
        Ok(())
    }
}
