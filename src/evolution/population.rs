// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Individuals, population and parallel fitness evaluation

use nalgebra::Point3;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use super::fitness::FitnessFunction;
use crate::error::{GrammarResult, MeshResult};
use crate::grammar::{CrossoverStrategy, Grammar, Label, Operation};
use crate::mesh::TetraMesh;

/// A grammar and its fitness, `None` until evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub grammar: Grammar,
    pub fitness: Option<f64>,
}

impl Individual {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            fitness: None,
        }
    }

    /// Grow a fresh mesh from the grammar and score it
    pub fn evaluate(&self, settings: &Evaluation) -> MeshResult<f64> {
        let mut mesh = TetraMesh::new(&self.grammar, settings.check_collision)?;
        let stats = mesh.apply_rules(settings.iterations)?;
        if stats.exhausted > 0 {
            tracing::warn!(
                applied = stats.applied(),
                requested = settings.iterations,
                "production queue ran dry before the iteration count"
            );
        }
        Ok(settings.fitness.evaluate(&mesh, &settings.target))
    }
}

/// Shared, read-only settings for scoring individuals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub fitness: FitnessFunction,
    pub iterations: usize,
    pub check_collision: bool,
    pub target: Point3<f64>,
}

/// Individuals of the current generation
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub individuals: Vec<Individual>,
}

impl Population {
    /// `size` random grammars over `alphabet`
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        alphabet: &[Label],
        operations: &[Operation],
        rng: &mut R,
    ) -> GrammarResult<Self> {
        let individuals = (0..size)
            .map(|_| Grammar::random(alphabet.to_vec(), operations.to_vec(), rng).map(Individual::new))
            .collect::<GrammarResult<Vec<_>>>()?;
        Ok(Self { individuals })
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Score every unevaluated individual in parallel, one private mesh each
    pub fn evaluate(&mut self, settings: &Evaluation) -> MeshResult<()> {
        self.individuals
            .par_iter_mut()
            .filter(|individual| individual.fitness.is_none())
            .try_for_each(|individual| {
                individual.fitness = Some(individual.evaluate(settings)?);
                Ok(())
            })
    }

    /// Order best-first; unevaluated individuals go last
    pub fn sort(&mut self, fitness: FitnessFunction) {
        self.individuals.sort_by(|a, b| match (a.fitness, b.fitness) {
            (Some(x), Some(y)) => fitness.compare(x, y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// Keep the first `count` individuals, never fewer than one
    pub fn truncate(&mut self, count: usize) {
        self.individuals.truncate(count.max(1));
    }

    /// Refill to `size` with offspring of the current individuals.
    ///
    /// Parents are picked uniformly and deep-copied, crossed with probability
    /// `crossover_rate`, then each child has its rules regenerated with
    /// probability `mutation_rate`.
    pub fn breed<R: Rng + ?Sized>(
        &mut self,
        size: usize,
        breeding: &Breeding,
        rng: &mut R,
    ) -> GrammarResult<usize> {
        let parents = self.individuals.len();
        if parents == 0 {
            return Ok(0);
        }

        let mut born = 0;
        while self.individuals.len() < size {
            let (Some(a), Some(b)) = (
                self.individuals[..parents].choose(rng),
                self.individuals[..parents].choose(rng),
            ) else {
                break;
            };
            let mut first = a.grammar.clone();
            let mut second = b.grammar.clone();

            if rng.gen::<f64>() < breeding.crossover_rate {
                first.crossover(&mut second, breeding.crossover_strategy, rng)?;
            }

            for mut child in [first, second] {
                if self.individuals.len() >= size {
                    break;
                }
                child.regenerate_random(breeding.mutation_rate, rng)?;
                self.individuals.push(Individual::new(child));
                born += 1;
            }
        }
        Ok(born)
    }

    /// Best individual; only meaningful after [`Population::sort`]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Evaluated fitness values in population order
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.individuals.iter().filter_map(|i| i.fitness)
    }
}

/// Reproduction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breeding {
    pub crossover_rate: f64,
    pub crossover_strategy: CrossoverStrategy,
    pub mutation_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::DEFAULT_ALPHABET;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(fitness: FitnessFunction) -> Evaluation {
        Evaluation {
            fitness,
            iterations: 10,
            check_collision: true,
            target: Point3::new(25.0, 0.0, 25.0),
        }
    }

    #[test]
    fn test_population_creation() {
        let mut rng = StdRng::seed_from_u64(1);
        let population = Population::random(6, &DEFAULT_ALPHABET, &Operation::ALL, &mut rng).unwrap();

        assert_eq!(population.len(), 6);
        assert!(population.individuals.iter().all(|i| i.fitness.is_none()));
        assert!(population.individuals.iter().all(|i| i.grammar.is_total()));
    }

    #[test]
    fn test_evaluate_scores_everyone() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut population = Population::random(8, &DEFAULT_ALPHABET, &Operation::ALL, &mut rng).unwrap();

        population.evaluate(&settings(FitnessFunction::NumFaces)).unwrap();

        assert!(population.individuals.iter().all(|i| i.fitness.is_some()));
        assert!(population.scores().all(|f| f >= 4.0));
    }

    #[test]
    fn test_evaluate_skips_scored_individuals() {
        let mut population = Population {
            individuals: vec![Individual {
                grammar: Grammar::example(),
                fitness: Some(-1.0),
            }],
        };
        population.evaluate(&settings(FitnessFunction::HullVolume)).unwrap();
        assert_eq!(population.individuals[0].fitness, Some(-1.0));
    }

    #[test]
    fn test_sort_truncate_and_breed() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut population = Population::random(10, &DEFAULT_ALPHABET, &Operation::ALL, &mut rng).unwrap();
        for (i, individual) in population.individuals.iter_mut().enumerate() {
            individual.fitness = Some(i as f64);
        }

        population.sort(FitnessFunction::HullVolume);
        assert_eq!(population.best().unwrap().fitness, Some(9.0));

        population.truncate(3);
        let elites = population.individuals.clone();

        let breeding = Breeding {
            crossover_rate: 1.0,
            crossover_strategy: CrossoverStrategy::Two,
            mutation_rate: 0.2,
        };
        let born = population.breed(10, &breeding, &mut rng).unwrap();

        assert_eq!(born, 7);
        assert_eq!(population.len(), 10);
        assert_eq!(&population.individuals[..3], &elites[..]);
        assert!(population.individuals[3..].iter().all(|i| i.fitness.is_none()));
        assert!(population.individuals.iter().all(|i| i.grammar.is_total()));
    }

    #[test]
    fn test_truncate_keeps_one() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut population = Population::random(3, &DEFAULT_ALPHABET, &Operation::ALL, &mut rng).unwrap();
        population.truncate(0);
        assert_eq!(population.len(), 1);
    }
}
