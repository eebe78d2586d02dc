// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grammar persistence and crossover through the public API

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tetragen::grammar::DEFAULT_ALPHABET;
use tetragen::io::{self, records};
use tetragen::{CrossoverStrategy, Grammar, GrammarError, Operation};

fn random_grammars(count: usize, seed: u64) -> Result<Vec<Grammar>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let grammars = (0..count)
        .map(|_| Grammar::random(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &mut rng))
        .collect::<Result<Vec<_>, GrammarError>>()?;
    Ok(grammars)
}

#[test]
fn test_population_csv_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join(records::generation_file(4));
    let grammars = random_grammars(8, 31)?;

    io::write_population(
        &path,
        grammars.iter().enumerate().map(|(i, g)| (i as f64 * 0.5, g)),
    )?;

    let rows = io::read_grammar_rows(&path)?;
    assert_eq!(rows.len(), grammars.len());
    for (i, (row, grammar)) in rows.iter().zip(&grammars).enumerate() {
        assert_eq!(row.key, i);
        assert_eq!(row.fitness, i as f64 * 0.5);
        let decoded = Grammar::from_record(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &row.record)?;
        assert_eq!(&decoded, grammar);
    }
    Ok(())
}

#[test]
fn test_population_csv_header() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("population.csv");
    let grammar = Grammar::example();

    io::write_population(&path, [(1.0, &grammar)])?;

    let text = std::fs::read_to_string(&path)?;
    let mut lines = text.lines();
    assert!(lines
        .next()
        .unwrap_or_default()
        .starts_with("id,fitness,num_rules,lhs0,operation0,rhs0,lhs1"));
    assert!(lines.next().unwrap_or_default().starts_with("0,1,7,A,grow,DBF"));
    Ok(())
}

#[test]
fn test_crossover_keeps_rule_counts() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(12);
    let strategies = [CrossoverStrategy::One, CrossoverStrategy::Two, CrossoverStrategy::Uniform];

    for strategy in strategies {
        for pair in random_grammars(10, 40)?.chunks_exact(2) {
            let (mut a, mut b) = (pair[0].clone(), pair[1].clone());
            a.crossover(&mut b, strategy, &mut rng)?;

            assert_eq!(a.len(), pair[0].len());
            assert_eq!(b.len(), pair[1].len());
            for (i, label) in DEFAULT_ALPHABET.iter().enumerate() {
                assert_eq!(a.rules()[i].0, *label);
                assert_eq!(b.rules()[i].0, *label);
            }
        }
    }
    Ok(())
}

#[test]
fn test_seeded_generation_is_deterministic() -> Result<()> {
    assert_eq!(random_grammars(5, 7)?, random_grammars(5, 7)?);
    assert_ne!(random_grammars(5, 7)?, random_grammars(5, 8)?);
    Ok(())
}
