// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Crossover strategies between two grammars

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rules::Grammar;
use crate::error::{GrammarError, GrammarResult};

/// How two parent grammars exchange rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverStrategy {
    /// Swap the rule suffixes after a single pivot
    One,
    /// Swap the rule segment between two pivots
    #[default]
    Two,
    /// Swap each rule independently with probability 0.5
    Uniform,
}

impl CrossoverStrategy {
    pub fn name(self) -> &'static str {
        match self {
            CrossoverStrategy::One => "one",
            CrossoverStrategy::Two => "two",
            CrossoverStrategy::Uniform => "uniform",
        }
    }
}

impl fmt::Display for CrossoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrossoverStrategy {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one" | "one_point" => Ok(CrossoverStrategy::One),
            "two" | "two_point" => Ok(CrossoverStrategy::Two),
            "uniform" => Ok(CrossoverStrategy::Uniform),
            _ => Err(GrammarError::UnknownCrossover(s.to_string())),
        }
    }
}

impl Grammar {
    /// Cross this grammar with `other` in place using `strategy`
    pub fn crossover<R: Rng + ?Sized>(
        &mut self,
        other: &mut Grammar,
        strategy: CrossoverStrategy,
        rng: &mut R,
    ) -> GrammarResult<()> {
        match strategy {
            CrossoverStrategy::One => self.one_point_crossover(other, rng),
            CrossoverStrategy::Two => self.two_point_crossover(other, rng),
            CrossoverStrategy::Uniform => self.uniform_crossover(other, rng),
        }
    }

    /// Swap the rules from a pivot in `[0, len - 1)` to the end
    pub fn one_point_crossover<R: Rng + ?Sized>(
        &mut self,
        other: &mut Grammar,
        rng: &mut R,
    ) -> GrammarResult<()> {
        self.check_compatible(other)?;
        let len = self.rules.len();
        if len < 2 {
            return Ok(());
        }

        let pivot = rng.gen_range(0..len - 1);
        self.rules[pivot..].swap_with_slice(&mut other.rules[pivot..]);
        Ok(())
    }

    /// Swap the rules in `[p1, p2)` with `p1` in `[0, len - 2]` and `p2` in `[p1, len - 1]`
    pub fn two_point_crossover<R: Rng + ?Sized>(
        &mut self,
        other: &mut Grammar,
        rng: &mut R,
    ) -> GrammarResult<()> {
        self.check_compatible(other)?;
        let len = self.rules.len();
        if len < 2 {
            return Ok(());
        }

        let start = rng.gen_range(0..=len - 2);
        let end = rng.gen_range(start..=len - 1);
        self.rules[start..end].swap_with_slice(&mut other.rules[start..end]);
        Ok(())
    }

    /// Swap each rule with probability 0.5
    pub fn uniform_crossover<R: Rng + ?Sized>(
        &mut self,
        other: &mut Grammar,
        rng: &mut R,
    ) -> GrammarResult<()> {
        self.check_compatible(other)?;

        for (mine, theirs) in self.rules.iter_mut().zip(other.rules.iter_mut()) {
            if rng.gen::<f64>() < 0.5 {
                std::mem::swap(&mut mine.1, &mut theirs.1);
            }
        }
        Ok(())
    }

    /// Both grammars must share alphabet, operation set and rule layout
    fn check_compatible(&self, other: &Grammar) -> GrammarResult<()> {
        if self.alphabet() != other.alphabet() {
            return Err(GrammarError::Incompatible("different alphabets"));
        }
        if self.operations() != other.operations() {
            return Err(GrammarError::Incompatible("different operation sets"));
        }
        if self.rules.len() != other.rules.len() {
            return Err(GrammarError::Incompatible("different numbers of rules"));
        }
        if self
            .rules
            .iter()
            .zip(&other.rules)
            .any(|((a, _), (b, _))| a != b)
        {
            return Err(GrammarError::Incompatible("different rule orders"));
        }
        Ok(())
    }
}
