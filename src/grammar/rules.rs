// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grammar: a total mapping from face label to production rule

use std::fmt;

use rand::Rng;

use super::production::{Label, Operation, Production};
use crate::error::{GrammarError, GrammarResult};

/// Labels used when no alphabet is configured
pub const DEFAULT_ALPHABET: [Label; 7] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

/// A set of production rules over a fixed alphabet.
///
/// Rules are kept in insertion order; crossover operates on that order. `Clone`
/// is a deep copy, so cloned grammars never share rule storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    alphabet: Vec<Label>,
    operations: Vec<Operation>,
    pub(super) rules: Vec<(Label, Production)>,
}

impl Grammar {
    /// Create an empty grammar
    pub fn new(alphabet: Vec<Label>, operations: Vec<Operation>) -> Self {
        Self {
            alphabet,
            operations,
            rules: Vec::new(),
        }
    }

    /// Empty grammar over `A`..`G` with every operation enabled
    pub fn with_default_alphabet() -> Self {
        Self::new(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec())
    }

    /// Fresh random grammar with one rule per alphabet label
    pub fn random<R: Rng + ?Sized>(
        alphabet: Vec<Label>,
        operations: Vec<Operation>,
        rng: &mut R,
    ) -> GrammarResult<Self> {
        let mut grammar = Self::new(alphabet, operations);
        grammar.generate_random(rng)?;
        Ok(grammar)
    }

    /// Hand-written seven-rule grammar that grows a branching structure
    pub fn example() -> Self {
        let mut grammar = Self::with_default_alphabet();
        grammar.rules = vec![
            ('A', Production::Grow(['D', 'B', 'F'])),
            ('B', Production::Grow(['A', 'D', 'F'])),
            ('C', Production::Grow(['E', 'D', 'F'])),
            ('D', Production::Relabel('D')),
            ('E', Production::Grow(['D', 'C', 'F'])),
            ('F', Production::Divide(['D', 'D', 'D', 'G'])),
            ('G', Production::Grow(['D', 'D', 'G'])),
        ];
        grammar
    }

    /// Build a grammar from a compact rule list such as `"A:grow:DBF, D:relabel:D"`
    pub fn parse_rules(
        alphabet: Vec<Label>,
        operations: Vec<Operation>,
        rules: &str,
    ) -> GrammarResult<Self> {
        let mut grammar = Self::new(alphabet, operations);

        for entry in rules
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|e| !e.is_empty())
        {
            let parts: Vec<&str> = entry.split(':').collect();
            let [lhs, operation, rhs] = parts.as_slice() else {
                return Err(GrammarError::MalformedRecord(format!(
                    "expected lhs:operation:rhs, got '{}'",
                    entry
                )));
            };
            let lhs = single_label(lhs)?;
            grammar.add_rule(lhs, Production::parse(operation, rhs)?)?;
        }

        Ok(grammar)
    }

    pub fn alphabet(&self) -> &[Label] {
        &self.alphabet
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Add a rule, overwriting any existing rule for `lhs` in place.
    ///
    /// All labels must belong to the alphabet.
    pub fn add_rule(&mut self, lhs: Label, production: Production) -> GrammarResult<()> {
        for label in std::iter::once(&lhs).chain(production.rhs()) {
            if !self.alphabet.contains(label) {
                return Err(GrammarError::UnknownLabel(*label));
            }
        }

        match self.rules.iter_mut().find(|(l, _)| *l == lhs) {
            Some((_, existing)) => *existing = production,
            None => self.rules.push((lhs, production)),
        }
        Ok(())
    }

    /// Add a rule from its operation name and rhs labels
    pub fn add_rule_parts(&mut self, lhs: Label, operation: &str, rhs: &[Label]) -> GrammarResult<()> {
        let production = Production::new(operation.parse()?, rhs)?;
        self.add_rule(lhs, production)
    }

    pub fn rule(&self, lhs: Label) -> Option<&Production> {
        self.rules.iter().find(|(l, _)| *l == lhs).map(|(_, p)| p)
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[(Label, Production)] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Every alphabet label has a rule
    pub fn is_total(&self) -> bool {
        self.alphabet.iter().all(|&label| self.rule(label).is_some())
    }

    /// Replace each existing rule with a fresh random one with `probability`.
    ///
    /// Returns the number of rules that were regenerated.
    pub fn regenerate_random<R: Rng + ?Sized>(
        &mut self,
        probability: f64,
        rng: &mut R,
    ) -> GrammarResult<usize> {
        let mut regenerated = 0;
        for i in 0..self.rules.len() {
            if rng.gen::<f64>() < probability {
                self.rules[i].1 = Production::random(&self.operations, &self.alphabet, rng)?;
                regenerated += 1;
            }
        }
        Ok(regenerated)
    }

    /// Erase all rules and assign a fresh random rule to every alphabet label
    pub fn generate_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GrammarResult<&mut Self> {
        self.clear();
        for i in 0..self.alphabet.len() {
            let production = Production::random(&self.operations, &self.alphabet, rng)?;
            self.rules.push((self.alphabet[i], production));
        }
        Ok(self)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::with_default_alphabet()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grammar ({} rules)", self.rules.len())?;
        for (lhs, production) in &self.rules {
            writeln!(f, "{} -> {}", lhs, production)?;
        }
        Ok(())
    }
}

pub(super) fn single_label(text: &str) -> GrammarResult<Label> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(label), None) => Ok(label),
        _ => Err(GrammarError::MalformedRecord(format!(
            "label '{}' must be a single symbol",
            text
        ))),
    }
}
