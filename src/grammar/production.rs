// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Production rules and the operations they apply to a face

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, GrammarResult};

/// Face label, one symbol of the grammar alphabet
pub type Label = char;

/// Structural operation a rule applies to the face it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Overwrite the face label and queue the face again
    Relabel,
    /// Raise a tetrahedron on the face
    Grow,
    /// Split the face into four at its edge midpoints
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Relabel, Operation::Grow, Operation::Divide];

    /// Number of rhs labels the operation produces
    pub fn arity(self) -> usize {
        match self {
            Operation::Relabel => 1,
            Operation::Grow => 3,
            Operation::Divide => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Relabel => "relabel",
            Operation::Grow => "grow",
            Operation::Divide => "divide",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relabel" | "rename" => Ok(Operation::Relabel),
            "grow" => Ok(Operation::Grow),
            "divide" | "split" => Ok(Operation::Divide),
            _ => Err(GrammarError::UnknownOperation(s.to_string())),
        }
    }
}

/// Right-hand side of a rule: the operation together with its fixed-arity labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Relabel(Label),
    Grow([Label; 3]),
    Divide([Label; 4]),
}

impl Production {
    /// Build a production, checking the rhs length against the operation's arity
    pub fn new(operation: Operation, rhs: &[Label]) -> GrammarResult<Self> {
        let mismatch = || GrammarError::ArityMismatch {
            operation: operation.name(),
            expected: operation.arity(),
            actual: rhs.len(),
        };

        match operation {
            Operation::Relabel => match rhs {
                [label] => Ok(Production::Relabel(*label)),
                _ => Err(mismatch()),
            },
            Operation::Grow => rhs.try_into().map(Production::Grow).map_err(|_| mismatch()),
            Operation::Divide => rhs.try_into().map(Production::Divide).map_err(|_| mismatch()),
        }
    }

    /// Build a production from an operation name, e.g. `("grow", "DBF")`
    pub fn parse(operation: &str, rhs: &str) -> GrammarResult<Self> {
        let operation: Operation = operation.parse()?;
        let labels: Vec<Label> = rhs.chars().collect();
        Self::new(operation, &labels)
    }

    /// Sample a random operation and distinct rhs labels
    pub fn random<R: Rng + ?Sized>(
        operations: &[Operation],
        alphabet: &[Label],
        rng: &mut R,
    ) -> GrammarResult<Self> {
        let operation = *operations.choose(rng).ok_or(GrammarError::NoOperations)?;
        let arity = operation.arity();
        if alphabet.len() < arity {
            return Err(GrammarError::AlphabetTooSmall {
                available: alphabet.len(),
                required: arity,
            });
        }

        let rhs: Vec<Label> = alphabet.choose_multiple(rng, arity).copied().collect();
        Self::new(operation, &rhs)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Production::Relabel(_) => Operation::Relabel,
            Production::Grow(_) => Operation::Grow,
            Production::Divide(_) => Operation::Divide,
        }
    }

    pub fn rhs(&self) -> &[Label] {
        match self {
            Production::Relabel(label) => std::slice::from_ref(label),
            Production::Grow(labels) => labels,
            Production::Divide(labels) => labels,
        }
    }

    /// Rhs labels concatenated, the form used in persisted records
    pub fn rhs_string(&self) -> String {
        self.rhs().iter().collect()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.rhs().iter().map(|l| l.to_string()).collect();
        write!(f, "{} [{}]", self.operation(), labels.join(", "))
    }
}
