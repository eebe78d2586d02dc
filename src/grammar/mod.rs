// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grammar module - production rules, random generation, mutation and crossover

mod crossover;
mod production;
mod record;
mod rules;

pub use crossover::CrossoverStrategy;
pub use production::{Label, Operation, Production};
pub use record::GrammarRecord;
pub use rules::{Grammar, DEFAULT_ALPHABET};
