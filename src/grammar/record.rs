// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat `lhs_i, operation_i, rhs_i` encoding of a grammar for tabular storage

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::production::{Label, Operation, Production};
use super::rules::{single_label, Grammar};
use crate::error::{GrammarError, GrammarResult};

/// Flat key/value form of a grammar: `lhs0 = "A"`, `operation0 = "grow"`, `rhs0 = "DBF"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrammarRecord {
    entries: BTreeMap<String, String>,
}

impl GrammarRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of consecutive rules starting at `lhs0`
    pub fn num_rules(&self) -> usize {
        (0..).take_while(|i| self.entries.contains_key(&format!("lhs{}", i))).count()
    }

    /// Column names for `num_rules` rules, in persisted order
    pub fn columns(num_rules: usize) -> Vec<String> {
        (0..num_rules)
            .flat_map(|i| [format!("lhs{}", i), format!("operation{}", i), format!("rhs{}", i)])
            .collect()
    }

    /// Values in column order; missing entries are empty
    pub fn values(&self) -> Vec<&str> {
        Self::columns(self.num_rules())
            .iter()
            .map(|key| self.get(key).unwrap_or(""))
            .collect()
    }
}

impl Grammar {
    /// Encode the rules in insertion order
    pub fn to_record(&self) -> GrammarRecord {
        let mut record = GrammarRecord::new();
        for (i, (lhs, production)) in self.rules().iter().enumerate() {
            record.insert(format!("lhs{}", i), lhs.to_string());
            record.insert(format!("operation{}", i), production.operation().name());
            record.insert(format!("rhs{}", i), production.rhs_string());
        }
        record
    }

    /// Decode a record produced by [`Grammar::to_record`]
    pub fn from_record(
        alphabet: Vec<Label>,
        operations: Vec<Operation>,
        record: &GrammarRecord,
    ) -> GrammarResult<Self> {
        let mut grammar = Grammar::new(alphabet, operations);

        for i in 0..record.num_rules() {
            let field = move |name: &str| {
                let key = format!("{}{}", name, i);
                record
                    .get(&key)
                    .ok_or_else(|| GrammarError::MalformedRecord(format!("missing {}", key)))
            };

            let lhs = single_label(field("lhs")?)?;
            let production = Production::parse(field("operation")?, field("rhs")?)?;
            grammar.add_rule(lhs, production)?;
        }

        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::DEFAULT_ALPHABET;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_record_layout() {
        let record = Grammar::example().to_record();

        assert_eq!(record.num_rules(), 7);
        assert_eq!(record.get("lhs0"), Some("A"));
        assert_eq!(record.get("operation0"), Some("grow"));
        assert_eq!(record.get("rhs0"), Some("DBF"));
        assert_eq!(record.get("operation5"), Some("divide"));
        assert_eq!(record.get("rhs5"), Some("DDDG"));
        assert_eq!(&record.values()[..6], &["A", "grow", "DBF", "B", "grow", "ADF"]);
        assert_eq!(GrammarRecord::columns(1), vec!["lhs0", "operation0", "rhs0"]);
    }

    #[test]
    fn test_round_trip_random_grammars() {
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..10 {
            let grammar =
                Grammar::random(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &mut rng).unwrap();
            let decoded = Grammar::from_record(
                DEFAULT_ALPHABET.to_vec(),
                Operation::ALL.to_vec(),
                &grammar.to_record(),
            )
            .unwrap();
            assert_eq!(decoded, grammar);
        }
    }

    #[test]
    fn test_malformed_records() {
        let mut record = GrammarRecord::new();
        record.insert("lhs0", "A");
        record.insert("operation0", "grow");
        let missing_rhs = Grammar::from_record(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &record);
        assert!(matches!(missing_rhs, Err(GrammarError::MalformedRecord(_))));

        record.insert("rhs0", "DB");
        let short_rhs = Grammar::from_record(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &record);
        assert!(matches!(short_rhs, Err(GrammarError::ArityMismatch { .. })));

        record.insert("operation0", "melt");
        let unknown = Grammar::from_record(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &record);
        assert!(matches!(unknown, Err(GrammarError::UnknownOperation(_))));
    }
}
