// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSV persistence of grammars
//!
//! Rows are `<key>,fitness,num_rules,lhs0,operation0,rhs0,...` where `<key>` is
//! `generation` in the run history and `id` in per-generation population files.

use anyhow::{bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::grammar::{Grammar, GrammarRecord};

/// Name of the run history file
pub const GENERATIONS_FILE: &str = "generations.csv";

/// Population file name for a generation
pub fn generation_file(generation: usize) -> String {
    format!("generation_{}.csv", generation)
}

/// One persisted grammar
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarRow {
    /// Generation number or individual id
    pub key: usize,
    pub fitness: f64,
    pub record: GrammarRecord,
}

fn header(key: &str, num_rules: usize) -> String {
    let mut columns = vec![key.to_string(), "fitness".into(), "num_rules".into()];
    columns.extend(GrammarRecord::columns(num_rules));
    columns.join(",")
}

/// Rows shorter than `num_rules` are padded with empty fields
fn row(key: usize, fitness: f64, grammar: &Grammar, num_rules: usize) -> String {
    let record = grammar.to_record();
    let mut fields = vec![key.to_string(), fitness.to_string(), grammar.len().to_string()];
    fields.extend(record.values().into_iter().map(str::to_string));
    fields.resize(3 + 3 * num_rules.max(grammar.len()), String::new());
    fields.join(",")
}

/// Append the best grammar of a generation to the history, writing the header first
pub fn append_generation(path: impl AsRef<Path>, generation: usize, fitness: f64, grammar: &Grammar) -> Result<()> {
    let path = path.as_ref();
    let is_new = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open generation log: {:?}", path))?;

    if is_new {
        writeln!(file, "{}", header("generation", grammar.len()))?;
    }
    writeln!(file, "{}", row(generation, fitness, grammar, grammar.len()))
        .with_context(|| format!("Failed to append to generation log: {:?}", path))?;
    Ok(())
}

/// Write one row per individual, numbered from 0
pub fn write_population<'a>(
    path: impl AsRef<Path>,
    individuals: impl IntoIterator<Item = (f64, &'a Grammar)>,
) -> Result<()> {
    let path = path.as_ref();
    let individuals: Vec<_> = individuals.into_iter().collect();
    let num_rules = individuals.iter().map(|(_, g)| g.len()).max().unwrap_or(0);

    let file = File::create(path).with_context(|| format!("Failed to create population file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", header("id", num_rules))?;
    for (id, (fitness, grammar)) in individuals.into_iter().enumerate() {
        writeln!(writer, "{}", row(id, fitness, grammar, num_rules))?;
    }
    writer.flush().with_context(|| format!("Failed to write population file: {:?}", path))?;
    Ok(())
}

/// Read a history or population file back into rows
pub fn read_grammar_rows(path: impl AsRef<Path>) -> Result<Vec<GrammarRow>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open grammar file: {:?}", path))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line.with_context(|| format!("Failed to read {:?}", path))?,
        None => return Ok(Vec::new()),
    };
    let columns: Vec<&str> = header.trim().split(',').collect();
    if columns.len() < 3 || columns[1] != "fitness" || columns[2] != "num_rules" {
        bail!("{:?} is not a grammar file: unexpected header '{}'", path, header);
    }

    let mut rows = Vec::new();
    for (number, line) in lines.enumerate() {
        let line = line.with_context(|| format!("Failed to read {:?}", path))?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != columns.len() {
            bail!(
                "{:?} line {}: expected {} fields, got {}",
                path,
                number + 2,
                columns.len(),
                fields.len()
            );
        }

        let mut record = GrammarRecord::new();
        for (column, value) in columns.iter().zip(&fields).skip(3) {
            if !value.is_empty() {
                record.insert(*column, *value);
            }
        }

        rows.push(GrammarRow {
            key: fields[0]
                .parse()
                .with_context(|| format!("{:?} line {}: bad {}", path, number + 2, columns[0]))?,
            fitness: fields[1]
                .parse()
                .with_context(|| format!("{:?} line {}: bad fitness", path, number + 2))?,
            record,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Operation, DEFAULT_ALPHABET};
    use tempfile::TempDir;

    #[test]
    fn test_header_layout() {
        assert_eq!(header("id", 2), "id,fitness,num_rules,lhs0,operation0,rhs0,lhs1,operation1,rhs1");
        assert!(row(3, 1.5, &Grammar::example(), 7).starts_with("3,1.5,7,A,grow,DBF,B,grow,ADF,"));
    }

    #[test]
    fn test_generation_log_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(GENERATIONS_FILE);
        let grammar = Grammar::example();

        append_generation(&path, 0, 0.25, &grammar).unwrap();
        append_generation(&path, 1, 0.5, &grammar).unwrap();

        let rows = read_grammar_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].key, 1);
        assert_eq!(rows[1].fitness, 0.5);

        let decoded =
            Grammar::from_record(DEFAULT_ALPHABET.to_vec(), Operation::ALL.to_vec(), &rows[0].record).unwrap();
        assert_eq!(decoded, grammar);
    }

    #[test]
    fn test_rejects_foreign_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "name,age\nbob,3\n").unwrap();
        assert!(read_grammar_rows(&path).is_err());
    }
}
