// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Run metadata sidecar (`metadata.json`)

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::config::EvolutionConfig;

pub const METADATA_FILE: &str = "metadata.json";

/// Everything needed to reproduce a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_name: String,
    pub version: String,
    pub started: String,
    /// Seed actually used, even when the config left it unset
    pub seed: u64,
    pub config: EvolutionConfig,
}

impl RunMetadata {
    pub fn new(run_name: impl Into<String>, seed: u64, config: &EvolutionConfig) -> Self {
        Self {
            run_name: run_name.into(),
            version: crate::VERSION.to_string(),
            started: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            seed,
            config: config.clone(),
        }
    }

    /// Write `metadata.json` into `dir`
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(METADATA_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run metadata")?;
        fs::write(&path, json).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read `metadata.json` from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(METADATA_FILE);
        let metadata = serde_json::from_str(
            &fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?,
        )
        .context(format!("Failed to parse {}", path.display()))?;
        Ok(metadata)
    }

    /// The configuration with the resolved seed filled in, for replaying the run.
    ///
    /// The replay is named `<run_name>-replay` so it never writes into the source run.
    pub fn replay_config(&self) -> EvolutionConfig {
        EvolutionConfig {
            seed: Some(self.seed),
            run_name: Some(format!("{}-replay", self.run_name)),
            ..self.config.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_round_trip() {
        let dir = TempDir::new().unwrap();
        let metadata = RunMetadata::new("trial", 99, &EvolutionConfig::default());

        metadata.save(dir.path()).unwrap();
        let loaded = RunMetadata::load(dir.path()).unwrap();

        assert_eq!(loaded, metadata);
        assert_eq!(loaded.replay_config().seed, Some(99));
        assert_eq!(loaded.replay_config().run_name.as_deref(), Some("trial-replay"));
        assert_eq!(loaded.replay_config().population_size, 10);
    }
}
