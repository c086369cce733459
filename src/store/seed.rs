//! Seed-file loading for the preview binary and local development.

use crate::store::mock::MockLeadStore;
use crate::store::models::{Lead, Operator};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// JSON seed file: operators plus their leads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub operators: Vec<Operator>,
    pub leads: Vec<Lead>,
}

impl SeedFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse seed file {}", path.display()))
    }

    /// Populate a store with the seeded records.
    pub async fn apply(&self, store: &MockLeadStore) {
        for operator in &self.operators {
            store.insert_operator(operator.clone()).await;
        }
        for lead in &self.leads {
            store.insert_lead(lead).await;
        }
    }
}
