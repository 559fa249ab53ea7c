use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::city::{CityModel, GeoPoint, ProposalSite};
use crate::clock::Pacing;

fn default_iterations() -> u32 {
    3
}

fn default_snapshot_interval() -> u32 {
    1
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    /// Iteration cap for the planning loop.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub snapshots: SnapshotSettings,
    pub city: CityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityConfig {
    /// Ordered polygon of the city boundary.
    pub boundary: Vec<GeoPoint>,
    /// Candidate sites the planner may attach building proposals to.
    #[serde(default)]
    pub proposal_sites: Vec<ProposalSite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacingConfig {
    #[serde(default)]
    pub stage_ms: u64,
    #[serde(default)]
    pub iteration_ms: u64,
}

impl PacingConfig {
    pub fn to_pacing(&self) -> Pacing {
        Pacing::from_millis(self.stage_ms, self.iteration_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSettings {
    /// Write a report every N cycles; 0 disables snapshots.
    #[serde(default = "default_snapshot_interval")]
    pub interval: u32,
    #[serde(default = "default_snapshot_dir")]
    pub output_dir: String,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            interval: default_snapshot_interval(),
            output_dir: default_snapshot_dir(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("scenario validation error: {0}")]
    Validation(String),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path).map_err(|source| ScenarioError::Io {
            path: path.clone(),
            source,
        })?;
        let scenario: Scenario =
            serde_yaml::from_str(&data).map_err(|source| ScenarioError::Parse { path, source })?;
        scenario.validate()?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::Validation(
                "scenario must have a non-empty name".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(ScenarioError::Validation(
                "iterations must be at least 1".into(),
            ));
        }
        if self.city.boundary.len() < 3 {
            return Err(ScenarioError::Validation(format!(
                "city boundary needs at least 3 vertices, got {}",
                self.city.boundary.len()
            )));
        }
        let mut seen_ids = Vec::new();
        for site in &self.city.proposal_sites {
            if site.id.trim().is_empty() {
                return Err(ScenarioError::Validation(
                    "proposal site id must not be empty".into(),
                ));
            }
            if seen_ids.contains(&site.id.as_str()) {
                return Err(ScenarioError::Validation(format!(
                    "proposal site id '{}' defined more than once",
                    site.id
                )));
            }
            seen_ids.push(site.id.as_str());
        }
        Ok(())
    }

    pub fn build_city(&self) -> CityModel {
        CityModel {
            boundary: self.city.boundary.clone(),
            proposal_sites: self.city.proposal_sites.clone(),
        }
    }

    pub fn iterations(&self, override_iterations: Option<u32>) -> u32 {
        override_iterations.unwrap_or(self.iterations)
    }
}
