use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::city::CycleReport;

/// Writes finished cycle reports as pretty-printed JSON under
/// `<dir>/<scenario>/cycle_NNNN.json`.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u32,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    /// Writes the report when its iteration falls on the interval. An
    /// interval of 0 disables writing entirely.
    pub fn maybe_write(
        &self,
        report: &CycleReport,
        scenario_name: &str,
    ) -> Result<Option<PathBuf>> {
        if self.interval == 0 || report.iteration % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario_name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("cycle_{:04}.json", report.iteration));
        let json = serde_json::to_string_pretty(report).context("failed to encode cycle report")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
