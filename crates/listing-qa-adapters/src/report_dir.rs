//! Directory output adapter: one pretty-printed JSON file per image.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use listing_qa_core::{FinalReport, ResultOutput};
use tracing::{debug, warn};

/// Writes each report to `<dir>/result_<stem>.json`.
///
/// Files left over from earlier runs are overwritten. Within one run, a
/// second image with an already used stem gets `result_<stem>-2.json`,
/// the third `-3`, and so on.
#[derive(Debug)]
pub struct DirectoryReportWriter {
    dir: PathBuf,
    written: Mutex<HashSet<String>>,
}

impl DirectoryReportWriter {
    /// Creates the writer, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir,
            written: Mutex::new(HashSet::new()),
        })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Claims a report file name not yet used in this run.
    fn claim_path(&self, report: &FinalReport) -> Result<PathBuf> {
        let preferred = FinalReport::output_file_name(&report.metadata.filename);
        let mut written = self
            .written
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;

        let mut name = preferred.clone();
        let base = preferred.trim_end_matches(".json");
        let mut n = 1;
        while written.contains(&name) {
            n += 1;
            name = format!("{base}-{n}.json");
        }
        if n > 1 {
            warn!(
                "{} already used in this run, writing report for {} to {name}",
                preferred, report.metadata.filename
            );
        }
        written.insert(name.clone());
        drop(written);

        Ok(self.dir.join(name))
    }
}

impl ResultOutput for DirectoryReportWriter {
    fn write(&self, report: &FinalReport) -> Result<()> {
        let path = self.claim_path(report)?;
        let mut json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        json.push('\n');
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
