//! JSONL metrics sink — one line per successful post, appended under
//! `{DATA_DIR}/post-log/`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use banter_common::PostRecord;
use banter_engine::MetricsSink;

/// Root data directory, controlled by `DATA_DIR` env var (default: `"data"`).
pub fn data_dir() -> PathBuf {
    PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

pub struct JsonlMetrics {
    path: PathBuf,
    file: File,
}

impl JsonlMetrics {
    /// Open (append) today's post log.
    pub fn open() -> Result<Self> {
        let dir = data_dir().join("post-log");
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        let path = dir.join(format!("{}.jsonl", Utc::now().format("%Y%m%d")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        info!(file = %path.display(), "Post log open");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl MetricsSink for JsonlMetrics {
    fn record(&mut self, record: &PostRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        Ok(())
    }
}
