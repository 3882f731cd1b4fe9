//! FileEmitter - appends flushed batches to a JSON-lines file

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, error, warn};

use contracts::{Emitter, Measurement, Options};

/// Default output path when none is configured.
const DEFAULT_PATH: &str = "./measurements.jsonl";

/// Sink that appends each measurement as one JSON line
pub struct FileEmitter {
    name: String,
    path: PathBuf,
}

impl FileEmitter {
    /// Create a new FileEmitter writing to the given path
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            name: name.into(),
            path,
        })
    }

    /// Create from an option map (for the factory); recognized key: `path`
    pub fn from_options(name: impl Into<String>, options: &Options) -> std::io::Result<Self> {
        let path = options
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_PATH);
        Self::new(name, path)
    }

    /// Configured output path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn append_batch(&self, batch: &[Measurement]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for measurement in batch {
            let line = serde_json::to_string(measurement)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

impl Emitter for FileEmitter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn emit(&mut self, batch: &[Measurement]) -> bool {
        if batch.is_empty() {
            warn!(emitter = %self.name, "skipping send because of an empty payload");
            return false;
        }

        match self.append_batch(batch) {
            Ok(()) => {
                debug!(
                    emitter = %self.name,
                    measurements = batch.len(),
                    path = %self.path.display(),
                    "batch written"
                );
                true
            }
            Err(e) => {
                error!(emitter = %self.name, error = %e, "write failed");
                false
            }
        }
    }
}
