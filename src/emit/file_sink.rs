use crate::emit::sink_backend::{ResultPayload, ResultSink, SinkError};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the pretty-printed payload to a local file, replacing it
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn emit(&mut self, payload: &ResultPayload) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = payload.to_pretty()?;
        fs::write(&self.path, json)?;

        log::info!("📝 Wrote aggregate to: {}", self.path.display());
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "file"
    }
}
