//! Directory-backed report sink.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::contract::{ReportSink, SinkError};

/// Writes each report as a file in `output_dir`, creating the directory on
/// first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite,
        }
    }
}

#[async_trait]
impl ReportSink for DirectorySink {
    async fn write_report(&self, file_name: &str, content: Vec<u8>) -> Result<PathBuf, SinkError> {
        if !tokio::fs::try_exists(&self.output_dir).await? {
            tokio::fs::create_dir_all(&self.output_dir).await.map_err(|e| {
                error!(error = ?e, path = %self.output_dir.display(), "Failed to create output directory");
                e
            })?;
            debug!(path = %self.output_dir.display(), "Created output directory");
        }

        let path = self.output_dir.join(file_name);
        if !self.overwrite && tokio::fs::try_exists(&path).await? {
            error!(path = %path.display(), "Refusing to overwrite existing report");
            return Err(format!("{} already exists (set overwrite: true to replace)", path.display()).into());
        }

        tokio::fs::write(&path, &content).await?;
        info!(path = %path.display(), size = content.len(), "Wrote report");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_directory_and_refuses_overwrite() {
        let tmp = tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("out"), false);

        let path = sink.write_report("a.docx", b"one".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"one");

        let err = sink.write_report("a.docx", b"two".to_vec()).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read(&path).unwrap(), b"one");
    }

    #[tokio::test]
    async fn overwrite_replaces_existing_file() {
        let tmp = tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path(), true);
        sink.write_report("a.docx", b"one".to_vec()).await.unwrap();
        let path = sink.write_report("a.docx", b"two".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"two");
    }
}
