//! # contract: where generated reports go
//!
//! The fill pipeline renders documents in memory and hands them to a
//! [`ReportSink`]. The directory-backed implementation lives in
//! [`crate::sink`]; tests use the `mockall` generated `MockReportSink`.
//!
//! Errors are boxed trait objects so sinks can surface whatever their
//! backing store produces.

use std::path::PathBuf;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type for sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Destination for rendered report documents.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Store one rendered document under `file_name`, returning where it went.
    async fn write_report(&self, file_name: &str, content: Vec<u8>)
        -> Result<PathBuf, SinkError>;
}
