//! Export the server's OpenAPI document to a file.

use crate::model::ModelKind;
use crate::openapi;
use reqwest::{Client, StatusCode};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while exporting the schema.
#[derive(Debug, Error)]
pub enum OpenApiExportError {
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Server answered with a non-success status.
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedStatus {
        /// Status returned by the server.
        status: StatusCode,
        /// Response body.
        body: String,
    },
    /// Schema could not be serialized.
    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Output file could not be written.
    #[error("failed to write schema to {path}: {source}")]
    Write {
        /// Destination path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Fetch the schema text from a running server.
pub async fn fetch_schema(url: &str) -> Result<String, OpenApiExportError> {
    let client = Client::builder()
        .user_agent(concat!("fuzzyserve-tools/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(OpenApiExportError::UnexpectedStatus { status, body });
    }
    tracing::debug!(url, bytes = body.len(), "Fetched OpenAPI schema");
    Ok(body)
}

/// Built-in document for `kind`, pretty-printed.
pub fn offline_schema(kind: ModelKind) -> Result<String, OpenApiExportError> {
    let document = openapi::document(Some(kind));
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Write `contents` to `path` verbatim, creating parent directories.
pub fn write_schema(path: &Path, contents: &str) -> Result<(), OpenApiExportError> {
    let write_error = |source| OpenApiExportError::Write {
        path: path.display().to_string(),
        source,
    };
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}
