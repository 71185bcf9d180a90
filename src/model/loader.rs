//! One-shot loading of the model artifact at startup.

use super::artifact::{ModelArtifact, ServingModel};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the model artifact. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// Artifact could not be read from disk.
    #[error("failed to read model artifact at {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Artifact is not valid JSON or does not match either layout.
    #[error("failed to parse model artifact at {}: {source}", path.display())]
    Parse {
        /// Path that was read.
        path: PathBuf,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Artifact parsed but describes an unusable model.
    #[error("invalid model artifact at {}: {reason}", path.display())]
    Invalid {
        /// Path that was read.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
    /// A model has already been installed in the handle.
    #[error("a model is already loaded; artifacts are loaded once per process")]
    AlreadyLoaded,
}

/// A validated model together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Model used by the prediction handlers.
    pub serving: ServingModel,
    /// Artifact path the model was read from.
    pub source: PathBuf,
    /// Hex-encoded SHA-256 of the artifact bytes.
    pub sha256: String,
}

/// Read, parse and validate the artifact at `path`.
pub fn load_model(path: impl AsRef<Path>) -> Result<LoadedModel, ModelLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&bytes, path)?;
    tracing::info!(
        path = %path.display(),
        kind = model.serving.kind().as_str(),
        sha256 = %model.sha256,
        rules = model.serving.system().rules.len(),
        "Model loaded successfully"
    );
    Ok(model)
}

/// Parse and validate artifact bytes; `path` is only used for error reporting.
pub fn parse_model(bytes: &[u8], path: &Path) -> Result<LoadedModel, ModelLoadError> {
    let sha256 = hex::encode(Sha256::digest(bytes));
    let artifact = ModelArtifact::from_json(bytes).map_err(|source| ModelLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| ModelLoadError::Invalid {
        path: path.to_path_buf(),
        reason,
    };
    artifact.validate().map_err(invalid)?;
    let serving = artifact.into_serving().map_err(invalid)?;
    Ok(LoadedModel {
        serving,
        source: path.to_path_buf(),
        sha256,
    })
}
