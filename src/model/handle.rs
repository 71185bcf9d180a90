//! Shared, write-once handle to the loaded model.

use super::loader::{LoadedModel, ModelLoadError};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Reason the service cannot serve predictions yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    /// No model has been installed.
    #[error("Model not loaded")]
    NotLoaded,
}

/// Snapshot of the handle's contents.
#[derive(Debug, Clone)]
pub enum ModelState {
    /// Startup has not installed a model.
    NotLoaded,
    /// A model is available for the rest of the process lifetime.
    Loaded(Arc<LoadedModel>),
}

/// Cloneable, read-only view of the process model once it has been installed.
///
/// The model is set exactly once and never replaced, so handlers read it without locking.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    slot: Arc<OnceLock<Arc<LoadedModel>>>,
}

impl ModelHandle {
    /// Empty handle; readiness reports not-loaded until [`ModelHandle::install`] succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that already holds `model`.
    pub fn loaded(model: LoadedModel) -> Self {
        let handle = Self::new();
        let _ = handle.slot.set(Arc::new(model));
        handle
    }

    /// Install the model. Fails if one is already present.
    pub fn install(&self, model: LoadedModel) -> Result<(), ModelLoadError> {
        self.slot
            .set(Arc::new(model))
            .map_err(|_| ModelLoadError::AlreadyLoaded)
    }

    /// Current state of the handle.
    pub fn state(&self) -> ModelState {
        match self.slot.get() {
            Some(model) => ModelState::Loaded(Arc::clone(model)),
            None => ModelState::NotLoaded,
        }
    }

    /// Loaded model, or the reason predictions cannot be served.
    pub fn check_ready(&self) -> Result<Arc<LoadedModel>, ReadinessError> {
        match self.state() {
            ModelState::Loaded(model) => Ok(model),
            ModelState::NotLoaded => Err(ReadinessError::NotLoaded),
        }
    }
}
