//! Model store, loader, and the handle shared with request handlers.

pub mod artifact;
mod handle;
mod loader;

pub use artifact::{ModelArtifact, ModelBundle, ModelKind, ServingModel};
pub use handle::{ModelHandle, ModelState, ReadinessError};
pub use loader::{LoadedModel, ModelLoadError, load_model, parse_model};
