#![deny(missing_docs)]

//! Core library for the fuzzyserve model server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Mamdani fuzzy inference engine.
pub mod fuzzy;
/// Prediction services for the supported model variants.
pub mod inference;
/// Structured logging and tracing setup.
pub mod logging;
/// Prediction traffic counters.
pub mod metrics;
/// Model artifact loading and the shared model handle.
pub mod model;
/// OpenAPI document for the HTTP surface.
pub mod openapi;
/// Diagram rendering and schema export helpers.
pub mod tooling;
