//! Helpers behind the `fuzzyserve-tools` binary: diagram rendering and OpenAPI export.

pub mod diagrams;
pub mod openapi_export;

pub use diagrams::{DiagramJob, RenderReport, plan_jobs, render_all};
pub use openapi_export::{OpenApiExportError, fetch_schema, offline_schema, write_schema};
