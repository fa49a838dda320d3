//! Mermaid Batch - Convert directories of Mermaid diagrams to PNG images.
//!
//! Rendering is delegated to the Mermaid CLI, run either from its container
//! image or from a local installation. This crate discovers diagram sources,
//! prepares the renderer's theme configuration, invokes the renderer once per
//! diagram and, when a render fails, can leave an HTML page for manual
//! capture instead.
//!
//! - **Configuration**: [`config::AppConfig`] and its sections
//! - **Renderers**: the [`render::Renderer`] trait and its backends
//! - **Batch loop**: [`BatchConverter`] producing a [`BatchReport`]

pub mod config;
pub mod discover;
pub mod fallback;
pub mod install;
pub mod render;
pub mod scale;
pub mod theme;

mod batch;
mod error;

pub use batch::{BatchConverter, BatchReport, Job, JobOutcome};
pub use error::BatchError;
