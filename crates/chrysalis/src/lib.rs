//! # Chrysalis - procedural creature evolution
//!
//! Application layer over the engine: layered configuration, a hot-reloadable
//! shared catalog and the command implementations behind the CLI.

pub mod commands;
pub mod config;
pub mod hot_reload;

// Re-export the underlying crates for convenience
pub use chrysalis_catalog as catalog;
pub use chrysalis_engine as engine;

pub use config::ChrysalisConfig;
pub use hot_reload::{CatalogReloader, SharedCatalog};
