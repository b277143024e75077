//! Service layer
//!
//! Thin orchestration over the ingestor, repositories and exporter. The CLI
//! talks to these services rather than to the repositories directly.

pub mod import;
pub mod playlist;

pub use import::ImportService;
pub use playlist::PlaylistService;
