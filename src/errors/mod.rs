//! Centralized error handling for the M3U importer
//!
//! This module unifies error types across the store, source fetching and
//! import layers.
//!
//! # Error Categories
//!
//! - **Database Errors**: SQLite operations, migrations, connection issues
//! - **Repository Errors**: Data access layer failures
//! - **Source Errors**: Remote playlist connectivity and response handling
//! - **Validation Errors**: Input validation and business rule violations
//!
//! # Usage
//!
//! ```rust
//! use m3u_importer::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("playlist name must not be empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
