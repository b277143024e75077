//! Repository pattern implementation for data access
//!
//! This module provides a clean abstraction layer over the database,
//! separating import logic from data access concerns.
//!
//! # Usage
//!
//! ```rust,ignore
//! use m3u_importer::repositories::{ChannelQuery, ChannelRepository};
//!
//! async fn example(repo: ChannelRepository) -> Result<(), Box<dyn std::error::Error>> {
//!     let news = repo.find_all(ChannelQuery::new().category("News")).await?;
//!     println!("{} news channels", news.len());
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod playlist;
pub mod traits;

// Re-export main traits and types
pub use channel::{ChannelCreateRequest, ChannelQuery, ChannelRepository};
pub use playlist::PlaylistRepository;
pub use traits::*;
