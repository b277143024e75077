use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub mod playlist;

pub use playlist::*;

use crate::config::defaults::DEFAULT_CATEGORY;

/// A channel as produced by the parser or supplied to the importer.
///
/// Missing fields take the defaults below when deserializing, so callers can
/// submit partial records as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRecord {
    pub name: String,
    pub description: String,
    pub stream_url: String,
    pub logo_url: String,
    pub category: String,
    pub sort_order: i64,
    pub is_active: bool,
}

impl Default for ChannelRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            stream_url: String::new(),
            logo_url: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            sort_order: 0,
            is_active: true,
        }
    }
}

/// A channel persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub stream_url: String,
    pub logo_url: String,
    pub category: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Channel> for ChannelRecord {
    fn from(channel: &Channel) -> Self {
        Self {
            name: channel.name.clone(),
            description: channel.description.clone(),
            stream_url: channel.stream_url.clone(),
            logo_url: channel.logo_url.clone(),
            category: channel.category.clone(),
            sort_order: channel.sort_order,
            is_active: channel.is_active,
        }
    }
}

/// Tokenizer output: channels in URL-line order plus the distinct categories
/// seen, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlaylist {
    pub channels: Vec<ChannelRecord>,
    pub categories: Vec<String>,
    pub total_count: usize,
}

/// Where playlist text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// Playlist text supplied directly
    Content(String),
    /// Remote playlist fetched over HTTP(S)
    Url(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub import_data: Vec<ChannelRecord>,
    #[serde(default)]
    pub category_mapping: HashMap<String, String>,
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub categories_created: Vec<String>,
}

impl ImportResult {
    /// Record a category touched by the run, keeping first-seen order
    pub fn touch_category(&mut self, category: &str) {
        if !self.categories_created.iter().any(|c| c == category) {
            self.categories_created.push(category.to_string());
        }
    }
}
