//! M3U playlist parser
//!
//! Turns M3U/M3U8 playlist text into [`ChannelRecord`]s. Parsing is best
//! effort: malformed metadata lines yield partially populated records and
//! orphan URL lines are ignored, so this never fails.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::category::normalize_category;
use crate::config::defaults::DEFAULT_CATEGORY;
use crate::models::{ChannelRecord, ParsedPlaylist};

pub const HEADER_MARKER: &str = "#EXTM3U";
pub const EXTINF_MARKER: &str = "#EXTINF:";

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTES: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTES.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("attribute pattern is valid")
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct M3uParser;

impl M3uParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse full playlist text into channels and the categories they use.
    pub fn parse(&self, content: &str) -> ParsedPlaylist {
        let mut channels: Vec<ChannelRecord> = Vec::new();
        let mut categories: Vec<String> = Vec::new();
        let mut pending: Option<ChannelRecord> = None;
        let mut orphan_lines = 0usize;
        let mut dropped_metadata = 0usize;

        for (line_num, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with(HEADER_MARKER) {
                continue;
            }

            if line.starts_with(EXTINF_MARKER) {
                if let Some(previous) = pending.replace(self.parse_extinf_line(line)) {
                    dropped_metadata += 1;
                    debug!(
                        "Metadata for '{}' replaced at line {} before any stream URL",
                        previous.name,
                        line_num + 1
                    );
                }
                continue;
            }

            if line.starts_with('#') {
                // Other directives (#EXTVLCOPT, #EXTGRP, ...) don't consume the pending entry
                continue;
            }

            match pending.take() {
                Some(mut channel) => {
                    channel.stream_url = line.to_string();
                    channel.sort_order = channels.len() as i64 + 1;
                    if !categories.contains(&channel.category) {
                        categories.push(channel.category.clone());
                    }
                    channels.push(channel);
                }
                None => {
                    orphan_lines += 1;
                    debug!(
                        "Ignoring stream URL without EXTINF metadata at line {}",
                        line_num + 1
                    );
                }
            }
        }

        if let Some(unfinished) = pending {
            dropped_metadata += 1;
            debug!(
                "Metadata for '{}' at end of playlist has no stream URL",
                unfinished.name
            );
        }

        if orphan_lines > 0 || dropped_metadata > 0 {
            warn!(
                "Playlist contained {} orphan URL lines and {} metadata lines without a URL",
                orphan_lines, dropped_metadata
            );
        }

        info!(
            "Parsed {} channels in {} categories",
            channels.len(),
            categories.len()
        );

        let total_count = channels.len();
        ParsedPlaylist {
            channels,
            categories,
            total_count,
        }
    }

    /// Parse a single `#EXTINF:` line into a record without a stream URL.
    ///
    /// Format: `#EXTINF:<duration> key="value" ...,<display name>`
    pub fn parse_extinf_line(&self, line: &str) -> ChannelRecord {
        let attributes = Self::parse_attributes(line);
        let mut channel = ChannelRecord::default();

        if let Some(comma_pos) = line.rfind(',') {
            channel.name = line[comma_pos + 1..].trim().to_string();
        }

        if let Some(tvg_name) = attributes.get("tvg-name") {
            channel.name = tvg_name.trim().to_string();
        }

        if let Some(logo) = attributes.get("tvg-logo") {
            channel.logo_url = logo.trim().to_string();
        }

        if let Some(group) = attributes.get("group-title") {
            let category = normalize_category(group);
            channel.category = if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category
            };
        }

        if let Some(tvg_id) = attributes.get("tvg-id") {
            channel.description = format!("ID: {tvg_id}");
        }

        channel
    }

    /// Extract every `key="value"` pair on the line; a repeated key keeps the
    /// last value.
    fn parse_attributes(line: &str) -> HashMap<String, String> {
        attribute_regex()
            .captures_iter(line)
            .map(|caps| (caps[1].to_lowercase(), caps[2].to_string()))
            .collect()
    }
}
