//! Playlist export
//!
//! Renders an ordered channel list as M3U text or JSON. The M3U output is
//! the format the parser consumes, so parsing an export yields the same
//! names, stream URLs, logos and categories.

use crate::errors::AppResult;
use crate::ingestor::m3u_parser::{EXTINF_MARKER, HEADER_MARKER};
use crate::models::{Channel, ChannelRecord, ExportFormat};

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaylistExporter;

impl PlaylistExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, channels: &[Channel], format: ExportFormat) -> AppResult<String> {
        match format {
            ExportFormat::M3u => Ok(self.render_m3u(channels)),
            ExportFormat::Json => self.render_json(channels),
        }
    }

    pub fn render_m3u(&self, channels: &[Channel]) -> String {
        let mut m3u = String::from(HEADER_MARKER);
        m3u.push('\n');

        for channel in channels {
            m3u.push_str(&format!(
                "{}-1 tvg-logo=\"{}\" group-title=\"{}\",{}\n",
                EXTINF_MARKER,
                attribute_value(&channel.logo_url),
                attribute_value(&channel.category),
                single_line(&channel.name)
            ));
            m3u.push_str(&single_line(&channel.stream_url));
            m3u.push('\n');
        }

        m3u
    }

    pub fn render_json(&self, channels: &[Channel]) -> AppResult<String> {
        let records: Vec<ChannelRecord> = channels.iter().map(ChannelRecord::from).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

/// Quotes would terminate the attribute early
fn attribute_value(value: &str) -> String {
    single_line(value).replace('"', "'")
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}
