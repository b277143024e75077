//! Import service
//!
//! Request-style entry points over the parser, importer and exporter:
//! preview a playlist, import channel records, and export a stored playlist.
//! The store and HTTP fetcher are injected so callers (and tests) decide
//! where channels live and how playlists are fetched.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::export::PlaylistExporter;
use crate::ingestor::{ChannelImporter, M3uParser};
use crate::models::{ExportFormat, ImportRequest, ImportResult, ParsedPlaylist, PlaylistSource};
use crate::repositories::{ChannelStore, PlaylistRepository, Repository};
use crate::utils::PlaylistFetcher;

pub struct ImportService {
    parser: M3uParser,
    importer: ChannelImporter,
    fetcher: PlaylistFetcher,
    playlists: PlaylistRepository,
    exporter: PlaylistExporter,
}

impl ImportService {
    pub fn new(
        store: Arc<dyn ChannelStore>,
        playlists: PlaylistRepository,
        fetcher: PlaylistFetcher,
    ) -> Self {
        Self {
            parser: M3uParser::new(),
            importer: ChannelImporter::new(store),
            fetcher,
            playlists,
            exporter: PlaylistExporter::new(),
        }
    }

    /// Resolve a source to playlist text, fetching it when it is a URL
    async fn load_source(&self, source: &PlaylistSource) -> AppResult<String> {
        match source {
            PlaylistSource::Content(content) => Ok(content.clone()),
            PlaylistSource::Url(url) => Ok(self.fetcher.fetch_text(url).await?),
        }
    }

    /// Parse a playlist without persisting anything
    pub async fn parse_preview(&self, source: &PlaylistSource) -> AppResult<ParsedPlaylist> {
        let content = self.load_source(source).await?;
        Ok(self.parser.parse(&content))
    }

    /// Import channel records into the store
    pub async fn import(&self, request: &ImportRequest) -> ImportResult {
        self.importer.import(request).await
    }

    /// Load, parse and import a playlist in one step.
    ///
    /// Fails only when the source can't be loaded; per-channel problems are
    /// reported in the returned result.
    pub async fn import_from_source(
        &self,
        source: &PlaylistSource,
        category_mapping: HashMap<String, String>,
        default_category: String,
    ) -> AppResult<ImportResult> {
        let parsed = self.parse_preview(source).await?;
        info!(
            "Importing {} parsed channels from {} categories",
            parsed.total_count,
            parsed.categories.len()
        );

        let request = ImportRequest {
            import_data: parsed.channels,
            category_mapping,
            default_category,
        };
        Ok(self.importer.import(&request).await)
    }

    /// Serialize a stored playlist in the requested format
    pub async fn export(&self, playlist_id: Uuid, format: ExportFormat) -> AppResult<String> {
        let playlist = self
            .playlists
            .find_by_id(playlist_id)
            .await?
            .ok_or_else(|| AppError::not_found("playlist", playlist_id.to_string()))?;

        let channels = self.playlists.get_playlist_channels(playlist_id).await?;
        info!(
            "Exporting playlist '{}' with {} channels as {}",
            playlist.name,
            channels.len(),
            format
        );

        self.exporter.render(&channels, format)
    }

    /// [`ImportService::export`] with the format given by name
    pub async fn export_named(&self, playlist_id: Uuid, format: &str) -> AppResult<String> {
        let format = ExportFormat::from_str(format)
            .map_err(|_| AppError::validation(format!("unsupported export format '{format}'")))?;
        self.export(playlist_id, format).await
    }
}
