use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppResult, RepositoryError};
use crate::models::{Channel, Playlist, PlaylistCreateRequest, PlaylistWithCount};
use crate::repositories::{ChannelQuery, ChannelRepository, PlaylistRepository, Repository};

/// Playlist management and channel listing
pub struct PlaylistService {
    playlists: PlaylistRepository,
    channels: ChannelRepository,
}

impl PlaylistService {
    pub fn new(playlists: PlaylistRepository, channels: ChannelRepository) -> Self {
        Self {
            playlists,
            channels,
        }
    }

    pub async fn create_playlist(&self, name: &str, description: &str) -> AppResult<Playlist> {
        if name.trim().is_empty() {
            return Err(AppError::validation("playlist name must not be empty"));
        }

        let playlist = self
            .playlists
            .create(PlaylistCreateRequest {
                name: name.to_string(),
                description: description.to_string(),
            })
            .await?;

        info!("Created playlist '{}' ({})", playlist.name, playlist.id);
        Ok(playlist)
    }

    /// Append a channel to a playlist; `false` when it was already there
    pub async fn add_channel_to_playlist(
        &self,
        playlist_id: Uuid,
        channel_id: Uuid,
    ) -> AppResult<bool> {
        if !self.playlists.exists(playlist_id).await? {
            return Err(AppError::not_found("playlist", playlist_id.to_string()));
        }
        if !self.channels.exists(channel_id).await? {
            return Err(AppError::not_found("channel", channel_id.to_string()));
        }

        Ok(self.playlists.add_channel(playlist_id, channel_id).await?)
    }

    /// Create a playlist holding every active channel in channel order
    pub async fn playlist_from_all_channels(
        &self,
        name: &str,
        description: &str,
    ) -> AppResult<(Playlist, u64)> {
        let playlist = self.create_playlist(name, description).await?;
        let channels = self.channels.find_all(ChannelQuery::new().active(true)).await?;
        let ids: Vec<Uuid> = channels.iter().map(|c| c.id).collect();

        let added = self.playlists.add_channels(playlist.id, &ids).await?;
        info!("Added {} channels to playlist '{}'", added, playlist.name);
        Ok((playlist, added))
    }

    pub async fn list_playlists(&self) -> AppResult<Vec<PlaylistWithCount>> {
        Ok(self.playlists.find_all_with_counts().await?)
    }

    pub async fn delete_playlist(&self, playlist_id: Uuid) -> AppResult<()> {
        match self.playlists.delete(playlist_id).await {
            Ok(()) => {
                info!("Deleted playlist {}", playlist_id);
                Ok(())
            }
            Err(RepositoryError::RecordNotFound { .. }) => {
                Err(AppError::not_found("playlist", playlist_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_channels(&self, query: ChannelQuery) -> AppResult<Vec<Channel>> {
        Ok(self.channels.find_all(query).await?)
    }

    pub async fn list_categories(&self) -> AppResult<Vec<String>> {
        Ok(self.channels.list_categories().await?)
    }
}
