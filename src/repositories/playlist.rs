//! Playlist repository implementation
//!
//! Playlists are ordered selections of stored channels. Membership rows carry
//! their own sort order, independent of the channel's global `sort_order`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use super::channel::ChannelRepository;
use super::traits::Repository;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{Channel, Playlist, PlaylistCreateRequest, PlaylistWithCount};

#[derive(Clone)]
pub struct PlaylistRepository {
    pool: Pool<Sqlite>,
}

impl PlaylistRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn row_to_playlist(row: &SqliteRow) -> RepositoryResult<Playlist> {
        Ok(Playlist {
            id: Uuid::parse_str(&row.try_get::<String, _>("id")?)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    /// Append a channel to the end of a playlist.
    ///
    /// Returns `false` when the channel is already a member.
    pub async fn add_channel(&self, playlist_id: Uuid, channel_id: Uuid) -> RepositoryResult<bool> {
        let sql = "INSERT OR IGNORE INTO playlist_channels (playlist_id, channel_id, sort_order, added_at)
                   VALUES (?, ?, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM playlist_channels WHERE playlist_id = ?), ?)";

        let result = sqlx::query(sql)
            .bind(playlist_id.to_string())
            .bind(channel_id.to_string())
            .bind(playlist_id.to_string())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            self.touch(playlist_id).await?;
        }

        Ok(result.rows_affected() > 0)
    }

    /// Append several channels in one transaction, preserving the given order.
    ///
    /// Returns the number of channels actually added.
    pub async fn add_channels(
        &self,
        playlist_id: Uuid,
        channel_ids: &[Uuid],
    ) -> RepositoryResult<u64> {
        if channel_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut added = 0;

        let sql = "INSERT OR IGNORE INTO playlist_channels (playlist_id, channel_id, sort_order, added_at)
                   VALUES (?, ?, (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM playlist_channels WHERE playlist_id = ?), ?)";

        for channel_id in channel_ids {
            let result = sqlx::query(sql)
                .bind(playlist_id.to_string())
                .bind(channel_id.to_string())
                .bind(playlist_id.to_string())
                .bind(now)
                .execute(&mut *tx)
                .await?;
            added += result.rows_affected();
        }

        sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(playlist_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(added)
    }

    /// Channels of a playlist in playlist order
    pub async fn get_playlist_channels(&self, playlist_id: Uuid) -> RepositoryResult<Vec<Channel>> {
        let sql = "SELECT c.id, c.name, c.description, c.stream_url, c.logo_url, c.category,
                   c.sort_order, c.is_active, c.created_at, c.updated_at
                   FROM playlist_channels pc
                   JOIN channels c ON c.id = pc.channel_id
                   WHERE pc.playlist_id = ?
                   ORDER BY pc.sort_order ASC";

        let rows = sqlx::query(sql)
            .bind(playlist_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(ChannelRepository::row_to_channel).collect()
    }

    /// All playlists with their channel counts, by name
    pub async fn find_all_with_counts(&self) -> RepositoryResult<Vec<PlaylistWithCount>> {
        let sql = "SELECT p.id, p.name, p.description, p.created_at, p.updated_at,
                   COUNT(pc.channel_id) AS channel_count
                   FROM playlists p
                   LEFT JOIN playlist_channels pc ON pc.playlist_id = p.id
                   GROUP BY p.id
                   ORDER BY p.name ASC";

        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> RepositoryResult<PlaylistWithCount> {
                Ok(PlaylistWithCount {
                    playlist: Self::row_to_playlist(row)?,
                    channel_count: row.try_get("channel_count")?,
                })
            })
            .collect()
    }

    async fn touch(&self, playlist_id: Uuid) -> RepositoryResult<()> {
        sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(playlist_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<Playlist, Uuid> for PlaylistRepository {
    type CreateRequest = PlaylistCreateRequest;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Playlist>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM playlists WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_playlist(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<Playlist> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(RepositoryError::constraint_violation(
                "playlists.name",
                "playlist name must not be empty",
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let description = request.description.trim().to_string();

        sqlx::query(
            "INSERT INTO playlists (id, name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(&name)
        .bind(&description)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert("playlists.id", e))?;

        Ok(Playlist {
            id,
            name,
            description,
            created_at: now,
            updated_at: now,
        })
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM playlist_channels WHERE playlist_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::record_not_found(
                "playlists",
                "id",
                id.to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }
}
