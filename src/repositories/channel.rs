//! Channel repository implementation
//!
//! SQLite-backed storage for imported channels. `stream_url` is unique, which
//! is what the importer's duplicate detection keys on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};
use uuid::Uuid;

use super::traits::{ChannelStore, Repository};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::Channel;

const CHANNEL_COLUMNS: &str = "id, name, description, stream_url, logo_url, category, sort_order,
     is_active, created_at, updated_at";

/// Request for channel creation
#[derive(Debug, Clone)]
pub struct ChannelCreateRequest {
    pub name: String,
    pub description: String,
    pub stream_url: String,
    pub logo_url: String,
    pub category: String,
    pub sort_order: i64,
    pub is_active: bool,
}

/// Query parameters specific to channels
#[derive(Debug, Clone, Default)]
pub struct ChannelQuery {
    /// Filter by category
    pub category: Option<String>,
    /// Filter by active status
    pub is_active: Option<bool>,
}

impl ChannelQuery {
    /// Create new empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by category
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by active status
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Repository implementation for channels
#[derive(Clone)]
pub struct ChannelRepository {
    pool: Pool<Sqlite>,
}

impl ChannelRepository {
    /// Create a new channel repository
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Convert database row to Channel model
    pub(crate) fn row_to_channel(row: &SqliteRow) -> RepositoryResult<Channel> {
        Ok(Channel {
            id: Uuid::parse_str(&row.try_get::<String, _>("id")?)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            stream_url: row.try_get("stream_url")?,
            logo_url: row.try_get("logo_url")?,
            category: row.try_get("category")?,
            sort_order: row.try_get("sort_order")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    /// Build WHERE clause from query parameters
    fn build_where_clause(&self, query: &ChannelQuery) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(category) = &query.category {
            conditions.push("category = ?".to_string());
            params.push(category.clone());
        }

        match query.is_active {
            Some(true) => conditions.push("is_active = 1".to_string()),
            Some(false) => conditions.push("is_active = 0".to_string()),
            None => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Channels matching a query, in channel order
    pub async fn find_all(&self, query: ChannelQuery) -> RepositoryResult<Vec<Channel>> {
        let (where_clause, params) = self.build_where_clause(&query);
        let sql = format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels{where_clause} ORDER BY sort_order ASC, name ASC"
        );

        let mut query_builder = sqlx::query(&sql);
        for param in params {
            query_builder = query_builder.bind(param);
        }

        let rows = query_builder.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_channel).collect()
    }

    /// Distinct categories of stored channels, alphabetically
    pub async fn list_categories(&self) -> RepositoryResult<Vec<String>> {
        let categories =
            sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM channels ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }
}

#[async_trait]
impl Repository<Channel, Uuid> for ChannelRepository {
    type CreateRequest = ChannelCreateRequest;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Channel>> {
        let sql = format!("SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = ?");

        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_channel(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, request: Self::CreateRequest) -> RepositoryResult<Channel> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let sql = "INSERT INTO channels (id, name, description, stream_url, logo_url, category,
                   sort_order, is_active, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        sqlx::query(sql)
            .bind(id.to_string())
            .bind(&request.name)
            .bind(&request.description)
            .bind(&request.stream_url)
            .bind(&request.logo_url)
            .bind(&request.category)
            .bind(request.sort_order)
            .bind(request.is_active)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_insert("channels.stream_url", e))?;

        Ok(Channel {
            id,
            name: request.name,
            description: request.description,
            stream_url: request.stream_url,
            logo_url: request.logo_url,
            category: request.category,
            sort_order: request.sort_order,
            is_active: request.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::record_not_found(
                "channels",
                "id",
                id.to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelStore for ChannelRepository {
    async fn find_by_stream_url(&self, stream_url: &str) -> RepositoryResult<Option<Channel>> {
        let sql = format!("SELECT {CHANNEL_COLUMNS} FROM channels WHERE stream_url = ?");

        let row = sqlx::query(&sql)
            .bind(stream_url)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_channel(&row)?)),
            None => Ok(None),
        }
    }

    async fn max_sort_order(&self) -> RepositoryResult<i64> {
        let max = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(sort_order), 0) FROM channels")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn insert_channel(&self, request: ChannelCreateRequest) -> RepositoryResult<Channel> {
        self.create(request).await
    }
}
