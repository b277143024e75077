use crate::assets::MigrationAssets;
use crate::config::DatabaseConfig;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::repositories::{ChannelRepository, PlaylistRepository};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub fn pool(&self) -> Pool<Sqlite> {
        self.pool.clone()
    }

    pub async fn new(config: &DatabaseConfig) -> RepositoryResult<Self> {
        // Create database if it doesn't exist (file-backed SQLite only)
        if !config.is_in_memory() && !Sqlite::database_exists(&config.url).await? {
            info!("Creating database at {}", config.url);
            Sqlite::create_database(&config.url).await?;
        }

        let mut options =
            SqlitePoolOptions::new().max_connections(config.effective_max_connections());
        if config.is_in_memory() {
            // The schema lives and dies with the single connection
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(&config.url).await?;

        Ok(Self { pool })
    }

    /// Open a private in-memory database with migrations applied
    pub async fn in_memory() -> RepositoryResult<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: Some(1),
        };
        let database = Self::new(&config).await?;
        database.migrate().await?;
        Ok(database)
    }

    pub fn channel_repository(&self) -> ChannelRepository {
        ChannelRepository::new(self.pool())
    }

    pub fn playlist_repository(&self) -> PlaylistRepository {
        PlaylistRepository::new(self.pool())
    }

    pub async fn migrate(&self) -> RepositoryResult<()> {
        self.run_embedded_migrations().await
    }

    async fn run_embedded_migrations(&self) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                success BOOLEAN NOT NULL,
                checksum BLOB NOT NULL,
                execution_time BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for (name, content) in MigrationAssets::get_migrations() {
            // "001_initial_schema.sql" -> 1
            let version: i64 = name
                .split('_')
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| RepositoryError::MigrationFailed {
                    version: name.clone(),
                    message: "migration file name must start with a numeric version".to_string(),
                })?;

            let existing = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM schema_migrations WHERE version = ? AND success = true",
            )
            .bind(version)
            .fetch_one(&self.pool)
            .await?;

            if existing > 0 {
                debug!("Migration {} already applied", name);
                continue;
            }

            let start = std::time::Instant::now();
            let mut transaction = self.pool.begin().await?;

            match sqlx::query(&content).execute(&mut *transaction).await {
                Ok(_) => {
                    let execution_time = start.elapsed().as_millis() as i64;
                    let checksum = Self::calculate_checksum(&content);

                    sqlx::query(
                        r#"
                        INSERT INTO schema_migrations (version, description, success, checksum, execution_time)
                        VALUES (?, ?, true, ?, ?)
                        "#,
                    )
                    .bind(version)
                    .bind(&name)
                    .bind(&checksum)
                    .bind(execution_time)
                    .execute(&mut *transaction)
                    .await?;

                    transaction.commit().await?;
                    info!("Applied migration: {} ({}ms)", name, execution_time);
                }
                Err(e) => {
                    transaction.rollback().await?;
                    return Err(RepositoryError::MigrationFailed {
                        version: name,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn calculate_checksum(content: &str) -> Vec<u8> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish().to_be_bytes().to_vec()
    }
}
