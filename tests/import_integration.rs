//! Importer behaviour against a real SQLite store
//!
//! Covers duplicate handling, per-record failure isolation, category mapping
//! and sort order continuation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use m3u_importer::{
    database::Database,
    errors::{RepositoryError, RepositoryResult},
    ingestor::ChannelImporter,
    models::{Channel, ChannelRecord, ImportRequest},
    repositories::{ChannelCreateRequest, ChannelQuery, ChannelRepository, ChannelStore},
};

async fn create_test_database() -> Database {
    Database::in_memory()
        .await
        .expect("Failed to create in-memory database")
}

fn record(name: &str, stream_url: &str, category: &str) -> ChannelRecord {
    ChannelRecord {
        name: name.to_string(),
        stream_url: stream_url.to_string(),
        category: category.to_string(),
        ..Default::default()
    }
}

fn request(records: Vec<ChannelRecord>, mapping: &[(&str, &str)]) -> ImportRequest {
    ImportRequest {
        import_data: records,
        category_mapping: mapping
            .iter()
            .map(|(src, dst)| (src.to_string(), dst.to_string()))
            .collect(),
        default_category: "Other".to_string(),
    }
}

/// Store that refuses to insert one named channel
struct FailingStore {
    inner: ChannelRepository,
    reject_name: String,
}

#[async_trait]
impl ChannelStore for FailingStore {
    async fn find_by_stream_url(&self, stream_url: &str) -> RepositoryResult<Option<Channel>> {
        self.inner.find_by_stream_url(stream_url).await
    }

    async fn max_sort_order(&self) -> RepositoryResult<i64> {
        self.inner.max_sort_order().await
    }

    async fn insert_channel(&self, request: ChannelCreateRequest) -> RepositoryResult<Channel> {
        if request.name == self.reject_name {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(
                "disk full".to_string(),
            )));
        }
        self.inner.insert_channel(request).await
    }
}

/// Store whose reads fail while inserts still work
struct UnreadableStore {
    inner: ChannelRepository,
}

#[async_trait]
impl ChannelStore for UnreadableStore {
    async fn find_by_stream_url(&self, stream_url: &str) -> RepositoryResult<Option<Channel>> {
        self.inner.find_by_stream_url(stream_url).await
    }

    async fn max_sort_order(&self) -> RepositoryResult<i64> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn insert_channel(&self, request: ChannelCreateRequest) -> RepositoryResult<Channel> {
        self.inner.insert_channel(request).await
    }
}

#[tokio::test]
async fn test_duplicate_stream_url_in_batch_is_skipped() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    let result = importer
        .import(&request(
            vec![
                record("First", "http://example.com/same", "News"),
                record("Second", "http://example.com/same", "News"),
            ],
            &[],
        ))
        .await;

    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.errors.is_empty());

    let stored = db
        .channel_repository()
        .find_all(ChannelQuery::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "First");
}

#[tokio::test]
async fn test_reimport_skips_everything() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));
    let batch = request(
        vec![
            record("A", "http://example.com/a", "News"),
            record("B", "http://example.com/b", "Sports"),
        ],
        &[],
    );

    let first = importer.import(&batch).await;
    let second = importer.import(&batch).await;

    assert_eq!(first.imported, 2);
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 2);
}

#[tokio::test]
async fn test_failed_insert_is_reported_and_others_continue() {
    let db = create_test_database().await;
    let store = FailingStore {
        inner: db.channel_repository(),
        reject_name: "Broken".to_string(),
    };
    let importer = ChannelImporter::new(Arc::new(store));

    let result = importer
        .import(&request(
            vec![
                record("Good One", "http://example.com/1", "News"),
                record("Broken", "http://example.com/2", "News"),
                record("Good Two", "http://example.com/3", "News"),
            ],
            &[],
        ))
        .await;

    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Failed to import channel 'Broken':"));
    assert!(result.errors[0].contains("disk full"));

    let stored = db
        .channel_repository()
        .find_all(ChannelQuery::new())
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_invalid_records_are_reported() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    let result = importer
        .import(&request(
            vec![
                record("No Url", "", "News"),
                record("", "http://example.com/nameless", "News"),
                record("Fine", "http://example.com/fine", "News"),
            ],
            &[],
        ))
        .await;

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].starts_with("Failed to import channel 'No Url':"));
}

#[tokio::test]
async fn test_category_mapping_and_default() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    let result = importer
        .import(&request(
            vec![
                record("Match Day", "http://example.com/match", "Sports"),
                record("Headlines", "http://example.com/headlines", "News"),
            ],
            &[("Sports", "Sport Channels")],
        ))
        .await;

    assert_eq!(result.imported, 2);
    assert_eq!(result.categories_created, vec!["Sport Channels", "Other"]);

    let repo = db.channel_repository();
    let match_day = repo
        .find_by_stream_url("http://example.com/match")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(match_day.category, "Sport Channels");

    let headlines = repo
        .find_by_stream_url("http://example.com/headlines")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(headlines.category, "Other");
}

#[tokio::test]
async fn test_sort_order_continues_from_store_maximum() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    importer
        .import(&request(
            vec![
                record("A", "http://example.com/a", "News"),
                record("B", "http://example.com/b", "News"),
            ],
            &[],
        ))
        .await;
    importer
        .import(&request(
            vec![
                record("A again", "http://example.com/a", "News"),
                record("C", "http://example.com/c", "News"),
            ],
            &[],
        ))
        .await;

    let stored = db
        .channel_repository()
        .find_all(ChannelQuery::new())
        .await
        .unwrap();
    let orders: HashMap<String, i64> = stored
        .into_iter()
        .map(|c| (c.name, c.sort_order))
        .collect();

    assert_eq!(orders["A"], 1);
    assert_eq!(orders["B"], 2);
    assert_eq!(orders["C"], 3);
}

#[tokio::test]
async fn test_unreadable_sort_order_starts_at_one() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(UnreadableStore {
        inner: db.channel_repository(),
    }));

    let result = importer
        .import(&request(vec![record("A", "http://example.com/a", "News")], &[]))
        .await;

    assert_eq!(result.imported, 1);
    assert_eq!(result.errors.len(), 1);

    let stored = db
        .channel_repository()
        .find_by_stream_url("http://example.com/a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.sort_order, 1);
}

#[tokio::test]
async fn test_imported_channels_are_active() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    let mut inactive = record("Dormant", "http://example.com/dormant", "News");
    inactive.is_active = false;
    importer.import(&request(vec![inactive], &[])).await;

    let active = db
        .channel_repository()
        .find_all(ChannelQuery::new().active(true))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_duplicate_is_skipped_before_field_validation() {
    let db = create_test_database().await;
    let importer = ChannelImporter::new(Arc::new(db.channel_repository()));

    let result = importer
        .import(&request(
            vec![
                record("A", "http://example.com/same", "News"),
                record("", "  http://example.com/same ", "News"),
            ],
            &[],
        ))
        .await;

    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.errors.is_empty());
}
