//! Service layer tests: preview, import, playlists and export end to end

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use m3u_importer::{
    database::Database,
    errors::AppError,
    ingestor::M3uParser,
    models::{ExportFormat, ParsedPlaylist, PlaylistSource},
    repositories::ChannelQuery,
    services::{ImportService, PlaylistService},
    utils::PlaylistFetcher,
};

const SAMPLE: &str = include_str!("fixtures/sample.m3u");

struct TestContext {
    db: Database,
    imports: ImportService,
    playlists: PlaylistService,
}

async fn create_test_context() -> TestContext {
    let db = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    let fetcher = PlaylistFetcher::new(Duration::from_secs(5), "m3u-importer-tests")
        .expect("Failed to build HTTP client");

    let imports = ImportService::new(
        Arc::new(db.channel_repository()),
        db.playlist_repository(),
        fetcher,
    );
    let playlists = PlaylistService::new(db.playlist_repository(), db.channel_repository());

    TestContext {
        db,
        imports,
        playlists,
    }
}

fn identity_mapping(parsed: &ParsedPlaylist) -> HashMap<String, String> {
    parsed
        .categories
        .iter()
        .map(|c| (c.clone(), c.clone()))
        .collect()
}

#[tokio::test]
async fn test_preview_sample_fixture() {
    let ctx = create_test_context().await;
    let parsed = ctx
        .imports
        .parse_preview(&PlaylistSource::Content(SAMPLE.to_string()))
        .await
        .unwrap();

    assert_eq!(parsed.total_count, 5);
    assert_eq!(parsed.channels.len(), parsed.total_count);
    assert_eq!(
        parsed.categories,
        vec!["News", "Sports", "Weird-category", "Other", "Kids"]
    );

    let names: Vec<&str> = parsed.channels.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["News One", "Sport Plus", "Oddball TV", "Untitled Group", "Cartoon Time"]
    );

    let first = &parsed.channels[0];
    assert_eq!(first.description, "ID: news.one");
    assert_eq!(first.logo_url, "http://logos.example.com/news1.png");
    assert_eq!(first.stream_url, "http://streams.example.com/news1.m3u8");

    // Preview never touches the store
    let stored = ctx.playlists.list_channels(ChannelQuery::new()).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_import_from_source_without_mapping_uses_default() {
    let ctx = create_test_context().await;
    let result = ctx
        .imports
        .import_from_source(
            &PlaylistSource::Content(SAMPLE.to_string()),
            HashMap::new(),
            "Misc".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(result.imported, 5);
    assert_eq!(result.categories_created, vec!["Misc"]);
    assert_eq!(ctx.playlists.list_categories().await.unwrap(), vec!["Misc"]);
}

#[tokio::test]
async fn test_round_trip_through_export() {
    let ctx = create_test_context().await;
    let source = PlaylistSource::Content(SAMPLE.to_string());

    let parsed = ctx.imports.parse_preview(&source).await.unwrap();
    let result = ctx
        .imports
        .import_from_source(&source, identity_mapping(&parsed), "Other".to_string())
        .await
        .unwrap();
    assert_eq!(result.imported, parsed.total_count);
    assert!(result.errors.is_empty());

    let (playlist, added) = ctx
        .playlists
        .playlist_from_all_channels("Everything", "")
        .await
        .unwrap();
    assert_eq!(added, parsed.total_count as u64);

    let exported = ctx.imports.export(playlist.id, ExportFormat::M3u).await.unwrap();
    assert!(exported.starts_with("#EXTM3U\n"));

    let reparsed = M3uParser::new().parse(&exported);
    assert_eq!(reparsed.total_count, parsed.total_count);
    for (original, round_tripped) in parsed.channels.iter().zip(&reparsed.channels) {
        assert_eq!(round_tripped.name, original.name);
        assert_eq!(round_tripped.stream_url, original.stream_url);
        assert_eq!(round_tripped.logo_url, original.logo_url);
        assert_eq!(round_tripped.category, original.category);
    }
}

#[tokio::test]
async fn test_round_trip_drops_repeated_stream_url() {
    let ctx = create_test_context().await;
    let content = format!(
        "{SAMPLE}#EXTINF:-1 group-title=\"news\",News Repeat\nhttp://streams.example.com/news1.m3u8\n"
    );
    let source = PlaylistSource::Content(content);

    let parsed = ctx.imports.parse_preview(&source).await.unwrap();
    assert_eq!(parsed.total_count, 6);

    let result = ctx
        .imports
        .import_from_source(&source, identity_mapping(&parsed), "Other".to_string())
        .await
        .unwrap();
    assert_eq!(result.imported, 5);
    assert_eq!(result.skipped, 1);
    assert!(result.errors.is_empty());

    let (playlist, _) = ctx
        .playlists
        .playlist_from_all_channels("Deduplicated", "")
        .await
        .unwrap();
    let exported = ctx.imports.export(playlist.id, ExportFormat::M3u).await.unwrap();
    let reparsed = M3uParser::new().parse(&exported);

    let mut seen = HashSet::new();
    let unique: Vec<_> = parsed
        .channels
        .iter()
        .filter(|c| seen.insert(c.stream_url.clone()))
        .collect();
    assert_eq!(reparsed.channels.len(), unique.len());
    for (original, round_tripped) in unique.iter().zip(&reparsed.channels) {
        assert_eq!(round_tripped.name, original.name);
        assert_eq!(round_tripped.stream_url, original.stream_url);
        assert_eq!(round_tripped.logo_url, original.logo_url);
        assert_eq!(round_tripped.category, original.category);
    }
    assert!(!reparsed.channels.iter().any(|c| c.name == "News Repeat"));
}

#[tokio::test]
async fn test_export_json() {
    let ctx = create_test_context().await;
    ctx.imports
        .import_from_source(
            &PlaylistSource::Content(SAMPLE.to_string()),
            HashMap::new(),
            "Other".to_string(),
        )
        .await
        .unwrap();
    let (playlist, _) = ctx
        .playlists
        .playlist_from_all_channels("Json", "")
        .await
        .unwrap();

    let exported = ctx.imports.export_named(playlist.id, "JSON").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(5));
    assert_eq!(value[0]["name"], "News One");
}

#[tokio::test]
async fn test_export_errors() {
    let ctx = create_test_context().await;

    let missing = ctx.imports.export(Uuid::new_v4(), ExportFormat::M3u).await;
    assert!(matches!(missing, Err(AppError::NotFound { .. })));

    let playlist = ctx.playlists.create_playlist("Empty", "").await.unwrap();
    let bad_format = ctx.imports.export_named(playlist.id, "xspf").await;
    assert!(matches!(bad_format, Err(AppError::Validation { .. })));

    let empty = ctx.imports.export(playlist.id, ExportFormat::M3u).await.unwrap();
    assert_eq!(empty, "#EXTM3U\n");
}

#[tokio::test]
async fn test_playlist_management() {
    let ctx = create_test_context().await;
    ctx.imports
        .import_from_source(
            &PlaylistSource::Content(SAMPLE.to_string()),
            HashMap::new(),
            "Other".to_string(),
        )
        .await
        .unwrap();

    assert!(matches!(
        ctx.playlists.create_playlist("   ", "").await,
        Err(AppError::Validation { .. })
    ));

    let playlist = ctx
        .playlists
        .create_playlist("Favourites", "hand picked")
        .await
        .unwrap();
    let channels = ctx.playlists.list_channels(ChannelQuery::new()).await.unwrap();
    let last = channels.last().unwrap();

    assert!(ctx
        .playlists
        .add_channel_to_playlist(playlist.id, last.id)
        .await
        .unwrap());
    assert!(!ctx
        .playlists
        .add_channel_to_playlist(playlist.id, last.id)
        .await
        .unwrap());
    assert!(matches!(
        ctx.playlists
            .add_channel_to_playlist(playlist.id, Uuid::new_v4())
            .await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        ctx.playlists
            .add_channel_to_playlist(Uuid::new_v4(), last.id)
            .await,
        Err(AppError::NotFound { .. })
    ));

    let listed = ctx.playlists.list_playlists().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].playlist.name, "Favourites");
    assert_eq!(listed[0].channel_count, 1);

    ctx.playlists.delete_playlist(playlist.id).await.unwrap();
    assert!(ctx.playlists.list_playlists().await.unwrap().is_empty());
    assert!(matches!(
        ctx.playlists.delete_playlist(playlist.id).await,
        Err(AppError::NotFound { .. })
    ));

    // Deleting a playlist leaves its channels in place
    let remaining = ctx.playlists.list_channels(ChannelQuery::new()).await.unwrap();
    assert_eq!(remaining.len(), channels.len());
}

#[tokio::test]
async fn test_list_channels_by_category() {
    let ctx = create_test_context().await;
    let source = PlaylistSource::Content(SAMPLE.to_string());
    let parsed = ctx.imports.parse_preview(&source).await.unwrap();
    ctx.imports
        .import_from_source(&source, identity_mapping(&parsed), "Other".to_string())
        .await
        .unwrap();

    let sports = ctx
        .playlists
        .list_channels(ChannelQuery::new().category("Sports"))
        .await
        .unwrap();
    assert_eq!(sports.len(), 1);
    assert_eq!(sports[0].name, "Sport Plus");

    let categories = ctx.playlists.list_categories().await.unwrap();
    assert_eq!(
        categories,
        vec!["Kids", "News", "Other", "Sports", "Weird-category"]
    );
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let ctx = create_test_context().await;
    ctx.db.migrate().await.unwrap();
    ctx.db.migrate().await.unwrap();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&ctx.db.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}
