use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use m3u_importer::{
    config::Config,
    database::Database,
    models::{ExportFormat, ImportRequest, PlaylistSource},
    repositories::ChannelQuery,
    services::{ImportService, PlaylistService},
    utils::PlaylistFetcher,
};

#[derive(Parser)]
#[command(name = "m3u-importer")]
#[command(version)]
#[command(about = "Import M3U playlists into a channel store and export them again")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a playlist and print the channels without storing them
    Preview {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Parse a playlist and import its channels
    Import {
        #[command(flatten)]
        source: SourceArgs,

        /// Category mapping entry, e.g. --map Sports=Sport
        #[arg(long = "map", value_name = "SRC=DST", value_parser = parse_mapping)]
        mappings: Vec<(String, String)>,

        /// Keep every parsed category instead of falling back to the default
        #[arg(long)]
        keep_categories: bool,

        /// Category for channels without a mapping (overrides config file)
        #[arg(long, value_name = "LABEL")]
        default_category: Option<String>,
    },
    /// Export a stored playlist
    Export {
        #[arg(long, value_name = "UUID")]
        playlist: Uuid,

        #[arg(long, default_value = "m3u")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage playlists
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },
    /// Inspect stored channels
    Channels {
        #[command(subcommand)]
        action: ChannelsAction,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Local playlist file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Remote playlist URL
    #[arg(long)]
    url: Option<String>,
}

impl SourceArgs {
    fn into_source(self) -> Result<PlaylistSource> {
        match (self.file, self.url) {
            (Some(path), _) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(PlaylistSource::Content(content))
            }
            (None, Some(url)) => Ok(PlaylistSource::Url(url)),
            (None, None) => anyhow::bail!("either --file or --url is required"),
        }
    }
}

#[derive(Subcommand)]
enum PlaylistAction {
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Fill the playlist with every active channel
        #[arg(long)]
        all_channels: bool,
    },
    List,
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum ChannelsAction {
    List {
        #[arg(long)]
        category: Option<String>,
    },
    Categories,
}

fn parse_mapping(value: &str) -> Result<(String, String), String> {
    let (source, target) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SRC=DST, got '{value}'"))?;
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        return Err(format!("expected SRC=DST, got '{value}'"));
    }
    Ok((source.to_string(), target.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON and exports
    let log_filter = format!("m3u_importer={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting M3U Importer v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let fetcher = PlaylistFetcher::from_config(&config.import)?;
    let import_service = ImportService::new(
        Arc::new(database.channel_repository()),
        database.playlist_repository(),
        fetcher,
    );
    let playlist_service =
        PlaylistService::new(database.playlist_repository(), database.channel_repository());

    match cli.command {
        Command::Preview { source } => {
            let parsed = import_service
                .parse_preview(&source.into_source()?)
                .await?;
            print_json(&parsed)?;
        }
        Command::Import {
            source,
            mappings,
            keep_categories,
            default_category,
        } => {
            let parsed = import_service
                .parse_preview(&source.into_source()?)
                .await?;

            let mut category_mapping: HashMap<String, String> = HashMap::new();
            if keep_categories {
                for category in &parsed.categories {
                    category_mapping.insert(category.clone(), category.clone());
                }
            }
            category_mapping.extend(mappings);

            let request = ImportRequest {
                import_data: parsed.channels,
                category_mapping,
                default_category: default_category
                    .unwrap_or_else(|| config.import.default_category.clone()),
            };
            print_json(&import_service.import(&request).await)?;
        }
        Command::Export {
            playlist,
            format,
            output,
        } => {
            let rendered = import_service.export(playlist, format).await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Playlist written to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Command::Playlist { action } => match action {
            PlaylistAction::Create {
                name,
                description,
                all_channels,
            } => {
                if all_channels {
                    let (playlist, _) = playlist_service
                        .playlist_from_all_channels(&name, &description)
                        .await?;
                    print_json(&playlist)?;
                } else {
                    let playlist = playlist_service.create_playlist(&name, &description).await?;
                    print_json(&playlist)?;
                }
            }
            PlaylistAction::List => print_json(&playlist_service.list_playlists().await?)?,
            PlaylistAction::Delete { id } => playlist_service.delete_playlist(id).await?,
        },
        Command::Channels { action } => match action {
            ChannelsAction::List { category } => {
                let mut query = ChannelQuery::new();
                if let Some(category) = category {
                    query = query.category(category);
                }
                print_json(&playlist_service.list_channels(query).await?)?;
            }
            ChannelsAction::Categories => {
                print_json(&playlist_service.list_categories().await?)?
            }
        },
    }

    Ok(())
}
