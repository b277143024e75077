/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./m3u-importer.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Import defaults
pub const DEFAULT_FETCH_TIMEOUT: &str = "30s";
pub const DEFAULT_CATEGORY: &str = "Other";

pub fn default_user_agent() -> String {
    format!("m3u-importer/{}", env!("CARGO_PKG_VERSION"))
}
