//! Channel importer
//!
//! Commits parsed (or caller supplied) channel records to a [`ChannelStore`].
//! Imports are not transactional: each record succeeds, is skipped as a
//! duplicate, or fails on its own, and failures are reported in the result
//! instead of aborting the batch.

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::defaults::DEFAULT_CATEGORY;
use crate::models::{ChannelRecord, ImportRequest, ImportResult};
use crate::repositories::{ChannelCreateRequest, ChannelStore};

pub struct ChannelImporter {
    store: Arc<dyn ChannelStore>,
}

impl ChannelImporter {
    pub fn new(store: Arc<dyn ChannelStore>) -> Self {
        Self { store }
    }

    /// Import every record of the request in order.
    pub async fn import(&self, request: &ImportRequest) -> ImportResult {
        let mut result = ImportResult::default();
        let default_category = match request.default_category.trim() {
            "" => DEFAULT_CATEGORY,
            category => category,
        };

        info!(
            "Importing {} channels ({} category mappings, default category '{}')",
            request.import_data.len(),
            request.category_mapping.len(),
            default_category
        );

        let mut next_sort_order = match self.store.max_sort_order().await {
            Ok(max) => max + 1,
            Err(e) => {
                error!("Unable to read existing channel sort order: {}", e);
                result
                    .errors
                    .push(format!("Unable to read existing channel sort order: {e}"));
                1
            }
        };

        for record in &request.import_data {
            let category = request
                .category_mapping
                .get(&record.category)
                .map(String::as_str)
                .unwrap_or(default_category);
            result.touch_category(category);

            let name = record.name.trim();
            let stream_url = record.stream_url.trim();

            // Duplicates are skipped before any field validation
            if !stream_url.is_empty() {
                match self.store.find_by_stream_url(stream_url).await {
                    Ok(Some(existing)) => {
                        debug!(
                            "Skipping '{}': stream URL already stored as '{}'",
                            name, existing.name
                        );
                        result.skipped += 1;
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("Duplicate check failed for channel '{}': {}", name, e);
                        result.errors.push(Self::failure_message(name, &e.to_string()));
                        continue;
                    }
                }
            }

            let create_request = match Self::sanitize(record, category, next_sort_order) {
                Ok(create_request) => create_request,
                Err(reason) => {
                    warn!("Rejected channel '{}': {}", name, reason);
                    result.errors.push(Self::failure_message(name, &reason));
                    continue;
                }
            };

            match self.store.insert_channel(create_request).await {
                Ok(channel) => {
                    debug!(
                        "Imported channel '{}' ({}) at position {}",
                        channel.name, channel.id, channel.sort_order
                    );
                    result.imported += 1;
                    next_sort_order += 1;
                }
                Err(e) => {
                    error!("Failed to store channel '{}': {}", name, e);
                    result.errors.push(Self::failure_message(name, &e.to_string()));
                }
            }
        }

        info!(
            "Import finished: {} imported, {} skipped, {} errors",
            result.imported,
            result.skipped,
            result.errors.len()
        );

        result
    }

    fn failure_message(name: &str, reason: &str) -> String {
        format!("Failed to import channel '{name}': {reason}")
    }

    /// Trim and validate a record into a create request.
    ///
    /// Name and stream URL are required and the stream URL must parse as an
    /// absolute URL. An unparsable logo URL is dropped rather than rejected.
    fn sanitize(
        record: &ChannelRecord,
        category: &str,
        sort_order: i64,
    ) -> Result<ChannelCreateRequest, String> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err("channel name is empty".to_string());
        }

        let stream_url = record.stream_url.trim();
        if stream_url.is_empty() {
            return Err("stream URL is empty".to_string());
        }
        if let Err(e) = Url::parse(stream_url) {
            return Err(format!("invalid stream URL '{stream_url}': {e}"));
        }

        let mut logo_url = record.logo_url.trim().to_string();
        if !logo_url.is_empty() && Url::parse(&logo_url).is_err() {
            debug!("Dropping invalid logo URL '{}' for '{}'", logo_url, name);
            logo_url.clear();
        }

        Ok(ChannelCreateRequest {
            name: name.to_string(),
            description: record.description.trim().to_string(),
            stream_url: stream_url.to_string(),
            logo_url,
            category: category.to_string(),
            sort_order,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, stream_url: &str, logo_url: &str) -> ChannelRecord {
        ChannelRecord {
            name: name.to_string(),
            stream_url: stream_url.to_string(),
            logo_url: logo_url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sanitize_trims_fields() {
        let request = ChannelImporter::sanitize(
            &record("  News 24 ", " http://example.com/news ", ""),
            "News",
            7,
        )
        .unwrap();

        assert_eq!(request.name, "News 24");
        assert_eq!(request.stream_url, "http://example.com/news");
        assert_eq!(request.category, "News");
        assert_eq!(request.sort_order, 7);
        assert!(request.is_active);
    }

    #[test]
    fn test_sanitize_rejects_missing_fields() {
        assert!(ChannelImporter::sanitize(&record("", "http://x/1", ""), "Other", 1).is_err());
        assert!(ChannelImporter::sanitize(&record("A", "   ", ""), "Other", 1).is_err());
        assert!(ChannelImporter::sanitize(&record("A", "not a url", ""), "Other", 1).is_err());
    }

    #[test]
    fn test_sanitize_drops_invalid_logo() {
        let request =
            ChannelImporter::sanitize(&record("A", "http://x/1", "logo.png"), "Other", 1).unwrap();
        assert_eq!(request.logo_url, "");

        let request =
            ChannelImporter::sanitize(&record("A", "http://x/1", "http://x/logo.png"), "Other", 1)
                .unwrap();
        assert_eq!(request.logo_url, "http://x/logo.png");
    }

    #[test]
    fn test_failure_message_names_record() {
        assert_eq!(
            ChannelImporter::failure_message("Bad", "boom"),
            "Failed to import channel 'Bad': boom"
        );
    }
}
