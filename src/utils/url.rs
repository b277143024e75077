//! URL utilities for consistent URL handling

use url::Url;

const MASK: &str = "****";

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Whether the URL parses and uses HTTP or HTTPS
    ///
    /// # Examples
    ///
    /// ```rust
    /// use m3u_importer::utils::url::UrlUtils;
    ///
    /// assert!(UrlUtils::is_http("https://example.com/list.m3u"));
    /// assert!(!UrlUtils::is_http("ftp://example.com/list.m3u"));
    /// assert!(!UrlUtils::is_http("example.com/list.m3u"));
    /// ```
    pub fn is_http(url: &str) -> bool {
        match Url::parse(url.trim()) {
            Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
            Err(_) => false,
        }
    }

    /// Mask credentials in a URL before it is logged or reported
    ///
    /// Covers `user:pass@host` authority credentials and the `username` /
    /// `password` query parameters IPTV panels put in playlist URLs. Input
    /// that doesn't parse is returned unchanged.
    pub fn obfuscate_credentials(url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        let has_authority_credentials = !parsed.username().is_empty() || parsed.password().is_some();
        let has_query_credentials = parsed
            .query_pairs()
            .any(|(key, _)| Self::is_credential_param(&key));

        if !has_authority_credentials && !has_query_credentials {
            return url.to_string();
        }

        if has_authority_credentials {
            // Only fails for URLs that cannot carry credentials at all
            let _ = parsed.set_username(MASK);
            let _ = parsed.set_password(Some(MASK));
        }

        if has_query_credentials {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(key, value)| {
                    let value = if Self::is_credential_param(&key) {
                        MASK.to_string()
                    } else {
                        value.into_owned()
                    };
                    (key.into_owned(), value)
                })
                .collect();
            parsed.query_pairs_mut().clear().extend_pairs(pairs);
        }

        parsed.to_string()
    }

    fn is_credential_param(key: &str) -> bool {
        key.eq_ignore_ascii_case("username") || key.eq_ignore_ascii_case("password")
    }
}
