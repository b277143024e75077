//! Category normalization
//!
//! Maps raw `group-title` labels onto the canonical category vocabulary.
//! Unknown labels are title-cased and passed through rather than rejected.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Lower-cased source label to canonical label
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("news", "News"),
    ("sport", "Sports"),
    ("sports", "Sports"),
    ("movie", "Movies"),
    ("movies", "Movies"),
    ("film", "Movies"),
    ("films", "Movies"),
    ("cinema", "Movies"),
    ("entertainment", "Entertainment"),
    ("general", "Entertainment"),
    ("kids", "Kids"),
    ("children", "Kids"),
    ("cartoon", "Kids"),
    ("cartoons", "Kids"),
    ("music", "Music"),
    ("documentary", "Documentary"),
    ("documentaries", "Documentary"),
    ("lifestyle", "Lifestyle"),
    ("religious", "Religious"),
    ("religion", "Religious"),
    ("education", "Education"),
    ("educational", "Education"),
    ("business", "Business"),
    ("comedy", "Comedy"),
    ("series", "Series"),
    ("weather", "Weather"),
    ("shop", "Shopping"),
    ("shopping", "Shopping"),
    ("international", "International"),
    ("local", "Local"),
    ("other", "Other"),
];

fn alias_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| CATEGORY_ALIASES.iter().copied().collect())
}

/// Normalize a raw category label.
///
/// Known labels (case-insensitive) map to their canonical form. Anything else
/// is trimmed and title-cased word by word. Blank input yields an empty
/// string; callers decide what an absent category means.
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match alias_table().get(trimmed.to_lowercase().as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => title_case(trimmed),
    }
}

/// Upper-case the first letter of each whitespace-separated word and
/// lower-case the rest
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut at_word_start = true;

    for ch in value.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            result.push(ch);
        } else if at_word_start {
            result.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            result.extend(ch.to_lowercase());
        }
    }

    result
}
