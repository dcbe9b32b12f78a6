//! Media types, categories, and the secondary progress metric.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category assigned when an item is created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Maximum length of a free-text category.
pub const MAX_CATEGORY_LEN: usize = 100;

/// The kind of content a media item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
    Book,
    Game,
    Task,
}

/// All media types, in the order they are listed in error messages.
pub const ALL_MEDIA_TYPES: [MediaType; 5] = [
    MediaType::Movie,
    MediaType::Tv,
    MediaType::Book,
    MediaType::Game,
    MediaType::Task,
];

impl MediaType {
    /// The lowercase token stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Book => "book",
            MediaType::Game => "game",
            MediaType::Task => "task",
        }
    }

    /// Parse a selector token, case-insensitively. Returns `None` for
    /// anything that is not a media type (such selectors are categories).
    pub fn from_selector(selector: &str) -> Option<Self> {
        let token = selector.trim();
        ALL_MEDIA_TYPES
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(token))
    }

    /// The secondary counter tracked for this media type, if any.
    pub fn secondary_metric(self) -> Option<SecondaryMetric> {
        match self {
            MediaType::Book => Some(SecondaryMetric::Pages),
            MediaType::Task => Some(SecondaryMetric::Units),
            MediaType::Movie | MediaType::Tv | MediaType::Game => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::from_selector(s).ok_or_else(|| {
            let valid: Vec<&str> = ALL_MEDIA_TYPES.iter().map(|t| t.as_str()).collect();
            CoreError::Validation(format!(
                "Invalid media type '{s}'. Must be one of: {}",
                valid.join(", ")
            ))
        })
    }
}

/// Which secondary counter a progress value refers to.
///
/// Books count pages and tasks count generic units; both share one stored
/// aggregate on a lock, so the metric travels with the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryMetric {
    Pages,
    Units,
}

/// Normalise a user-supplied category: trimmed, defaulting to
/// [`DEFAULT_CATEGORY`] when blank.
pub fn normalize_category(category: Option<&str>) -> Result<String, CoreError> {
    let trimmed = category.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Ok(DEFAULT_CATEGORY.to_string());
    }
    if trimmed.chars().count() > MAX_CATEGORY_LEN {
        return Err(CoreError::Validation(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Categories compare case-insensitively after trimming.
pub fn category_matches(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!("book".parse::<MediaType>().unwrap(), MediaType::Book);
        assert_eq!("TV".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert_eq!(MediaType::from_selector(" Task "), Some(MediaType::Task));
    }

    #[test]
    fn unknown_token_is_not_a_media_type() {
        assert_eq!(MediaType::from_selector("Sci-Fi"), None);
        let err = "podcast".parse::<MediaType>().unwrap_err();
        assert!(err.to_string().contains("movie, tv, book, game, task"));
    }

    #[test]
    fn secondary_metric_per_type() {
        assert_eq!(
            MediaType::Book.secondary_metric(),
            Some(SecondaryMetric::Pages)
        );
        assert_eq!(
            MediaType::Task.secondary_metric(),
            Some(SecondaryMetric::Units)
        );
        assert_eq!(MediaType::Movie.secondary_metric(), None);
        assert_eq!(MediaType::Tv.secondary_metric(), None);
        assert_eq!(MediaType::Game.secondary_metric(), None);
    }

    #[test]
    fn blank_category_defaults_to_general() {
        assert_eq!(normalize_category(None).unwrap(), "General");
        assert_eq!(normalize_category(Some("   ")).unwrap(), "General");
        assert_eq!(normalize_category(Some(" Sci-Fi ")).unwrap(), "Sci-Fi");
    }

    #[test]
    fn overlong_category_is_rejected() {
        let long = "x".repeat(MAX_CATEGORY_LEN + 1);
        assert!(normalize_category(Some(&long)).is_err());
    }

    #[test]
    fn category_comparison_ignores_case_and_padding() {
        assert!(category_matches("Sci-Fi", " sci-fi"));
        assert!(!category_matches("Sci-Fi", "Fantasy"));
    }

    #[test]
    fn serde_uses_lowercase_tokens() {
        let json = serde_json::to_string(&MediaType::Tv).unwrap();
        assert_eq!(json, "\"tv\"");
        let parsed: MediaType = serde_json::from_str("\"game\"").unwrap();
        assert_eq!(parsed, MediaType::Game);
    }
}
