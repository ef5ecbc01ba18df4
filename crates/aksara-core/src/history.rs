//! Generation history types.
//!
//! Every completed generation appends one [`HistoryEntry`], keyed by user and
//! feature. Entries are append-only: the application never mutates or deletes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{HistoryId, UserId};

/// Maximum stored title length, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum stored excerpt length, in characters.
pub const EXCERPT_MAX_CHARS: usize = 300;

/// The metered creative-writing features.
///
/// The serialized form is the feature tag stored in history records and used
/// in `/api/history/:feature` paths (`chat`, `cerpen`, `novel_create`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Conversational assistant.
    Chat,
    /// Short story (cerpen).
    Cerpen,
    /// Film screenplay (skenario).
    Skenario,
    /// Rewrite / editorial critique.
    Rewrite,
    /// Novel suite: opening chapter.
    NovelCreate,
    /// Novel suite: continue an existing story.
    NovelContinue,
    /// Novel suite: chapter outline.
    NovelOutline,
    /// Novel suite: character profile.
    NovelCharacter,
    /// Novel suite: worldbuilding.
    NovelWorld,
}

impl Feature {
    /// The feature tag as stored in history records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Cerpen => "cerpen",
            Self::Skenario => "skenario",
            Self::Rewrite => "rewrite",
            Self::NovelCreate => "novel_create",
            Self::NovelContinue => "novel_continue",
            Self::NovelOutline => "novel_outline",
            Self::NovelCharacter => "novel_character",
            Self::NovelWorld => "novel_world",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ParseFeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "cerpen" => Ok(Self::Cerpen),
            "skenario" => Ok(Self::Skenario),
            "rewrite" => Ok(Self::Rewrite),
            "novel_create" => Ok(Self::NovelCreate),
            "novel_continue" => Ok(Self::NovelContinue),
            "novel_outline" => Ok(Self::NovelOutline),
            "novel_character" => Ok(Self::NovelCharacter),
            "novel_world" => Ok(Self::NovelWorld),
            _ => Err(ParseFeatureError(s.to_string())),
        }
    }
}

/// Error returned when a string is not a known feature tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature: {0}")]
pub struct ParseFeatureError(pub String);

/// A persisted record of one completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry id.
    pub id: HistoryId,

    /// Owning user.
    pub user_id: UserId,

    /// Which feature produced this entry.
    pub feature: Feature,

    /// Short title, truncated to [`TITLE_MAX_CHARS`].
    pub title: String,

    /// Leading slice of the content, truncated to [`EXCERPT_MAX_CHARS`].
    pub excerpt: String,

    /// Full generated content.
    pub content: String,

    /// Tokens charged for this generation.
    #[serde(default)]
    pub tokens_used: i64,

    /// When the generation completed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build an entry from a generation result.
    ///
    /// An empty title falls back to the feature tag. Title and excerpt are
    /// truncated on character boundaries.
    #[must_use]
    pub fn new(
        user_id: UserId,
        feature: Feature,
        title: &str,
        content: impl Into<String>,
        tokens_used: i64,
    ) -> Self {
        let content = content.into();
        let title = if title.trim().is_empty() {
            feature.as_str().to_string()
        } else {
            truncate_chars(title, TITLE_MAX_CHARS)
        };

        Self {
            id: HistoryId::generate(),
            user_id,
            feature,
            title,
            excerpt: truncate_chars(&content, EXCERPT_MAX_CHARS),
            content,
            tokens_used,
            timestamp: Utc::now(),
        }
    }
}

/// One message of a legacy chat session (`memory.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyMessage {
    /// Message role (`user` or `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Truncate a string to at most `max` characters, on a character boundary.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_tag_roundtrip() {
        for feature in [
            Feature::Chat,
            Feature::Cerpen,
            Feature::Skenario,
            Feature::Rewrite,
            Feature::NovelCreate,
            Feature::NovelContinue,
            Feature::NovelOutline,
            Feature::NovelCharacter,
            Feature::NovelWorld,
        ] {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
        assert!("screenplay".parse::<Feature>().is_err());
    }

    #[test]
    fn feature_serde_matches_tag() {
        let json = serde_json::to_string(&Feature::NovelCreate).unwrap();
        assert_eq!(json, "\"novel_create\"");
    }

    #[test]
    fn entry_truncates_title_and_excerpt() {
        let long_title = "t".repeat(500);
        let long_content = "c".repeat(1000);
        let entry = HistoryEntry::new(UserId::generate(), Feature::Cerpen, &long_title, long_content, 8);
        assert_eq!(entry.title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(entry.excerpt.chars().count(), EXCERPT_MAX_CHARS);
        assert_eq!(entry.content.len(), 1000);
        assert_eq!(entry.tokens_used, 8);
    }

    #[test]
    fn entry_title_falls_back_to_feature_tag() {
        let entry = HistoryEntry::new(UserId::generate(), Feature::Chat, "  ", "hi there", 1);
        assert_eq!(entry.title, "chat");
        assert_eq!(entry.excerpt, "hi there");
    }

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let s = "péñ".repeat(100);
        let truncated = truncate_chars(&s, 10);
        assert_eq!(truncated.chars().count(), 10);
    }
}
