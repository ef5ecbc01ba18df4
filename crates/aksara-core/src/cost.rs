//! The token cost model.
//!
//! Every metered feature charges a flat floor plus a linear term in the
//! requested output size (target words, source words, or chapter count).
//! Costs are computed before the AI call so an insufficient balance refuses
//! the request without touching the provider.

use crate::Feature;

/// Flat cost of one chat turn.
pub const CHAT_COST: i64 = 1;

/// Flat cost of a character profile.
pub const NOVEL_CHARACTER_COST: i64 = 3;

/// Flat cost of a worldbuilding pass.
pub const NOVEL_WORLD_COST: i64 = 4;

/// Cost of a short story targeting `target_words` words.
#[must_use]
pub fn cerpen_cost(target_words: u32) -> i64 {
    3 + i64::from(target_words.div_ceil(100))
}

/// Cost of a screenplay generated from a `description_words`-word description.
#[must_use]
pub fn skenario_cost(description_words: u32) -> i64 {
    4 + i64::from(description_words.div_ceil(50))
}

/// Cost of rewriting/critiquing a `text_words`-word text.
#[must_use]
pub fn rewrite_cost(text_words: u32) -> i64 {
    2 + i64::from(text_words.div_ceil(100))
}

/// Cost of an opening novel chapter targeting `target_words` words.
#[must_use]
pub fn novel_create_cost(target_words: u32) -> i64 {
    5 + i64::from(target_words.div_ceil(100))
}

/// Cost of continuing a novel by `target_words` words.
#[must_use]
pub fn novel_continue_cost(target_words: u32) -> i64 {
    4 + i64::from(target_words.div_ceil(100))
}

/// Cost of an outline covering `chapters` chapters.
#[must_use]
pub fn novel_outline_cost(chapters: u32) -> i64 {
    (2 + i64::from(chapters.div_ceil(5))).max(3)
}

/// Count the whitespace-separated words of a text.
#[must_use]
pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// The apologetic failure reply shown inline when a provider call fails.
#[must_use]
pub fn failure_reply(feature: Feature) -> String {
    format!(
        "❌ Maaf, {} gagal diproses. Token kamu sudah dikembalikan.",
        feature_label(feature)
    )
}

const fn feature_label(feature: Feature) -> &'static str {
    match feature {
        Feature::Chat => "chat",
        Feature::Cerpen => "cerpen",
        Feature::Skenario => "skenario",
        Feature::Rewrite => "review tulisan",
        Feature::NovelCreate => "bab pembuka novel",
        Feature::NovelContinue => "lanjutan cerita",
        Feature::NovelOutline => "outline novel",
        Feature::NovelCharacter => "profil karakter",
        Feature::NovelWorld => "worldbuilding",
    }
}
