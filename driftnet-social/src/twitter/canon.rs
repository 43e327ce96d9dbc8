//! Canonical post records and the total normalization function.
//!
//! `normalize` is a pure function from the provider's wire shape to our
//! own representation. It never fails: every missing numeric becomes 0,
//! every missing string becomes "", every missing flag becomes false, so
//! all defaulting is auditable in this one module.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::twitter::types::RawTweet;

/// Provider tag stamped on every canonical record.
pub const SOURCE: &str = "twitter";

/// Legacy layout still used by parts of the API, e.g.
/// `Thu Dec 05 14:23:36 +0000 2024`.
const LEGACY_LAYOUT: &[time::format_description::BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalAuthor {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub verified: bool,
    pub blue_verified: bool,
    pub description: String,
    pub location: String,
    pub profile_image_url: String,
    pub cover_image_url: String,
    pub followers_count: u64,
    pub following_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalMetrics {
    pub id: String,
    pub view_count: u64,
    pub bookmark_count: u64,
    pub like_count: u64,
    pub quote_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub is_quote: bool,
    pub is_reply: bool,
    pub conversation_id: String,
    pub language: String,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CanonicalPost {
    pub author: CanonicalAuthor,
    pub source: String,
    /// RFC 3339 timestamp, or "" when the raw value is missing/unparseable.
    pub created_at: String,
    pub uri: String,
    pub text: String,
    pub metrics: CanonicalMetrics,
}

impl CanonicalPost {
    /// Downstream filter for records missing hard-required fields. The
    /// normalizer itself never drops anything; callers that need complete
    /// records apply this after the fact.
    pub fn has_required_fields(&self) -> bool {
        !self.metrics.id.is_empty() && !self.text.is_empty() && !self.created_at.is_empty()
    }
}

/// Map a raw tweet into a canonical post. Total: every absent field gets
/// its documented default, and nothing here can panic or error.
pub fn normalize(raw: &RawTweet) -> CanonicalPost {
    let author = raw.author.as_ref();

    CanonicalPost {
        author: CanonicalAuthor {
            id: author.and_then(|a| a.id.clone()).unwrap_or_default(),
            username: author.and_then(|a| a.user_name.clone()).unwrap_or_default(),
            display_name: author.and_then(|a| a.name.clone()).unwrap_or_default(),
            verified: author.and_then(|a| a.is_verified).unwrap_or_default(),
            blue_verified: author.and_then(|a| a.is_blue_verified).unwrap_or_default(),
            description: author
                .and_then(|a| a.description.clone())
                .unwrap_or_default(),
            location: author.and_then(|a| a.location.clone()).unwrap_or_default(),
            profile_image_url: author
                .and_then(|a| a.profile_picture.clone())
                .unwrap_or_default(),
            cover_image_url: author
                .and_then(|a| a.cover_picture.clone())
                .unwrap_or_default(),
            followers_count: author.and_then(|a| a.followers).unwrap_or_default(),
            following_count: author.and_then(|a| a.following).unwrap_or_default(),
        },
        source: SOURCE.to_string(),
        created_at: raw
            .created_at
            .as_deref()
            .and_then(to_rfc3339)
            .unwrap_or_default(),
        uri: raw.url.clone().unwrap_or_default(),
        text: raw.text.clone().unwrap_or_default(),
        metrics: CanonicalMetrics {
            id: raw.id.clone().unwrap_or_default(),
            view_count: raw.view_count.unwrap_or_default(),
            bookmark_count: raw.bookmark_count.unwrap_or_default(),
            like_count: raw.like_count.unwrap_or_default(),
            quote_count: raw.quote_count.unwrap_or_default(),
            retweet_count: raw.retweet_count.unwrap_or_default(),
            reply_count: raw.reply_count.unwrap_or_default(),
            is_quote: raw.is_quote.unwrap_or_default(),
            is_reply: raw.is_reply.unwrap_or_default(),
            conversation_id: raw.conversation_id.clone().unwrap_or_default(),
            language: raw.lang.clone().unwrap_or_default(),
            hashtags: raw
                .entities
                .as_ref()
                .and_then(|e| e.hashtags.as_ref())
                .map(|tags| tags.iter().map(|t| format!("#{}", t.label())).collect())
                .unwrap_or_default(),
        },
    }
}

/// Parse a raw creation timestamp and re-emit it as RFC 3339.
/// Accepts RFC 3339 input as-is and the legacy layout above.
fn to_rfc3339(raw: &str) -> Option<String> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(raw, LEGACY_LAYOUT))
        .ok()?;
    parsed.format(&Rfc3339).ok()
}
