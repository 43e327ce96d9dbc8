//! Wire types for the keyword-search endpoint.
//!
//! The provider's response shape is not under our control, so every field
//! here is optional and defaulted. Absence is data, not an error; the
//! normalizer in [`crate::twitter::canon`] turns these into complete
//! canonical records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of search results.
///
/// A missing `tweets` array means an empty page, not a malformed one.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchPage {
    #[serde(default)]
    pub tweets: Option<Vec<RawTweet>>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl SearchPage {
    /// Cursor for the next page, if the provider reports one.
    ///
    /// `has_next_page: true` with an absent or empty cursor still means
    /// "no further page" -- there is nothing to resume from.
    pub fn next_cursor(&self) -> Option<String> {
        if self.has_next_page != Some(true) {
            return None;
        }
        self.next_cursor.clone().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTweet {
    pub id: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub lang: Option<String>,
    pub conversation_id: Option<String>,

    pub view_count: Option<u64>,
    pub bookmark_count: Option<u64>,
    pub like_count: Option<u64>,
    pub quote_count: Option<u64>,
    pub retweet_count: Option<u64>,
    pub reply_count: Option<u64>,
    pub is_quote: Option<bool>,
    pub is_reply: Option<bool>,

    pub author: Option<RawAuthor>,
    pub entities: Option<RawEntities>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAuthor {
    pub id: Option<String>,
    pub user_name: Option<String>,
    pub name: Option<String>,
    pub is_verified: Option<bool>,
    pub is_blue_verified: Option<bool>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<String>,
    pub cover_picture: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawEntities {
    #[serde(default)]
    pub hashtags: Option<Vec<RawHashtag>>,
}

/// Hashtag entities arrive either as structured objects with a `text`
/// label or as bare strings, depending on the response variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawHashtag {
    Entity { text: String },
    Bare(String),
    Other(Value),
}

impl RawHashtag {
    /// Best-effort label for the entity, without the leading `#`.
    pub fn label(&self) -> String {
        match self {
            RawHashtag::Entity { text } => text.clone(),
            RawHashtag::Bare(s) => s.clone(),
            RawHashtag::Other(v) => v
                .get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
        }
    }
}
