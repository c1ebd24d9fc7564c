//! Collection page model and per-page child UGC counting

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use ugcpage_core::PagingError;

/// One decoded page of the collection endpoint.
///
/// Only the fields the run aggregates are modelled; everything else in the
/// body is skipped during deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct PageResult {
    pub count: u64,
    #[serde(default)]
    pub reviews: Option<Vec<UgcItem>>,
    #[serde(default)]
    pub questions: Option<Vec<UgcItem>>,
    /// Cursor for the following page; absent (or null) on the last page
    #[serde(default, deserialize_with = "deserialize_cursor")]
    pub next_page: Option<String>,
}

impl PageResult {
    pub fn parse(body: &str) -> Result<Self, PagingError> {
        serde_json::from_str(body).map_err(|e| PagingError::Decode(e.to_string()))
    }

    /// Items of the page: `reviews` when present, otherwise `questions`
    pub fn items(&self) -> &[UgcItem] {
        self.reviews
            .as_deref()
            .or(self.questions.as_deref())
            .unwrap_or_default()
    }
}

/// A review or a question
#[derive(Debug, Default, Deserialize)]
pub struct UgcItem {
    #[serde(default)]
    pub media: Option<Vec<Media>>,
    #[serde(default)]
    pub merchant_responses: Option<Vec<IgnoredAny>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Media {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Cursors are normally strings; numbers are accepted and stringified.
fn deserialize_cursor<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Nested content counted per page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChildCounts {
    pub images: u64,
    pub videos: u64,
    pub merchant_responses: u64,
    pub answers: u64,
}

impl ChildCounts {
    pub fn add(&mut self, other: &Self) {
        self.images += other.images;
        self.videos += other.videos;
        self.merchant_responses += other.merchant_responses;
        self.answers += other.answers;
    }
}

/// Count media entries by type and merchant responses across `items`.
///
/// Media types are matched case-insensitively against `image`, `video` and
/// `answer`; any other type is ignored.
pub fn child_ugc_counts(items: &[UgcItem]) -> ChildCounts {
    let mut counts = ChildCounts::default();
    for item in items {
        for media in item.media.iter().flatten() {
            let Some(kind) = media.kind.as_deref() else {
                continue;
            };
            match kind.to_lowercase().as_str() {
                "image" => counts.images += 1,
                "video" => counts.videos += 1,
                // answers arrive as media entries on questions
                "answer" => counts.answers += 1,
                _ => {}
            }
        }
        if let Some(responses) = &item.merchant_responses {
            counts.merchant_responses += responses.len() as u64;
        }
    }
    counts
}
