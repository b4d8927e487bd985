use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one book, fetched once per download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub book_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "unknown_format")]
    pub format: String,
}

/// One entry of a book's table of contents.
///
/// The order the service returns these in is the document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMeta {
    #[serde(rename = "chapterUid", deserialize_with = "string_or_number")]
    pub chapter_uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "chapterIdx", default)]
    pub sequence: u32,
}

/// A book as listed on the user's shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfBook {
    #[serde(deserialize_with = "string_or_number")]
    pub book_id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
}

/// Outcome of a single chapter fetch. `content` is `None` when the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterResult {
    pub chapter_uid: String,
    pub content: Option<String>,
}

impl ChapterResult {
    pub fn success(chapter_uid: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            chapter_uid: chapter_uid.into(),
            content: Some(content.into()),
        }
    }

    pub fn failure(chapter_uid: impl Into<String>) -> Self {
        Self {
            chapter_uid: chapter_uid.into(),
            content: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.content.is_some()
    }
}

/// Terminal result of a successful download operation.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub book: BookInfo,
    pub attempted: usize,
    pub succeeded: usize,
    pub output: PathBuf,
}

fn unknown_format() -> String {
    "unknown".to_string()
}

/// The service is inconsistent about ids: some endpoints send numbers, some strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
    })
}
