//! Client for the reading service's private web API.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{BookInfo, ChapterMeta, ShelfBook};

/// The remote endpoints the pipeline depends on.
#[async_trait]
pub trait ReaderApi: Send + Sync {
    async fn fetch_shelf(&self, auth: &Credentials) -> Result<Vec<ShelfBook>, ApiError>;

    async fn fetch_book_info(&self, book_id: &str, auth: &Credentials)
        -> Result<BookInfo, ApiError>;

    /// Chapters in reading order. An empty list is a valid answer.
    async fn fetch_chapter_list(
        &self,
        book_id: &str,
        auth: &Credentials,
    ) -> Result<Vec<ChapterMeta>, ApiError>;

    /// Raw markup of one chapter.
    async fn fetch_chapter_content(
        &self,
        book_id: &str,
        chapter_uid: &str,
        auth: &Credentials,
    ) -> Result<String, ApiError>;
}

#[derive(Deserialize)]
struct ShelfPayload {
    #[serde(default)]
    books: Vec<ShelfBook>,
}

#[derive(Deserialize)]
struct ChapterInfosPayload {
    #[serde(default)]
    data: Vec<ChapterInfosEntry>,
}

#[derive(Deserialize)]
struct ChapterInfosEntry {
    #[serde(default)]
    updated: Vec<ChapterMeta>,
}

#[derive(Deserialize)]
struct ChapterPayload {
    content: String,
}

/// Validates a response body once: a non-zero `errCode` is a service error,
/// anything else must deserialize into `T`.
pub fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body)?;

    if let Some(code) = value.get("errCode").and_then(Value::as_i64) {
        if code != 0 {
            let message = value
                .get("errMsg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ApiError::Service { code, message });
        }
    }

    Ok(serde_json::from_value(value)?)
}

pub struct WebApiClient {
    client: Client,
    base: Url,
}

impl WebApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: &Credentials,
    ) -> Result<T, ApiError> {
        let response = request.header(COOKIE, auth.header_value()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match decode_response(&body) {
            Err(ApiError::Decode(_)) if !status.is_success() => Err(ApiError::Status(status.as_u16())),
            other => other,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth: &Credentials,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        debug!("GET {}", url);
        self.send(self.client.get(url), auth).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        auth: &Credentials,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, &[])?;
        debug!("POST {}", url);
        self.send(self.client.post(url).json(body), auth).await
    }
}

#[async_trait]
impl ReaderApi for WebApiClient {
    async fn fetch_shelf(&self, auth: &Credentials) -> Result<Vec<ShelfBook>, ApiError> {
        let payload: ShelfPayload = self.get("/web/shelf/sync", &[], auth).await?;
        Ok(payload.books)
    }

    async fn fetch_book_info(
        &self,
        book_id: &str,
        auth: &Credentials,
    ) -> Result<BookInfo, ApiError> {
        self.get("/web/book/info", &[("bookId", book_id)], auth).await
    }

    async fn fetch_chapter_list(
        &self,
        book_id: &str,
        auth: &Credentials,
    ) -> Result<Vec<ChapterMeta>, ApiError> {
        let body = json!({ "bookIds": [book_id] });
        let payload: ChapterInfosPayload = self.post("/web/book/chapterInfos", &body, auth).await?;
        Ok(payload
            .data
            .into_iter()
            .next()
            .map(|entry| entry.updated)
            .unwrap_or_default())
    }

    async fn fetch_chapter_content(
        &self,
        book_id: &str,
        chapter_uid: &str,
        auth: &Credentials,
    ) -> Result<String, ApiError> {
        let payload: ChapterPayload = self
            .get(
                "/web/book/chapter",
                &[("bookId", book_id), ("chapterUid", chapter_uid)],
                auth,
            )
            .await?;
        Ok(payload.content)
    }
}
