//! On-disk JSON cache for slow-changing API responses.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::api::ReaderApi;
use crate::auth::Credentials;
use crate::error::{ApiError, CacheError};
use crate::model::{BookInfo, ChapterMeta, ShelfBook};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    stored_at: DateTime<Utc>,
    value: Value,
}

/// Key-value store persisted as a single JSON file. Entries older than the
/// TTL read as missing.
pub struct JsonCache {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl JsonCache {
    /// Loads the cache file. A missing or unreadable-as-JSON file gives an empty cache.
    pub async fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        Ok(Self { path, ttl, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let entry = self.entries.get(key)?;
        if self.is_expired(entry, now) {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CacheError> {
        self.put_at(key, value, Utc::now()).await
    }

    async fn put_at<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let entry = Entry {
            stored_at: now,
            value: serde_json::to_value(value)?,
        };
        self.entries.insert(key.to_string(), entry);

        let ttl = self.ttl;
        self.entries.retain(|_, e| !expired(e, ttl, now));
        self.save().await
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        expired(entry, self.ttl, now)
    }

    async fn save(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| CacheError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let data = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, data)
            .await
            .map_err(|source| CacheError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

fn expired(entry: &Entry, ttl: Duration, now: DateTime<Utc>) -> bool {
    // Timestamps from the future (clock skew) count as fresh.
    match (now - entry.stored_at).to_std() {
        Ok(age) => age > ttl,
        Err(_) => false,
    }
}

/// Wraps a [`ReaderApi`] and serves shelf, book info and chapter lists from
/// a [`JsonCache`]. Chapter content always goes to the service.
pub struct CachedApi<A> {
    inner: A,
    cache: Mutex<JsonCache>,
}

impl<A: ReaderApi> CachedApi<A> {
    pub fn new(inner: A, cache: JsonCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    async fn cached<T, F>(
        &self,
        key: &str,
        fetch: F,
        should_store: fn(&T) -> bool,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = Result<T, ApiError>> + Send,
    {
        if let Some(hit) = self.cache.lock().await.get::<T>(key) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }
        debug!("Cache miss for {}", key);

        let value = fetch.await?;
        if should_store(&value) {
            let mut cache = self.cache.lock().await;
            if let Err(e) = cache.put(key, &value).await {
                warn!("Failed to update cache {}: {}", cache.path().display(), e);
            }
        }
        Ok(value)
    }
}

#[async_trait]
impl<A: ReaderApi> ReaderApi for CachedApi<A> {
    async fn fetch_shelf(&self, auth: &Credentials) -> Result<Vec<ShelfBook>, ApiError> {
        self.cached("shelf", self.inner.fetch_shelf(auth), |_| true)
            .await
    }

    async fn fetch_book_info(
        &self,
        book_id: &str,
        auth: &Credentials,
    ) -> Result<BookInfo, ApiError> {
        let key = format!("book:{}", book_id);
        self.cached(&key, self.inner.fetch_book_info(book_id, auth), |_| true)
            .await
    }

    async fn fetch_chapter_list(
        &self,
        book_id: &str,
        auth: &Credentials,
    ) -> Result<Vec<ChapterMeta>, ApiError> {
        let key = format!("chapters:{}", book_id);
        self.cached(
            &key,
            self.inner.fetch_chapter_list(book_id, auth),
            |chapters: &Vec<ChapterMeta>| !chapters.is_empty(),
        )
        .await
    }

    async fn fetch_chapter_content(
        &self,
        book_id: &str,
        chapter_uid: &str,
        auth: &Credentials,
    ) -> Result<String, ApiError> {
        self.inner
            .fetch_chapter_content(book_id, chapter_uid, auth)
            .await
    }
}
