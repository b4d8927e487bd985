//! In-memory `ReaderApi` for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::ReaderApi;
use crate::auth::Credentials;
use crate::error::ApiError;
use crate::model::{BookInfo, ChapterMeta, ShelfBook};

pub(crate) fn book(id: &str, title: &str, author: &str, format: &str) -> BookInfo {
    BookInfo {
        book_id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        format: format.to_string(),
    }
}

/// `n` chapters with uids "1".."n".
pub(crate) fn chapters(n: u32) -> Vec<ChapterMeta> {
    (1..=n)
        .map(|i| ChapterMeta {
            chapter_uid: i.to_string(),
            title: format!("Chapter title {}", i),
            sequence: i,
        })
        .collect()
}

pub(crate) fn creds() -> Credentials {
    Credentials::parse("wr_vid=1; wr_skey=test").unwrap()
}

fn service_error(message: &str) -> ApiError {
    ApiError::Service {
        code: -1,
        message: message.to_string(),
    }
}

pub(crate) struct ScriptedApi {
    book: Option<BookInfo>,
    chapters: Option<Vec<ChapterMeta>>,
    shelf: Vec<ShelfBook>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn new(book: BookInfo, chapters: Vec<ChapterMeta>) -> Self {
        Self {
            book: Some(book),
            chapters: Some(chapters),
            shelf: Vec::new(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self, uids: &[&str]) -> Self {
        self.failing = uids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn without_book(mut self) -> Self {
        self.book = None;
        self
    }

    pub(crate) fn without_chapter_list(mut self) -> Self {
        self.chapters = None;
        self
    }

    pub(crate) fn with_shelf(mut self, shelf: Vec<ShelfBook>) -> Self {
        self.shelf = shelf;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReaderApi for ScriptedApi {
    async fn fetch_shelf(&self, _auth: &Credentials) -> Result<Vec<ShelfBook>, ApiError> {
        self.record("shelf".to_string());
        Ok(self.shelf.clone())
    }

    async fn fetch_book_info(
        &self,
        book_id: &str,
        _auth: &Credentials,
    ) -> Result<BookInfo, ApiError> {
        self.record(format!("info:{}", book_id));
        self.book.clone().ok_or_else(|| service_error("book not found"))
    }

    async fn fetch_chapter_list(
        &self,
        book_id: &str,
        _auth: &Credentials,
    ) -> Result<Vec<ChapterMeta>, ApiError> {
        self.record(format!("chapters:{}", book_id));
        self.chapters
            .clone()
            .ok_or_else(|| service_error("chapter list unavailable"))
    }

    async fn fetch_chapter_content(
        &self,
        _book_id: &str,
        chapter_uid: &str,
        _auth: &Credentials,
    ) -> Result<String, ApiError> {
        self.record(format!("content:{}", chapter_uid));
        if self.failing.contains(chapter_uid) {
            Err(service_error("chapter unavailable"))
        } else {
            Ok(format!("<p>content of {}</p>", chapter_uid))
        }
    }
}
