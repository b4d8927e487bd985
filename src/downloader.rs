use colored::*;
use tracing::{debug, warn};

use crate::api::ReaderApi;
use crate::auth::Credentials;
use crate::model::{ChapterMeta, ChapterResult};
use crate::pacing::PacingPolicy;

/// Fetches a book's chapters one at a time, pausing between requests.
pub struct ChapterDownloader<'a, A: ?Sized> {
    api: &'a A,
    pacing: PacingPolicy,
}

impl<'a, A: ReaderApi + ?Sized> ChapterDownloader<'a, A> {
    pub fn new(api: &'a A, pacing: PacingPolicy) -> Self {
        Self { api, pacing }
    }

    /// Downloads every chapter in order and returns one result per chapter.
    ///
    /// A failed chapter is logged and recorded as such; it never stops the
    /// remaining chapters. `on_progress` receives the 1-based position, the
    /// total, and the chapter's result right after each attempt.
    pub async fn download_chapters<F>(
        &self,
        book_id: &str,
        chapters: &[ChapterMeta],
        auth: &Credentials,
        mut on_progress: F,
    ) -> Vec<ChapterResult>
    where
        F: FnMut(usize, usize, &ChapterResult),
    {
        let total = chapters.len();
        let mut results = Vec::with_capacity(total);

        for (index, chapter) in chapters.iter().enumerate() {
            let result = match self
                .api
                .fetch_chapter_content(book_id, &chapter.chapter_uid, auth)
                .await
            {
                Ok(content) => {
                    debug!(
                        "Fetched chapter {} ({} bytes)",
                        chapter.chapter_uid,
                        content.len()
                    );
                    ChapterResult::success(&chapter.chapter_uid, content)
                }
                Err(e) => {
                    warn!(
                        "Failed to fetch chapter {}/{} \"{}\": {}",
                        index + 1,
                        total,
                        chapter.title.yellow(),
                        e
                    );
                    ChapterResult::failure(&chapter.chapter_uid)
                }
            };

            on_progress(index + 1, total, &result);
            results.push(result);

            // Nothing follows the last chapter, so no pause after it.
            if index + 1 < total {
                tokio::time::sleep(self.pacing.next_delay()).await;
            }
        }

        results
    }
}
