use std::path::{Path, PathBuf};

use colored::*;
use tokio::fs;
use tracing::{info, warn};

use crate::api::ReaderApi;
use crate::assembler::assemble;
use crate::auth::Credentials;
use crate::config::DownloadConfig;
use crate::downloader::ChapterDownloader;
use crate::error::{DownloadError, Result};
use crate::model::{ChapterResult, DownloadReport};

/// Characters that are not allowed in file names on at least one platform.
const UNSAFE_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Runs the whole "download one book" operation: book info, chapter list,
/// chapters, assembly, and writing the HTML file.
pub struct Downloader<A> {
    api: A,
    config: DownloadConfig,
}

impl<A: ReaderApi> Downloader<A> {
    pub fn new(api: A, config: DownloadConfig) -> Self {
        Self { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Downloads `book_id` into `output`, or into a file named after the book
    /// in the configured output directory.
    ///
    /// Nothing is written unless at least one chapter was retrieved.
    pub async fn run<F>(
        &self,
        book_id: &str,
        auth: &Credentials,
        output: Option<&Path>,
        on_progress: F,
    ) -> Result<DownloadReport>
    where
        F: FnMut(usize, usize, &ChapterResult),
    {
        info!("Fetching book info for {}", book_id.green());
        let book = self
            .api
            .fetch_book_info(book_id, auth)
            .await
            .map_err(DownloadError::BookInfo)?;
        info!(
            "\"{}\" by {} ({})",
            book.title.green(),
            book.author,
            book.format
        );

        let chapters = self
            .api
            .fetch_chapter_list(book_id, auth)
            .await
            .map_err(DownloadError::ChapterList)?;
        if chapters.is_empty() {
            warn!("Chapter list for book {} is empty", book_id);
            return Err(DownloadError::NoChapters);
        }
        info!("Downloading {} chapters", chapters.len());

        let results = ChapterDownloader::new(&self.api, self.config.pacing)
            .download_chapters(book_id, &chapters, auth, on_progress)
            .await;

        let attempted = results.len();
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        info!("Retrieved {}/{} chapters", succeeded, attempted);
        if succeeded == 0 {
            return Err(DownloadError::AllChaptersFailed { attempted });
        }

        let document = assemble(&book, &chapters, &results);

        let path = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(&self.config.out_dir, &book.title, &book.book_id),
        };
        write_document(&path, &document)
            .await
            .map_err(|source| DownloadError::Persistence {
                path: path.clone(),
                source,
                attempted,
                succeeded,
            })?;
        info!("Saved to {}", path.display().to_string().blue());

        Ok(DownloadReport {
            book,
            attempted,
            succeeded,
            output: path,
        })
    }
}

async fn write_document(path: &Path, document: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, document).await
}

/// `<title>_<book id>.html`, with characters unsafe in file names replaced by `_`.
pub fn default_filename(title: &str, book_id: &str) -> String {
    format!("{}_{}.html", sanitize(title), sanitize(book_id))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if UNSAFE_FILENAME_CHARS.contains(&c) || c.is_whitespace() || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Default output location for a book in `out_dir`.
pub fn default_output_path(out_dir: &Path, title: &str, book_id: &str) -> PathBuf {
    out_dir.join(default_filename(title, book_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::PacingPolicy;
    use crate::testing::{book, chapters, creds, ScriptedApi};
    use tempfile::TempDir;

    fn downloader(api: ScriptedApi, dir: &TempDir) -> Downloader<ScriptedApi> {
        let config = DownloadConfig::new()
            .with_pacing(PacingPolicy::none())
            .with_out_dir(dir.path());
        Downloader::new(api, config)
    }

    fn dir_is_empty(dir: &TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[test]
    fn default_filename_replaces_unsafe_characters() {
        assert_eq!(default_filename("My/Book: Title", "7"), "My_Book__Title_7.html");
        assert_eq!(default_filename(r#"a<b>c"d\e|f?g*h"#, "1"), "a_b_c_d_e_f_g_h_1.html");
        assert_eq!(
            default_output_path(Path::new("out"), "T", "42"),
            PathBuf::from("out/T_42.html")
        );
    }

    #[tokio::test]
    async fn writes_document_to_default_path() {
        let dir = TempDir::new().unwrap();
        let dl = downloader(ScriptedApi::new(book("42", "T", "A", "epub"), chapters(2)), &dir);

        let report = dl.run("42", &creds(), None, |_, _, _| {}).await.unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.output, dir.path().join("T_42.html"));
        let written = std::fs::read_to_string(&report.output).unwrap();
        assert!(written.contains("<p>content of 1</p>"));
        assert!(written.contains("<p>content of 2</p>"));
    }

    #[tokio::test]
    async fn explicit_output_path_wins() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("books/custom.html");
        let dl = downloader(ScriptedApi::new(book("42", "T", "A", "epub"), chapters(1)), &dir);

        let report = dl
            .run("42", &creds(), Some(target.as_path()), |_, _, _| {})
            .await
            .unwrap();

        assert_eq!(report.output, target);
        assert!(target.exists());
    }

    #[tokio::test]
    async fn book_info_error_aborts_before_chapter_list() {
        let dir = TempDir::new().unwrap();
        let api = ScriptedApi::new(book("42", "T", "A", "epub"), chapters(2)).without_book();
        let dl = downloader(api, &dir);

        let err = dl.run("42", &creds(), None, |_, _, _| {}).await.unwrap_err();

        assert!(matches!(err, DownloadError::BookInfo(_)));
        assert_eq!(dl.api().calls(), ["info:42"]);
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn chapter_list_error_is_an_api_error() {
        let dir = TempDir::new().unwrap();
        let api = ScriptedApi::new(book("42", "T", "A", "epub"), chapters(2)).without_chapter_list();
        let dl = downloader(api, &dir);

        let err = dl.run("42", &creds(), None, |_, _, _| {}).await.unwrap_err();

        assert!(matches!(err, DownloadError::ChapterList(_)));
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn empty_chapter_list_is_no_chapters() {
        let dir = TempDir::new().unwrap();
        let dl = downloader(ScriptedApi::new(book("42", "T", "A", "epub"), vec![]), &dir);

        let err = dl.run("42", &creds(), None, |_, _, _| {}).await.unwrap_err();

        assert!(matches!(err, DownloadError::NoChapters));
        assert_eq!(err.counts(), (0, 0));
        assert!(dir_is_empty(&dir));
    }

    #[tokio::test]
    async fn write_failure_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should go makes the write fail.
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();
        let api = ScriptedApi::new(book("42", "T", "A", "epub"), chapters(3)).failing(&["3"]);
        let dl = downloader(api, &dir);

        let err = dl
            .run("42", &creds(), Some(target.as_path()), |_, _, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Persistence { .. }));
        assert_eq!(err.counts(), (3, 2));
        assert_eq!(err.stage(), "persisting");
    }
}
