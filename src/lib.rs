//! # shelf2html
//!
//! A CLI client for an e-reading service's private web API.
//!
//! ## Current Features
//!
//! - Listing the books on your shelf
//! - Downloading a book's chapters into a single HTML file
//! - Caching shelf and table-of-contents responses on disk
//!
//! ## Usage
//!
//! ```bash
//! export SHELF2HTML_COOKIE='wr_vid=...; wr_skey=...'
//! shelf2html shelf
//! shelf2html download 123456 --out-dir books
//! ```

pub mod api;
mod assembler;
pub mod auth;
pub mod cache;
pub mod config;
mod downloader;
pub mod error;
pub mod model;
mod orchestrator;
pub mod pacing;

#[cfg(test)]
mod testing;

pub use api::{ReaderApi, WebApiClient};
pub use assembler::assemble;
pub use auth::Credentials;
pub use cache::{CachedApi, JsonCache};
pub use downloader::ChapterDownloader;
pub use orchestrator::{default_filename, default_output_path, Downloader};
