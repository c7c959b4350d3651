use async_trait::async_trait;
use thiserror::Error;

use crate::models::ArticleRecord;

pub mod http;
pub mod jsonp;

pub use http::HttpArticleSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("article request failed: {0}")]
    Http(String),
    #[error("article api status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("article payload could not be decoded: {0}")]
    Decode(String),
}

/// The remote article API: one page of a section's article list per call.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_page(&self, section: &str, page: u32)
        -> Result<Vec<ArticleRecord>, SourceError>;
}
