use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::models::ArticleRecord;

use super::{jsonp, ArticleSource, SourceError};

const LIST_PATH: &str = "views/services_article_list.jsonp";
const CALLBACK: &str = "articleListCallback";

/// Article list endpoint of the site's mobile services API.
pub struct HttpArticleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArticleSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Http(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn list_url(&self) -> String {
        format!("{}/{}", self.base_url, LIST_PATH)
    }
}

fn list_query(section: &str, page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![("args", section.to_string())];
    if page > 0 {
        query.push(("page", page.to_string()));
    }
    query.push(("callback", CALLBACK.to_string()));
    query
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    async fn fetch_page(
        &self,
        section: &str,
        page: u32,
    ) -> Result<Vec<ArticleRecord>, SourceError> {
        info!("Fetching articles for section {} (page {})", section, page);

        let resp = self
            .client
            .get(self.list_url())
            .query(&list_query(section, page))
            .send()
            .await
            .map_err(|e| {
                warn!("Article request failed: {}", e);
                SourceError::Http(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unable to read body".to_string());
            warn!("Article API returned error status {}: {}", status, body);
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| {
            warn!("Failed to read article API body: {}", e);
            SourceError::Http(format!("failed to read body: {e}"))
        })?;

        let records = jsonp::parse_articles(&body)?;
        info!("Received {} articles for section {}", records.len(), section);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_omits_page_parameter() {
        let query = list_query("all", 0);
        assert!(query.iter().all(|(k, _)| *k != "page"));
        assert_eq!(query[0], ("args", "all".to_string()));

        let query = list_query("sports", 2);
        assert!(query.contains(&("page", "2".to_string())));
    }

    #[test]
    fn list_url_tolerates_trailing_slash() {
        let source = HttpArticleSource::new(&SourceConfig {
            base_url: "http://www.phillipian.net/mobile/".to_string(),
            timeout_secs: None,
        })
        .unwrap();
        assert_eq!(
            source.list_url(),
            "http://www.phillipian.net/mobile/views/services_article_list.jsonp"
        );
    }
}
