use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::ArticleRecord;

use super::SourceError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiPayload {
    Flat(Vec<Value>),
    Wrapped(ApiWrapped),
}

#[derive(Debug, Deserialize)]
struct ApiWrapped {
    #[serde(alias = "nodes", alias = "articles", alias = "items")]
    data: Vec<Value>,
}

/// Unwrap `callback({...});` into the JSON it carries. Bare JSON passes through.
pub fn strip_envelope(body: &str) -> Result<&str, SourceError> {
    let trimmed = body.trim().trim_start_matches("/**/").trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let open = trimmed
        .find('(')
        .ok_or_else(|| SourceError::Decode("missing JSONP callback".to_string()))?;
    let close = trimmed
        .rfind(')')
        .filter(|close| *close > open)
        .ok_or_else(|| SourceError::Decode("unterminated JSONP callback".to_string()))?;

    Ok(trimmed[open + 1..close].trim())
}

/// Decode an article list response, with or without a JSONP envelope.
///
/// Records are decoded one at a time; a record that does not decode is
/// logged and skipped so the rest of the page survives.
pub fn parse_articles(body: &str) -> Result<Vec<ArticleRecord>, SourceError> {
    let json = strip_envelope(body)?;
    let payload: ApiPayload =
        serde_json::from_str(json).map_err(|e| SourceError::Decode(e.to_string()))?;

    let items = match payload {
        ApiPayload::Flat(items) => items,
        ApiPayload::Wrapped(wrapped) => wrapped.data,
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ArticleRecord>(item) {
            Ok(record) if !record.nid.is_empty() => records.push(record),
            Ok(_) => warn!("skipping article {} with an empty nid", index),
            Err(err) => warn!(?err, "skipping undecodable article {}", index),
        }
    }
    Ok(records)
}
