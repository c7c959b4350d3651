use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Deserializer, Serialize};

const TEASER_CHARS: usize = 180;

static SIZE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+(?:width|height)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("static size attribute pattern")
});

/// One article as served by the remote API and as persisted in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(deserialize_with = "nid_from_string_or_number")]
    pub nid: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub body: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub article_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(i64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::Text(s) => s.trim().to_string(),
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn nid_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrNumber::deserialize(deserializer)?.into_string())
}

// Drupal views emit `null` for empty text fields.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Dates arrive as strings from most views but as Unix seconds from some.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}

/// A loaded article: the wire record plus presentation fields derived once.
#[derive(Debug, Clone)]
pub struct Article {
    pub record: ArticleRecord,
    pub published_at: Option<DateTime<Tz>>,
    pub published_date_short: Option<String>,
    pub published_date_long: Option<String>,
    pub teaser: String,
    pub image: Option<String>,
}

impl Article {
    pub fn from_record(record: ArticleRecord, tz: Tz) -> Self {
        let raw_date = record
            .issue_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(record.article_date.as_deref());
        let published_at = raw_date.and_then(|raw| parse_published(raw, tz));

        Self {
            published_date_short: published_at.map(|d| format_short_date(&d)),
            published_date_long: published_at.map(|d| format_long_date(&d)),
            teaser: teaser(&record.body),
            image: record.image.as_deref().and_then(sanitize_image),
            published_at,
            record,
        }
    }

    pub fn nid(&self) -> &str {
        &self.record.nid
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn body(&self) -> &str {
        &self.record.body
    }
}

/// Parse the date formats the API has been seen to emit, interpreting
/// zone-less values in `tz`.
pub fn parse_published(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        let secs = raw.parse::<i64>().ok()?;
        return DateTime::<Utc>::from_timestamp(secs, 0).map(|d| d.with_timezone(&tz));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive).earliest()
}

/// `M/D`, e.g. `2/14`.
pub fn format_short_date(date: &DateTime<Tz>) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// `Thursday, February 14th, 2013`.
pub fn format_long_date(date: &DateTime<Tz>) -> String {
    format!(
        "{}, {} {}{}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Body text without markup, entities decoded and whitespace collapsed.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First 180 characters of the plain body, cut back to the last whole word.
pub fn teaser(body: &str) -> String {
    let text = strip_markup(body);
    let head: String = text.chars().take(TEASER_CHARS).collect();
    let mut words: Vec<&str> = head.split(' ').collect();
    words.pop();
    format!("{}...", words.join(" "))
}

/// Drop fixed dimensions so images scale to the screen.
pub fn sanitize_image(markup: &str) -> Option<String> {
    let markup = markup.trim();
    if markup.is_empty() {
        return None;
    }
    Some(SIZE_ATTR.replace_all(markup, "").trim().to_string())
}
