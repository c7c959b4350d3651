use crate::models::article::strip_markup;
use crate::models::{Article, User};

use super::{MainPageView, RenderError, Renderer};

const MASTHEAD: &str = "The Phillipian";
const RULE: &str = "----------------------------------------";

/// Plain-text screens for a terminal.
#[derive(Debug, Default, Clone)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn require_title<'a>(template: &'static str, article: &'a Article) -> Result<&'a str, RenderError> {
    let title = article.title().trim();
    if title.is_empty() {
        return Err(RenderError::Template {
            template,
            reason: format!("article {} has no title", article.nid()),
        });
    }
    Ok(title)
}

impl Renderer for TextRenderer {
    fn main_page(&self, view: &MainPageView<'_>) -> Result<String, RenderError> {
        let mut lines = vec![format!("== {MASTHEAD} == [section: {}]", view.section)];
        if let Some(toolbar) = &view.toolbar {
            lines.push(toolbar.clone());
        }
        lines.push(RULE.to_string());
        if let Some(loading) = view.loading {
            lines.push(loading.to_string());
        }
        lines.push(view.list.clone());
        Ok(lines.join("\n"))
    }

    fn article_list_item(&self, article: &Article) -> Result<String, RenderError> {
        let title = require_title("article-list-item", article)?;
        let date = article.published_date_short.as_deref().unwrap_or("-");
        Ok(format!(
            "[{}] {:>5}  {}\n        {}",
            article.nid(),
            date,
            title,
            article.teaser
        ))
    }

    fn load_more_item(&self) -> String {
        "[more] Load more articles...".to_string()
    }

    fn article_page(&self, article: &Article, comments_url: &str) -> Result<String, RenderError> {
        let title = require_title("article-page", article)?;
        let mut lines = vec!["< back".to_string(), RULE.to_string(), title.to_string()];
        if let Some(date) = &article.published_date_long {
            lines.push(date.clone());
        }
        if let Some(image) = &article.image {
            lines.push(format!("[image] {image}"));
        }
        lines.push(String::new());
        lines.push(strip_markup(article.body()));
        lines.push(RULE.to_string());
        lines.push(format!("Comments: {comments_url}"));
        Ok(lines.join("\n"))
    }

    fn login_page(&self) -> Result<String, RenderError> {
        Ok([
            "< back",
            RULE,
            "Log in",
            "Username: ____________",
            "Password: ____________",
            "(signing in is not available yet)",
        ]
        .join("\n"))
    }

    fn user_toolbar(&self, user: &User) -> Result<String, RenderError> {
        if user.name.trim().is_empty() {
            return Err(RenderError::Template {
                template: "user-toolbar",
                reason: "user has no name".to_string(),
            });
        }
        Ok(format!("Signed in as {}", user.name))
    }

    fn error_page(&self, message: &str, retry: Option<&str>) -> Result<String, RenderError> {
        let mut lines = vec![format!("! {message}")];
        if let Some(retry) = retry {
            lines.push(format!("  [retry] {retry}"));
        }
        Ok(lines.join("\n"))
    }
}
