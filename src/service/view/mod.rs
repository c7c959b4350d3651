use thiserror::Error;
use tracing::warn;

use crate::models::{Article, ArticleList, User};

pub mod text;

pub use text::TextRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render {template}: {reason}")]
    Template {
        template: &'static str,
        reason: String,
    },
}

/// Everything the main page template needs.
#[derive(Debug, Clone)]
pub struct MainPageView<'a> {
    pub section: &'a str,
    pub toolbar: Option<String>,
    pub list: String,
    pub loading: Option<&'a str>,
}

/// Produces screen markup from loaded data. Presentation details live entirely
/// in the implementation.
pub trait Renderer: Send + Sync {
    fn main_page(&self, view: &MainPageView<'_>) -> Result<String, RenderError>;
    fn article_list_item(&self, article: &Article) -> Result<String, RenderError>;
    fn load_more_item(&self) -> String;
    fn article_page(&self, article: &Article, comments_url: &str) -> Result<String, RenderError>;
    fn login_page(&self) -> Result<String, RenderError>;
    fn user_toolbar(&self, user: &User) -> Result<String, RenderError>;
    fn error_page(&self, message: &str, retry: Option<&str>) -> Result<String, RenderError>;
}

/// Render every item independently so one bad record cannot blank the list,
/// then close the list with the load-more affordance.
pub fn render_article_list(renderer: &dyn Renderer, list: &ArticleList) -> String {
    let mut items = Vec::with_capacity(list.len() + 1);
    for article in list.articles() {
        match renderer.article_list_item(article) {
            Ok(item) => items.push(item),
            Err(err) => warn!(?err, "skipping article {} in list", article.nid()),
        }
    }
    items.push(renderer.load_more_item());
    items.join("\n")
}
