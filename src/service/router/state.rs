use crate::models::{Article, ArticleList, User};

use super::Route;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Start,
    Main,
    Article,
    Login,
    Error,
}

/// Everything the controller knows about the running app. Built once at
/// startup and owned by the [`Controller`](super::Controller).
#[derive(Debug, Default)]
pub struct AppState {
    pub screen: Screen,
    pub article_list: Option<ArticleList>,
    pub main_view_built: bool,
    pub current_article: Option<Article>,
    /// Article asked for before any list was loaded; shown once one is.
    pub requested_nid: Option<String>,
    pub loading: Option<String>,
    pub user: Option<User>,
    pub last_error: Option<String>,
    pub history: Vec<Route>,
}

impl AppState {
    pub fn logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn current_section(&self) -> Option<&str> {
        self.article_list.as_ref().map(|l| l.section.as_str())
    }
}
