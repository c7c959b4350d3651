use thiserror::Error;

use crate::service::caching::collections::FetchError;
use crate::service::view::RenderError;

pub mod action;
pub mod controller;
pub mod route;
pub mod state;

pub use action::Action;
pub use controller::Controller;
pub use route::Route;
pub use state::{AppState, Screen};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no screen for route \"{0}\"")]
    UnknownRoute(String),
    #[error("article {0} not found")]
    ArticleNotFound(String),
    #[error("no articles are loaded yet")]
    NoListLoaded,
    #[error("could not load articles: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl AppError {
    /// Only failures that another attempt can fix get a retry affordance.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Fetch(_))
    }
}

/// A rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub screen: Screen,
    pub markup: String,
}
