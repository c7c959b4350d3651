pub mod config;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use models::{Article, ArticleList, ArticleRecord, CacheEntry, User};
pub use service::caching::collections::{ArticleCache, FetchError};
pub use service::router::{Action, AppError, Controller, Page, Route, Screen};
