pub mod article;
pub mod article_list;
pub mod cache_entry;
pub mod user;

pub use article::{Article, ArticleRecord};
pub use article_list::{ArticleList, DEFAULT_SECTION};
pub use cache_entry::{CacheEntry, DEFAULT_TTL};
pub use user::User;
