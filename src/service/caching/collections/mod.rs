pub mod article_list;

pub use article_list::{ArticleCache, FetchError};
