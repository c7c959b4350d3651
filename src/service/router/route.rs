use std::fmt;
use std::str::FromStr;

use super::AppError;

/// Navigation targets: `""`/`main-page`, `article/:nid` and `login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Main,
    Article(String),
    Login,
}

impl Route {
    pub fn parse(fragment: &str) -> Result<Self, AppError> {
        let path = fragment.trim().trim_start_matches('#').trim_start_matches('/');
        match path {
            "" | "main-page" => Ok(Route::Main),
            "login" => Ok(Route::Login),
            _ => match path.strip_prefix("article/") {
                Some(nid) if !nid.is_empty() && !nid.contains('/') => {
                    Ok(Route::Article(nid.to_string()))
                }
                _ => Err(AppError::UnknownRoute(fragment.trim().to_string())),
            },
        }
    }
}

impl FromStr for Route {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Main => write!(f, "main-page"),
            Route::Article(nid) => write!(f, "article/{nid}"),
            Route::Login => write!(f, "login"),
        }
    }
}
