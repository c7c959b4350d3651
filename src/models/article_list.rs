use super::{Article, ArticleRecord};

pub const DEFAULT_SECTION: &str = "all";

/// Ordered articles of one section plus the pagination cursor.
#[derive(Debug, Clone)]
pub struct ArticleList {
    pub section: String,
    pub current_page: u32,
    articles: Vec<Article>,
}

impl ArticleList {
    pub fn new(section: impl Into<String>) -> Self {
        Self::from_articles(section, Vec::new())
    }

    pub fn from_articles(section: impl Into<String>, articles: Vec<Article>) -> Self {
        let section = section.into();
        let section = if section.trim().is_empty() {
            DEFAULT_SECTION.to_string()
        } else {
            section
        };
        Self {
            section,
            current_page: 0,
            articles,
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, nid: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.nid() == nid)
    }

    pub fn contains(&self, nid: &str) -> bool {
        self.get(nid).is_some()
    }

    pub fn records(&self) -> Vec<ArticleRecord> {
        self.articles.iter().map(|a| a.record.clone()).collect()
    }

    pub fn nids(&self) -> Vec<&str> {
        self.articles.iter().map(Article::nid).collect()
    }

    /// Append after every existing article; an already present `nid` is skipped.
    pub fn push_unique(&mut self, article: Article) -> bool {
        if self.contains(article.nid()) {
            return false;
        }
        self.articles.push(article);
        true
    }
}
