use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{User, DEFAULT_SECTION};
use crate::service::caching::collections::ArticleCache;
use crate::service::view::{render_article_list, MainPageView, Renderer};

use super::{Action, AppError, AppState, Page, Route, Screen};

const LOADING_ARTICLES: &str = "Loading articles...";
const LOADING_MORE: &str = "Loading more articles...";

/// Maps navigation to screens and owns the app state.
pub struct Controller {
    cache: ArticleCache,
    renderer: Arc<dyn Renderer>,
    comments_base_url: String,
    state: AppState,
}

impl Controller {
    pub fn new(
        cache: ArticleCache,
        renderer: Arc<dyn Renderer>,
        comments_base_url: impl Into<String>,
    ) -> Self {
        info!("Initializing app controller.");
        Self {
            cache,
            renderer,
            comments_base_url: comments_base_url.into().trim_end_matches('/').to_string(),
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.state.user = user;
    }

    /// Run `action`; a failure becomes an error page that offers to retry it.
    pub async fn dispatch(&mut self, action: Action) -> Page {
        let result = match &action {
            Action::Open(route) => self.navigate(route.clone()).await,
            Action::ChangeSection(section) => self.change_section(section).await,
            Action::LoadMore => self.load_more().await,
            Action::Refresh => self.refresh().await,
            Action::Back => self.back().await,
        };

        match result {
            Ok(page) => page,
            Err(err) => self.error_page(&err, Some(&action)),
        }
    }

    pub async fn open(&mut self, fragment: &str) -> Result<Page, AppError> {
        let route = Route::parse(fragment)?;
        self.navigate(route).await
    }

    pub async fn navigate(&mut self, route: Route) -> Result<Page, AppError> {
        let page = match &route {
            Route::Main => self.enter_main().await?,
            Route::Article(nid) => self.enter_article(nid).await?,
            Route::Login => self.enter_login()?,
        };
        if self.state.history.last() != Some(&route) {
            self.state.history.push(route);
        }
        Ok(page)
    }

    pub async fn back(&mut self) -> Result<Page, AppError> {
        self.state.history.pop();
        let previous = self.state.history.pop().unwrap_or(Route::Main);
        self.navigate(previous).await
    }

    /// Throw away the current list and show `section` instead.
    pub async fn change_section(&mut self, section: &str) -> Result<Page, AppError> {
        info!("Changing section to {}", section);
        self.load_section(section).await?;
        self.show_main()
    }

    /// Drop the cached copy of the current section and fetch it again.
    pub async fn refresh(&mut self) -> Result<Page, AppError> {
        let section = self
            .state
            .current_section()
            .unwrap_or(DEFAULT_SECTION)
            .to_string();
        info!("Refreshing section {}", section);
        self.cache.invalidate(&section).await?;
        self.load_section(&section).await?;
        self.show_main()
    }

    pub async fn load_more(&mut self) -> Result<Page, AppError> {
        let mut list = self
            .state
            .article_list
            .take()
            .ok_or(AppError::NoListLoaded)?;

        self.state.loading = Some(LOADING_MORE.to_string());
        let result = self.cache.load_more(&mut list).await;
        self.state.loading = None;
        self.state.article_list = Some(list);

        let appended = result?;
        info!("Loaded {} more articles", appended);
        self.show_main()
    }

    /// Render `err` for the reader and clear any loading indicator.
    pub fn error_page(&mut self, err: &AppError, retry: Option<&Action>) -> Page {
        self.state.loading = None;
        let message = err.to_string();
        warn!("{}", message);

        let retry = retry.filter(|_| err.is_retryable()).map(Action::to_string);
        let markup = self
            .renderer
            .error_page(&message, retry.as_deref())
            .unwrap_or_else(|_| message.clone());

        self.state.screen = Screen::Error;
        self.state.last_error = Some(message);
        Page {
            screen: Screen::Error,
            markup,
        }
    }

    async fn enter_main(&mut self) -> Result<Page, AppError> {
        info!("Changing to main view");
        if self.state.main_view_built && self.state.article_list.is_some() {
            debug!("Main view already exists; showing it again");
            return self.show_main();
        }

        self.load_section(DEFAULT_SECTION).await?;

        if let Some(nid) = self.state.requested_nid.take() {
            info!("Going back to the originally requested article {}", nid);
            return self.show_article(&nid);
        }
        self.show_main()
    }

    async fn enter_article(&mut self, nid: &str) -> Result<Page, AppError> {
        info!("Changing to article view (nid: {})", nid);
        if self.state.article_list.is_none() {
            info!("Articles are not loaded yet; loading the main view first");
            self.state.requested_nid = Some(nid.to_string());
            return self.enter_main().await;
        }
        self.show_article(nid)
    }

    fn enter_login(&mut self) -> Result<Page, AppError> {
        info!("Changing to login view.");
        let markup = self.renderer.login_page()?;
        self.state.screen = Screen::Login;
        Ok(Page {
            screen: Screen::Login,
            markup,
        })
    }

    async fn load_section(&mut self, section: &str) -> Result<(), AppError> {
        self.state.main_view_built = false;
        self.state.article_list = None;

        self.state.loading = Some(LOADING_ARTICLES.to_string());
        let result = self.cache.get_articles(section).await;
        self.state.loading = None;

        let list = result?;
        info!("Section {} has {} articles", list.section, list.len());
        self.state.article_list = Some(list);
        self.state.main_view_built = true;
        self.state.last_error = None;
        Ok(())
    }

    fn show_main(&mut self) -> Result<Page, AppError> {
        let list = self
            .state
            .article_list
            .as_ref()
            .ok_or(AppError::NoListLoaded)?;

        let toolbar = self.state.user.as_ref().and_then(|user| {
            self.renderer
                .user_toolbar(user)
                .map_err(|err| warn!(?err, "user toolbar failed to render"))
                .ok()
        });
        let view = MainPageView {
            section: &list.section,
            toolbar,
            list: render_article_list(self.renderer.as_ref(), list),
            loading: self.state.loading.as_deref(),
        };
        let markup = self.renderer.main_page(&view)?;

        self.state.screen = Screen::Main;
        Ok(Page {
            screen: Screen::Main,
            markup,
        })
    }

    fn show_article(&mut self, nid: &str) -> Result<Page, AppError> {
        let list = self
            .state
            .article_list
            .as_ref()
            .ok_or(AppError::NoListLoaded)?;
        let Some(article) = list.get(nid).cloned() else {
            self.state.current_article = None;
            return Err(AppError::ArticleNotFound(nid.to_string()));
        };

        let comments_url = format!("{}/node/{}", self.comments_base_url, article.nid());
        debug!("Comments for {} at {}", article.nid(), comments_url);
        let markup = self.renderer.article_page(&article, &comments_url)?;

        self.state.current_article = Some(article);
        self.state.screen = Screen::Article;
        Ok(Page {
            screen: Screen::Article,
            markup,
        })
    }
}
