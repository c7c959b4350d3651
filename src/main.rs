use std::{env, sync::Arc};

use anyhow::Result;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use phillipian_mobile::config::AppConfig;
use phillipian_mobile::service::caching::collections::ArticleCache;
use phillipian_mobile::service::caching::{FileStore, KeyValueStore, RedisStore};
use phillipian_mobile::service::command::{self, help_text, Command};
use phillipian_mobile::service::router::{Action, Controller, Route};
use phillipian_mobile::service::source::HttpArticleSource;
use phillipian_mobile::service::view::TextRenderer;

async fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    if let Some(url) = &config.cache.redis_url {
        match RedisStore::new(url).await {
            Ok(store) => {
                info!("Connected to Redis cache");
                return Ok(Arc::new(store));
            }
            Err(err) => info!("Redis cache disabled: {err}"),
        }
    }

    let store = FileStore::open(&config.cache.file_path).await?;
    info!("Using cache file {}", store.path().display());
    Ok(Arc::new(store))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    info!("Initializing article source...");
    let source = Arc::new(HttpArticleSource::new(&config.source)?);

    info!("Initializing local storage...");
    let store = open_store(&config).await?;

    let cache = ArticleCache::from_config(store, source, &config);
    let mut controller = Controller::new(
        cache,
        Arc::new(TextRenderer::new()),
        config.comments_base_url.clone(),
    );

    // An optional first argument is the start route, e.g. `article/42`.
    let start = match env::args().nth(1) {
        Some(fragment) => Route::parse(&fragment)?,
        None => Route::Main,
    };
    let page = controller.dispatch(Action::Open(start)).await;
    println!("{}", page.markup);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", help_text()),
            Ok(Command::Run(action)) => {
                let page = controller.dispatch(action).await;
                println!("{}", page.markup);
            }
            Err(err) => println!("❌ {err}"),
        }
    }

    info!("Shutting down");
    Ok(())
}
