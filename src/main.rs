mod app;
mod db;
mod jobs;
mod prelude;
mod utils;

use anyhow::Context as _;
use axum::handler::HandlerWithoutStateExt;
use axum::response::Redirect;
use futures::StreamExt;
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};
use utils::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_filter = tracing_subscriber::filter::Targets::default()
        .with_target("h2", LevelFilter::OFF)
        .with_target("rustls", LevelFilter::OFF)
        .with_default(Level::DEBUG);

    tracing_subscriber::fmt()
        .pretty()
        .with_target(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .finish()
        .with(log_filter)
        .try_init()?;

    // Load the server config
    let file = std::env::args().nth(1).context("usage: folio <config.toml>")?;
    let config = Config::load(&file).await?;

    let app = app::build(config.clone()).await?.into_make_service();
    tracing::info!("Live at {}", &config.app.url);

    match config.acme {
        // If ACME is configured, request a TLS certificate from Let's Encrypt
        // and keep an auxiliary HTTP server around that redirects to HTTPS.
        Some(acme) => {
            let url = config.app.url.clone();
            let http_addr = config.net.http_addr;
            tokio::spawn(async move {
                let redirect = move || async move { Redirect::permanent(&url) };
                axum_server::bind(http_addr).serve(redirect.into_make_service()).await
            });

            let mut acme_state = rustls_acme::AcmeConfig::new([&acme.domain])
                .contact_push(format!("mailto:{}", &acme.email))
                .cache(rustls_acme::caches::DirCache::new(acme.dir.clone()))
                .directory_lets_encrypt(acme.prod)
                .state();

            let acceptor = acme_state.axum_acceptor(acme_state.default_rustls_config());

            tokio::spawn(async move {
                loop {
                    match acme_state.next().await.unwrap() {
                        Ok(ok) => tracing::debug!("acme: {:?}", ok),
                        Err(err) => tracing::error!("acme: {}", err),
                    }
                }
            });

            axum_server::bind(config.net.https_addr).acceptor(acceptor).serve(app).await?;
        }
        // Otherwise, serve plain HTTP
        None => {
            axum_server::bind(config.net.http_addr).serve(app).await?;
        }
    }

    Ok(())
}
