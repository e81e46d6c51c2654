// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use axum::http::HeaderName;
use clap::Parser;
use server::clock::SystemClock;
use server::config::Config;
use server::routes;
use server::seed::Seed;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting up the server...");

    let seed = match Seed::load(config.seed.as_deref()) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Failed to load the seed data: {:?}", e);
            std::process::exit(1);
        }
    };
    let stores = seed.into_stores(Arc::new(SystemClock), &config);

    let cors = CorsLayer::new()
        .allow_methods(Any)
        // The frontend only sends JSON bodies; no credentials.
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ])
        .allow_origin(Any);

    let app = routes::create_router(stores).layer(cors);

    let listener = match tokio::net::TcpListener::bind(config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {:?}", config.bind, e);
            std::process::exit(1);
        }
    };
    tracing::info!("The server listens on http://{}", config.bind);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {:?}", e);
        std::process::exit(1);
    }
}
