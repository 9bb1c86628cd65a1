// SPDX-License-Identifier: AGPL-3.0
// Shopfront CLI - Terminal frontend

mod app;
mod services;
mod views;

use services::ShopBridge;
use shopfront_core::{AppSettings, HttpCatalogFetcher, HttpImageFetcher, SettingsStore};
use std::io::BufRead;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Log to stderr so the product list on stdout stays readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shopfront_cli=info".parse().unwrap())
                .add_directive("shopfront_core=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Shopfront v{}", env!("CARGO_PKG_VERSION"));

    let settings = match SettingsStore::new() {
        Ok(store) => store.get(),
        Err(e) => {
            tracing::warn!("Settings unavailable, using defaults: {}", e);
            AppSettings::default()
        }
    }
    .with_env_overrides();

    let client = match settings.http_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    // A bad catalog URL is reported by the first fetch, not here
    let catalog = HttpCatalogFetcher::new(client.clone(), settings.catalog_url.clone());
    let images = HttpImageFetcher::new(client, settings.image_cache_enabled);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Stdin is read on its own thread; lines reach the UI loop over a channel
    let (input_tx, input_rx) = async_channel::bounded::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send_blocking(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    let result = runtime.block_on(async move {
        let bridge = ShopBridge::new(catalog, images);
        let app = app::App::new(bridge, settings.currency_symbol, std::io::stdout());
        app.run(input_rx).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Terminal output failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
