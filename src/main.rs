//! pagegen - collection route page generator.

mod builder;
mod cli;
mod config;
mod logger;
mod pages;
mod query;
mod utils;
mod watch;

use anyhow::{Context, Result};
use builder::{BuildError, BuilderOptions, CollectionBuilder};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use pages::{ComponentRoute, PageStore, discover_components};
use pagegen_core::Pattern;
use query::DataDirEngine;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinSet;
use utils::path::rel_path;
use watch::{ChangeNotifier, FsNotifier, Registry};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;
    let routes = discover_components(&config.build.pages, &config.build.extensions)?;

    let result = match &cli.command {
        Commands::Check => check(&config, &routes),
        Commands::Build => runtime()?.block_on(build(&config, routes)),
        Commands::Watch { .. } if !config.watch.enable => {
            log!("watch"; "disabled by [watch.enable], building once");
            runtime()?.block_on(build(&config, routes))
        }
        Commands::Watch { .. } => runtime()?.block_on(watch(&config, routes)),
    };

    // A bad pattern is the one failure that ends the process.
    match result.map_err(|e| e.downcast::<BuildError>()) {
        Ok(()) => Ok(()),
        Err(Ok(err)) => {
            log!("error"; "{err}");
            std::process::exit(1)
        }
        Err(Err(e)) => Err(e),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Parse every collection pattern without running anything.
fn check(config: &SiteConfig, routes: &[ComponentRoute]) -> Result<()> {
    for route in routes {
        let pattern = Pattern::parse(&route.file_path, &config.collection.prefix)
            .map_err(BuildError::from)?;
        let params: Vec<&str> = pattern.params().map(|p| p.name()).collect();
        log!("check"; "{} [{}]", route.file_path, params.join(", "));
    }
    log!("check"; "{} collection components ok", routes.len());
    Ok(())
}

/// Run every collection component once and write the manifest.
async fn build(config: &SiteConfig, routes: Vec<ComponentRoute>) -> Result<()> {
    let store = Arc::new(PageStore::new());
    let builders = create_builders(config, routes, &store, &Arc::new(Registry::default()))?;

    let mut tasks = JoinSet::new();
    for mut builder in builders {
        tasks.spawn(async move { builder.step().await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.context("Collection builder panicked")?;
    }

    write_manifest(config, &store)
}

/// Keep every builder running and mirror the page store to the manifest.
async fn watch(config: &SiteConfig, routes: Vec<ComponentRoute>) -> Result<()> {
    let store = Arc::new(PageStore::new());
    let notifier = Arc::new(FsNotifier::new()?);
    let builders = create_builders(config, routes, &store, &notifier)?;

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        log!("watch"; "shutting down...");
        stop_tx.send_replace(true);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut version = store.subscribe();
    let mut tasks = JoinSet::new();
    for mut builder in builders {
        tasks.spawn(async move { builder.run().await });
    }
    log!("watch"; "watching {} collection components, press Ctrl+C to stop", tasks.len());

    loop {
        tokio::select! {
            changed = version.changed() => {
                if changed.is_err() {
                    break;
                }
                if !debounce_or_stop(config.watch.debounce(), &mut stop_rx).await {
                    break;
                }
                version.borrow_and_update();
                if let Err(e) = write_manifest(config, &store) {
                    log!("error"; "{e:#}");
                }
            }
            _ = stop_rx.changed() => break,
        }
    }

    tasks.abort_all();
    write_manifest(config, &store)
}

/// Wait out the debounce window; `false` when a stop arrives first.
async fn debounce_or_stop(delay: Duration, stop: &mut tokio::sync::watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = stop.changed() => false,
    }
}

fn create_builders<N: ChangeNotifier>(
    config: &SiteConfig,
    routes: Vec<ComponentRoute>,
    store: &Arc<PageStore>,
    notifier: &Arc<N>,
) -> Result<Vec<CollectionBuilder<DataDirEngine, PageStore, N>>, BuildError> {
    let engine = Arc::new(DataDirEngine::new(&config.build.data));
    let options = BuilderOptions::from_config(config);

    routes
        .into_iter()
        .map(|route| {
            CollectionBuilder::new(
                route,
                Arc::clone(&engine),
                Arc::clone(store),
                Arc::clone(notifier),
                options.clone(),
            )
        })
        .collect()
}

fn write_manifest(config: &SiteConfig, store: &PageStore) -> Result<()> {
    let path = config.manifest_path();
    store.write_manifest(&path)?;
    log!("pages"; "{} pages -> {}", store.len(), rel_path(&path, config.get_root()));
    Ok(())
}
