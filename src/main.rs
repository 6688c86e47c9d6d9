//! ShopHub hook runtime: plugin host for order, subscription, and catalog events.
//!
//! Main entry point that loads configuration, activates the enabled built-in
//! plugins, and drives their schedules until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use shophub_core::config::AppConfig;
use shophub_core::error::AppError;
use shophub_plugin::{Plugin, PluginManager};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SHOPHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Look up a built-in plugin by id
fn builtin_plugin(id: &str) -> Option<Arc<dyn Plugin>> {
    match id {
        plugin_order_audit::plugin::PLUGIN_ID => {
            let plugin: Arc<dyn Plugin> = Arc::new(plugin_order_audit::OrderAuditPlugin::new());
            Some(plugin)
        }
        _ => None,
    }
}

/// Main run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShopHub hook runtime v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Plugin manager ───────────────────────────────────
    let plugin_manager = Arc::new(PluginManager::from_config(&config));
    tracing::info!(
        filter_failure_policy = ?config.hooks.filter_failure_policy,
        "Plugin system initialized"
    );

    // ── Step 2: Activate built-in plugins ────────────────────────
    for id in &config.plugins.enabled {
        let Some(plugin) = builtin_plugin(id) else {
            tracing::warn!(plugin_id = %id, "Unknown plugin id in configuration, skipping");
            continue;
        };
        plugin_manager.activate(plugin).await?;
    }

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Start schedule runner ────────────────────────────
    let scheduler_handle = if config.scheduler.enabled {
        let scheduler = Arc::clone(plugin_manager.scheduler());
        let handle = tokio::spawn(async move {
            scheduler.run(shutdown_rx).await;
        });
        tracing::info!("Schedule runner started");
        Some(handle)
    } else {
        tracing::info!("Schedule runner disabled");
        None
    };

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = scheduler_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    plugin_manager.deactivate_all().await;

    tracing::info!("ShopHub hook runtime shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
