//! Placeholder demo - runs the example plugin against an in-memory world.
//!
//! Registers the host's built-in placeholders, loads the example plugin,
//! greets every online player and refreshes their sidebars until Ctrl-C.

mod demo;

use std::sync::Arc;

use placeholder_engine::{Config, PlaceholderService, TokioScheduler};
use tracing::info;
use tracing_subscriber::EnvFilter;

use demo::host;
use demo::plugin::ExamplePlugin;
use demo::world::World;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" for our crates
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("placeholder_engine=info,placeholder_demo=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting placeholder demo...");

    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Sidebar refresh interval: {:?}", config.refresh_interval);

    let service = Arc::new(PlaceholderService::new(config.engine.clone()));
    let world = Arc::new(World::sample());

    host::register_builtins(&service, &world)?;
    let plugin = ExamplePlugin::load(Arc::clone(&service), Arc::clone(&world));

    let listing = serde_json::to_string_pretty(&service.list_placeholders())?;
    info!("Registered placeholders:\n{}", listing);

    for player in world.online_players() {
        plugin.on_join(&player).await;
    }

    let refresh = plugin.schedule_refresh(&TokioScheduler::new(), config.refresh_interval);

    info!("Running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    refresh.cancel();
    plugin.unload();

    Ok(())
}
