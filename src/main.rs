#[macro_use]
extern crate rocket;

use log::{info, warn};

mod app;
mod auth;
mod boot;
mod config;
mod content;
mod db;
mod error;
mod models;
mod routes;
mod store;
mod uploads;


use config::AppConfig;

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = AppConfig::load_default().expect("Failed to load homepage config");

    // Boot check: create and verify directories before anything touches them
    boot::run(&config);

    let store = store::open(&config.store).expect("Failed to open content store");
    store
        .run_migrations()
        .expect("Failed to run content store migrations");

    if config.auth.admin_token.is_none() {
        warn!("No admin token configured: admin routes accept every request");
    }
    let verifier = auth::verifier_from_config(&config.auth);

    info!(
        "Homepage API mounted at {} ({} store, {:?} uploads in {})",
        app::API_BASE,
        store.backend_name(),
        config.uploads.strategy,
        config.uploads.dir
    );

    app::build(app::figment(&config), config, store, verifier)
}
