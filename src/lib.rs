#[macro_use]
extern crate rocket;

pub mod api;
pub mod bootstrap;
pub mod common;
pub mod config;
pub mod database;
pub mod models;
pub mod view;
pub mod workflow;

use api::handlers::library::{generate_library_routes, generate_unavailable_routes};
use api::handlers::media::generate_media_routes;
use api::handlers::player::generate_player_routes;
use api::{AppState, StorageUnavailable};
use config::AppConfig;

fn figment(config: &AppConfig) -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("limits.file", config.upload_limit()))
        .merge(("limits.data-form", config.upload_limit()))
}

/// The library server.
pub fn build_rocket(state: AppState, config: AppConfig) -> rocket::Rocket<rocket::Build> {
    rocket::custom(figment(&config))
        .manage(state)
        .manage(config)
        .mount("/", generate_library_routes())
        .mount("/", generate_media_routes())
        .mount("/", generate_player_routes())
}

/// Serves only the storage-unavailable page.
pub fn build_unavailable_rocket(
    reason: String,
    config: AppConfig,
) -> rocket::Rocket<rocket::Build> {
    rocket::custom(figment(&config))
        .manage(StorageUnavailable { reason })
        .manage(config)
        .mount("/", generate_unavailable_routes())
}
