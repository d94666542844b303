#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the epidemiological analytics dashboard.
//!
//! Serves seven read-only JSON views over weekly disease surveillance
//! data held in Apache Druid, plus a health check at `/`. Every view is
//! answered by the `epi_dash_analytics` pipeline against a shared,
//! immutable [`Store`] handle.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use epi_dash_store::{DruidClient, Store};

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Analytical store every view queries.
    pub store: Arc<dyn Store>,
}

/// Registers the API routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::health))
        .route("/trend", web::get().to(handlers::trend))
        .route("/top-diseases", web::get().to(handlers::top_diseases))
        .route("/climate-impact", web::get().to(handlers::climate_impact))
        .route("/map", web::get().to(handlers::map))
        .route("/diseases", web::get().to(handlers::diseases))
        .route("/states", web::get().to(handlers::states))
        .route("/weeks", web::get().to(handlers::date_range));
}

/// Starts the API server.
///
/// Builds the Druid client from `config` and starts the Actix-Web HTTP
/// server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`) and is expected to have initialised logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store client cannot be
/// built, the HTTP server fails to bind, or it encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let client = DruidClient::new(&config.store).map_err(std::io::Error::other)?;
    log::info!(
        "Querying datasource '{}' via {} (timeout {}s)",
        config.store.datasource,
        client.endpoint(),
        config.store.timeout.as_secs()
    );

    let state = web::Data::new(AppState {
        store: Arc::new(client),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
