#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the mobility map dashboard.
//!
//! Serves the reconciled tract feature set (boundaries joined with ACS
//! statistics and derived metrics) to the map frontend, plus single
//! tract detail lookups for the inspector panel.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use mobility_map_pipeline::{Pipeline, PipelineConfig};

/// Shared application state.
pub struct AppState {
    /// The reconciliation pipeline, including its caches.
    pub pipeline: Arc<Pipeline>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = PipelineConfig::from_env();
    log::info!(
        "Using ACS {} 5-year estimates for {} counties",
        config.year,
        config.counties.len()
    );

    let pipeline = Pipeline::new(config).expect("Failed to build pipeline");
    let state = web::Data::new(AppState {
        pipeline: Arc::new(pipeline),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/tracts", web::get().to(handlers::tracts))
                    .route("/tracts/{geoid}", web::get().to(handlers::tract_detail)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
