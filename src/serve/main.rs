//! Address service.
//!
//! Exposes postal-code zoning, free-text parsing, locality normalization and
//! policy-driven geocoding over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use domicilio::geocoding::{GeocodingGateway, GoogleGeocoder};
use domicilio::parser::AddressStringParser;
use domicilio::Config;

mod routes;
use routes::AppState;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Delivery address HTTP service")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// Geocoding API key (overrides the config file)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(api_key) = args.api_key {
        config.geocoding.api_key = api_key;
    }

    info!("Domicilio Address Server");

    let zone = config.zone_validator()?;
    info!(
        "Loaded {} delivery zones (strict whitelist: {})",
        zone.table().len(),
        zone.policy().strict_zone_whitelist
    );

    let mapper = Arc::new(config.locality_mapper()?);
    info!("Loaded {} locality aliases", mapper.aliases().len());

    let parser = AddressStringParser::new(mapper.clone()).context("Failed to compile parser")?;
    let provider = GoogleGeocoder::new(&config.geocoding)?;
    let gateway = GeocodingGateway::new(provider, mapper.clone(), config.gateway_settings());

    let state = Arc::new(AppState {
        zone,
        mapper,
        parser,
        gateway,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(routes::health_handler))
        .route("/v1/zones/{code}", get(routes::zone_handler))
        .route("/v1/parse", get(routes::parse_handler))
        .route("/v1/locality", get(routes::locality_handler))
        .route("/v1/geocode", get(routes::geocode_handler))
        .route("/v1/reverse", get(routes::reverse_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
