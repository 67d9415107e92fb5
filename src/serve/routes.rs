use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use domicilio::error::ValidationError;
use domicilio::geocoding::{GeocodePolicy, GeocodingGateway, GoogleGeocoder, Resolution};
use domicilio::locality::{AddressComponentMapper, LocalityMatch};
use domicilio::models::{
    AddressField, DeliveryZoneEntry, ParsedAddress, ResolutionState, ReverseGeocode,
    StructuredAddress,
};
use domicilio::parser::{AddressStringParser, RegionConflict};
use domicilio::zones::PostalCodeZone;

/// Application state shared across handlers
pub struct AppState {
    pub zone: PostalCodeZone,
    pub mapper: Arc<AddressComponentMapper>,
    pub parser: AddressStringParser,
    pub gateway: GeocodingGateway<GoogleGeocoder>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            suggestion: None,
        }),
    )
}

fn validation_error(err: ValidationError) -> ApiError {
    let message = err.to_string();
    match err {
        ValidationError::InvalidFormat { .. } => api_error(StatusCode::BAD_REQUEST, message),
        ValidationError::DeliveryNotAvailable { suggestion, .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: message,
                suggestion: Some(suggestion),
            }),
        ),
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    zones: usize,
    aliases: usize,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        zones: state.zone.table().len(),
        aliases: state.mapper.aliases().len(),
    })
}

/// Postal-code delivery check
pub async fn zone_handler(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<DeliveryZoneEntry>, ApiError> {
    state
        .zone
        .validate(&code)
        .map(Json)
        .map_err(validation_error)
}

#[derive(Debug, Deserialize)]
pub struct ParseQueryParams {
    text: String,
}

#[derive(Serialize)]
pub struct ParseResponse {
    address: ParsedAddress,
    unresolved: Vec<AddressField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_conflict: Option<RegionConflict>,
}

/// Free-text address parsing
pub async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ParseQueryParams>,
) -> Json<ParseResponse> {
    let address = state.parser.parse(&params.text);
    let region_conflict = state
        .parser
        .region_conflict(&StructuredAddress::from(address.clone()));
    if let Some(conflict) = &region_conflict {
        debug!("Region conflict in {:?}: {:?}", params.text, conflict);
    }

    Json(ParseResponse {
        unresolved: address.unresolved_fields(),
        address,
        region_conflict,
    })
}

#[derive(Debug, Deserialize)]
pub struct LocalityQueryParams {
    name: String,
}

/// Locality name normalization
pub async fn locality_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocalityQueryParams>,
) -> Result<Json<LocalityMatch>, ApiError> {
    state
        .mapper
        .map_locality(&params.name)
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "unknown locality"))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQueryParams {
    address: String,
    #[serde(default)]
    strict: bool,
}

/// Forward geocoding with the strict or lenient policy
pub async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQueryParams>,
) -> Result<Json<Resolution>, ApiError> {
    let policy = GeocodePolicy {
        strict: params.strict,
    };
    let resolution = state.gateway.resolve_detailed(&params.address, policy).await;

    if resolution.state == ResolutionState::ProviderError {
        warn!("Geocoding provider unavailable for {:?}", params.address);
        let reason = resolution.reason.unwrap_or_default();
        return Err(api_error(StatusCode::BAD_GATEWAY, reason));
    }
    Ok(Json(resolution))
}

#[derive(Debug, Deserialize)]
pub struct ReverseQueryParams {
    lat: f64,
    lon: f64,
}

/// Pin-drop reverse geocoding
pub async fn reverse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseQueryParams>,
) -> Result<Json<ReverseGeocode>, ApiError> {
    state
        .gateway
        .reverse_resolve(params.lat, params.lon)
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "invalid coordinates"))
}
