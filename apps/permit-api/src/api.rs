//! API handlers for the permit server
//!
//! Provides REST endpoints for:
//! - Address search and PNU derivation
//! - Land characteristics, price and usage lookups
//! - Building title and unit lookups
//! - Permit application PDF generation

use std::path::Path;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use permit_pdf::FormData;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::error::{lookup_error_body, section_body, section_result, usage_result, ApiError};
use crate::service::RawSource;
use crate::AppState;

/// File name offered for the generated application
pub const PDF_FILENAME: &str = "land_permit_application.pdf";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "permit-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: String,
}

#[derive(Deserialize)]
pub struct PnuQuery {
    #[serde(default)]
    pub pnu: String,
}

#[derive(Deserialize)]
pub struct UnitQueryParams {
    #[serde(default)]
    pub pnu: String,
    #[serde(default)]
    pub dong: String,
    #[serde(default)]
    pub ho: String,
}

#[derive(Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub pnu: String,
    #[serde(default)]
    pub address: String,
}

/// Handler: GET /api/address/jibun
pub async fn handle_address_search(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Json<Value> {
    match state.service.resolve_address(&query.address).await {
        Ok(results) => Json(json!({ "results": results })),
        Err(err) => {
            let mut body = lookup_error_body(&err);
            body["results"] = json!([]);
            Json(body)
        }
    }
}

/// Handler: GET /api/land/info
pub async fn handle_land_info(
    State(state): State<AppState>,
    Query(query): Query<PnuQuery>,
) -> Result<Json<Value>, ApiError> {
    let section = state.service.land_info(&query.pnu).await?;
    Ok(Json(section_body(section)))
}

/// Handler: GET /api/land/price
pub async fn handle_land_price(
    State(state): State<AppState>,
    Query(query): Query<PnuQuery>,
) -> Result<Json<Value>, ApiError> {
    let section = state.service.land_price(&query.pnu).await?;
    Ok(Json(section_body(section)))
}

/// Handler: GET /api/land/usage
pub async fn handle_land_usage(
    State(state): State<AppState>,
    Query(query): Query<PnuQuery>,
) -> Json<Value> {
    Json(usage_result(state.service.land_usage(&query.pnu).await))
}

/// Handler: GET /api/land/all
pub async fn handle_land_all(
    State(state): State<AppState>,
    Query(query): Query<PnuQuery>,
) -> Result<Json<Value>, ApiError> {
    let overview = state.service.land_all(&query.pnu).await?;
    Ok(Json(json!({
        "pnu": overview.pnu,
        "info": section_result(overview.info),
        "price": section_result(overview.price),
        "usage": usage_result(overview.usage),
    })))
}

/// Handler: GET /api/building/info
pub async fn handle_building_info(
    State(state): State<AppState>,
    Query(query): Query<PnuQuery>,
) -> Result<Json<Value>, ApiError> {
    let section = state.service.building_info(&query.pnu).await?;
    Ok(Json(section_body(section)))
}

/// Handler: GET /api/building/unit
pub async fn handle_building_unit(
    State(state): State<AppState>,
    Query(query): Query<UnitQueryParams>,
) -> Result<Json<Value>, ApiError> {
    let section = state
        .service
        .building_unit(&query.pnu, &query.dong, &query.ho)
        .await?;
    Ok(Json(section_body(section)))
}

/// Handler: GET /api/debug/raw
pub async fn handle_debug_raw(
    State(state): State<AppState>,
    Query(query): Query<RawQuery>,
) -> Result<Json<Value>, ApiError> {
    let source: RawSource = query.source.parse()?;
    debug!("Raw echo for {:?}", source);
    let raw = state.service.raw(source, &query.pnu, &query.address).await?;
    Ok(Json(raw))
}

/// Handler: POST /api/generate-pdf
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(form): Json<FormData>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PDF generation request with {} fields", form.len());

    let pdf = state.renderer.render(&form).await?;
    info!("Generated permit application ({} bytes)", pdf.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", PDF_FILENAME),
            ),
        ],
        pdf,
    ))
}

/// Full router: API routes, the bundled page and static assets
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/address/jibun", get(handle_address_search))
        .route("/api/land/info", get(handle_land_info))
        .route("/api/land/price", get(handle_land_price))
        .route("/api/land/usage", get(handle_land_usage))
        .route("/api/land/all", get(handle_land_all))
        .route("/api/building/info", get(handle_building_info))
        .route("/api/building/unit", get(handle_building_unit))
        .route("/api/debug/raw", get(handle_debug_raw))
        .route("/api/generate-pdf", post(handle_generate_pdf))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
