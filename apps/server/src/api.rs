use std::sync::Arc;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use tickerboard_core::watchlist::{StockWithChart, WatchlistStats, DEFAULT_PERIOD};
use tickerboard_market_data::Period;

#[utoipa::path(get, path = "/api/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

fn parse_period(raw: Option<&str>) -> Result<Period, ApiError> {
    match raw {
        None => Ok(DEFAULT_PERIOD),
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid period: {}", s))),
    }
}

#[derive(serde::Deserialize)]
struct StocksQuery {
    period: Option<String>,
}

#[utoipa::path(get, path = "/api/stocks",
    responses((status = 200, description = "Tracked stocks with chart data and trend")))]
async fn list_stocks(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StocksQuery>,
) -> ApiResult<Json<Vec<StockWithChart>>> {
    let period = parse_period(q.period.as_deref())?;
    let stocks = state.watchlist_service.list_stocks(period).await?;
    Ok(Json(stocks))
}

#[derive(serde::Deserialize)]
struct AddStockBody {
    symbol: String,
}

#[utoipa::path(post, path = "/api/stocks",
    responses(
        (status = 201, description = "Created tracked stock"),
        (status = 409, description = "Symbol already tracked"),
        (status = 400, description = "Invalid symbol or upstream failure")
    ))]
async fn add_stock(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddStockBody>,
) -> ApiResult<(StatusCode, Json<StockWithChart>)> {
    let created = state.watchlist_service.add_stock(&body.symbol).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(delete, path = "/api/stocks/{id}",
    responses((status = 204), (status = 404, description = "Unknown id")))]
async fn remove_stock(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.watchlist_service.remove_stock(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/stats",
    responses((status = 200, description = "Watchlist statistics")))]
async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<WatchlistStats>> {
    let stats = state.watchlist_service.get_stats()?;
    Ok(Json(stats))
}

#[utoipa::path(get, path = "/api/validate/{symbol}",
    responses(
        (status = 200, description = "Symbol is valid"),
        (status = 400, description = "Symbol is not valid")
    ))]
async fn validate_symbol(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.watchlist_service.validate_symbol(&symbol).await {
        Ok(validation) => Json(validation).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "valid": false, "message": e.to_string() })),
        )
            .into_response(),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(healthz, readyz, list_stocks, add_stock, remove_stock, get_stats, validate_symbol),
    tags((name = "tickerboard"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .map(|o| o.parse().unwrap())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/stocks", get(list_stocks).post(add_stock))
        .route("/stocks/{id}", delete(remove_stock))
        .route("/stats", get(get_stats))
        .route("/validate/{symbol}", get(validate_symbol));

    Router::new()
        .nest("/api", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
