//! Web router using Axum

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::Sse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use folio_core::analytics::{compute_dashboard, DashboardQuery};
use folio_core::masonry::{compute_layout, LayoutInput};
use folio_core::models::{
    AnalyticsEvent, Category, Inquiry, InquiryStatus, NewCategory, NewEvent, NewInquiry, NewItem,
    PortfolioItem,
};
use folio_core::{AnalyticsSource, FolioConfig, PortfolioStore};
use folio_types::{DashboardSnapshot, Dimensions, LayoutOutcome};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::error::ApiError;
use crate::sse;

const DEFAULT_FEATURED: usize = 6;
const MAX_FEATURED: usize = 50;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PortfolioStore>,
    pub config: Arc<FolioConfig>,
}

impl AppState {
    pub fn new(store: Arc<PortfolioStore>, config: FolioConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Run a store call off the async runtime
    async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&PortfolioStore, &FolioConfig) -> folio_core::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        Ok(tokio::task::spawn_blocking(move || f(&store, &config)).await??)
    }
}

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/analytics/dashboard", get(dashboard_handler))
        .route("/api/analytics/events", post(track_handler))
        .route("/api/portfolio", get(portfolio_handler).post(create_item_handler))
        .route("/api/portfolio/featured", get(featured_handler))
        .route("/api/categories", get(categories_handler).post(create_category_handler))
        .route("/api/inquiries", get(inquiries_handler).post(create_inquiry_handler))
        .route("/api/inquiries/{id}", patch(update_inquiry_handler))
        .route("/api/gallery/layout", post(layout_handler))
        .route("/api/events", get(sse_handler))
        .layer(cors)
        .with_state(state)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let counts = state.blocking(|store, _| store.catalog_counts()).await?;
    Ok(Json(json!({
        "status": "healthy",
        "items": counts.items,
        "categories": counts.categories,
    })))
}

async fn dashboard_handler(
    State(state): State<AppState>,
    params: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardSnapshot>, ApiError> {
    let params = query(params)?;
    let snapshot = state
        .blocking(move |store, config| compute_dashboard(store, &params, &config.analytics))
        .await?;
    Ok(Json(snapshot))
}

async fn track_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyticsEvent>), ApiError> {
    let event = body(payload)?;
    let recorded = state.blocking(move |store, _| store.record_event(&event)).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

#[derive(Debug, Deserialize)]
struct PortfolioParams {
    category: Option<String>,
}

async fn portfolio_handler(
    State(state): State<AppState>,
    params: Result<Query<PortfolioParams>, QueryRejection>,
) -> Result<Json<Vec<PortfolioItem>>, ApiError> {
    let params = query(params)?;
    let items = state
        .blocking(move |store, _| {
            let category = params.category.as_deref().filter(|c| !c.is_empty());
            store.list_items(category, true)
        })
        .await?;
    Ok(Json(items))
}

async fn create_item_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<(StatusCode, Json<PortfolioItem>), ApiError> {
    let item = body(payload)?;
    let created = state.blocking(move |store, _| store.create_item(&item)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct FeaturedParams {
    limit: Option<usize>,
}

async fn featured_handler(
    State(state): State<AppState>,
    params: Result<Query<FeaturedParams>, QueryRejection>,
) -> Result<Json<Vec<PortfolioItem>>, ApiError> {
    let limit = query(params)?
        .limit
        .unwrap_or(DEFAULT_FEATURED)
        .clamp(1, MAX_FEATURED);
    let items = state
        .blocking(move |store, _| store.featured_items(limit))
        .await?;
    Ok(Json(items))
}

async fn categories_handler(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state.blocking(|store, _| store.list_categories()).await?;
    Ok(Json(categories))
}

async fn create_category_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = body(payload)?;
    let created = state
        .blocking(move |store, _| store.create_category(&category))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct InquiryParams {
    status: Option<InquiryStatus>,
}

async fn inquiries_handler(
    State(state): State<AppState>,
    params: Result<Query<InquiryParams>, QueryRejection>,
) -> Result<Json<Vec<Inquiry>>, ApiError> {
    let status = query(params)?.status;
    let inquiries = state
        .blocking(move |store, _| store.list_inquiries(status))
        .await?;
    Ok(Json(inquiries))
}

async fn create_inquiry_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewInquiry>, JsonRejection>,
) -> Result<(StatusCode, Json<Inquiry>), ApiError> {
    let inquiry = body(payload)?;
    let created = state
        .blocking(move |store, _| store.create_inquiry(&inquiry))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: InquiryStatus,
}

async fn update_inquiry_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Inquiry>, ApiError> {
    let update = body(payload)?;
    let inquiry = state
        .blocking(move |store, _| store.set_inquiry_status(id, update.status))
        .await?;
    Ok(Json(inquiry))
}

/// Card as sent by the gallery client
#[derive(Debug, Deserialize)]
pub struct LayoutCard {
    pub id: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub width: f64,
    #[serde(default)]
    pub items: Vec<LayoutCard>,
}

async fn layout_handler(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> Result<Json<LayoutOutcome>, ApiError> {
    let request = body(payload)?;
    let masonry = &state.config.masonry;

    let items: Vec<LayoutInput> = request
        .items
        .into_iter()
        .map(|card| {
            let dimensions = match (card.width, card.height) {
                (Some(w), Some(h)) => Some(Dimensions::new(w, h)),
                _ => None,
            };
            LayoutInput::from_dimensions(card.id, dimensions, masonry)
        })
        .collect();

    let outcome = compute_layout(&items, request.width, masonry);
    debug!(
        items = items.len(),
        width = request.width,
        skipped = outcome.is_skipped(),
        "Gallery layout computed"
    );
    Ok(Json(outcome))
}

/// SSE endpoint for live updates
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    sse::create_sse_stream(state.store.event_bus().clone())
}
