//! Integration tests for the HTTP API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use folio_core::models::{NewCategory, NewItem};
use folio_core::{FolioConfig, PortfolioStore};
use folio_web::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<PortfolioStore>) {
    let store = Arc::new(PortfolioStore::open_in_memory().unwrap());
    let router = create_router(AppState::new(Arc::clone(&store), FolioConfig::default()));
    (router, store)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (router, store) = app();
    store.create_category(&NewCategory::named("Film")).unwrap();

    let (status, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["categories"], 1);
    assert_eq!(body["items"], 0);
}

#[tokio::test]
async fn test_dashboard_validation_is_bad_request() {
    let (router, _) = app();

    let (status, body) = send(&router, get("/api/analytics/dashboard?startDate=not-a-date")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("startDate"));

    let (status, _) = send(&router, get("/api/analytics/dashboard?period=2w")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        get("/api/analytics/dashboard?startDate=1000-01-01&endDate=9999-12-31"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at most"));

    let (status, _) = send(&router, get("/api/analytics/dashboard?endDate=%2B262142-12-31")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tracked_view_shows_on_dashboard() {
    let (router, store) = app();
    let item = store.create_item(&NewItem::new("Salt Flats", "/img/salt.jpg")).unwrap();

    let (status, body) = send(
        &router,
        post_json(
            "/api/analytics/events",
            json!({
                "eventType": "page_view",
                "itemId": item.id,
                "visitorId": "v-1",
                "path": "/work/salt-flats",
                "referrer": "https://www.reddit.com/r/photography"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["eventType"], "page_view");

    let (status, snapshot) = send(&router, get("/api/analytics/dashboard?period=7d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["overview"]["totalViews"], 1);
    assert_eq!(snapshot["topContent"][0]["title"], "Salt Flats");
    assert_eq!(snapshot["trafficSources"][0]["source"], "reddit.com");
    assert_eq!(snapshot["dailyViews"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let (router, _) = app();
    let (status, body) = send(
        &router,
        post_json("/api/analytics/events", json!({ "eventType": "hover" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_portfolio_by_category() {
    let (router, store) = app();
    let travel = store.create_category(&NewCategory::named("Travel")).unwrap();
    store
        .create_item(&NewItem::new("Fjords", "/img/fjords.jpg").in_category(travel.id))
        .unwrap();
    store.create_item(&NewItem::new("Studio", "/img/studio.jpg")).unwrap();
    store
        .create_item(&NewItem::new("Draft", "/img/draft.jpg").in_category(travel.id).unpublished())
        .unwrap();

    let (status, items) = send(&router, get("/api/portfolio?category=travel")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Fjords"]);

    let (status, _) = send(&router, get("/api/portfolio?category=nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_featured_default_limit() {
    let (router, store) = app();
    for i in 0..8 {
        store
            .create_item(&NewItem::new(format!("Feature {}", i), format!("/{}.jpg", i)).featured())
            .unwrap();
    }

    let (status, items) = send(&router, get("/api/portfolio/featured")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 6);

    let (_, items) = send(&router, get("/api/portfolio/featured?limit=2")).await;
    assert_eq!(items.as_array().unwrap().len(), 2);

    let (status, _) = send(&router, get("/api/portfolio/featured?limit=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inquiry_lifecycle() {
    let (router, _) = app();

    let (status, body) = send(
        &router,
        post_json(
            "/api/inquiries",
            json!({ "name": "Lin", "email": "lin-at-example.com", "message": "Hi" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, created) = send(
        &router,
        post_json(
            "/api/inquiries",
            json!({ "name": "Lin", "email": "lin@example.com", "message": "Hi" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "new");

    let id = created["id"].as_i64().unwrap();
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/inquiries/{}", id))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "status": "read" }).to_string()))
        .unwrap();
    let (status, updated) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "read");

    let (_, unread) = send(&router, get("/api/inquiries?status=new")).await;
    assert!(unread.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_categories_create_and_list() {
    let (router, _) = app();
    let (status, created) = send(
        &router,
        post_json("/api/categories", json!({ "name": "Black & White", "sortOrder": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "black-white");

    let (_, categories) = send(&router, get("/api/categories")).await;
    assert_eq!(categories.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_gallery_layout() {
    let (router, _) = app();
    let (status, body) = send(
        &router,
        post_json(
            "/api/gallery/layout",
            json!({
                "width": 900,
                "items": [
                    { "id": "a", "width": 1000, "height": 1000 },
                    { "id": "b", "width": 1000, "height": 500 },
                    { "id": "c" }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "laid");
    assert_eq!(body["columns"], 3);
    let columns: Vec<_> = body["placements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["column"].as_u64().unwrap())
        .collect();
    assert_eq!(columns, vec![0, 1, 2]);

    let (status, body) = send(
        &router,
        post_json("/api/gallery/layout", json!({ "width": 0, "items": [{ "id": "a" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "skipped");
}

#[tokio::test]
async fn test_sse_endpoint_exists() {
    let (router, _) = app();
    let response = router.oneshot(get("/api/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(content_type.contains("text/event-stream"));
}
