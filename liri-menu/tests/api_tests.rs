//! Integration tests for the fragment server routes

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use liri_menu::cache::CacheStore;
use liri_menu::catalog::{CatalogError, CatalogSource};
use liri_menu::mount::MountController;
use liri_menu::section::{default_sections, SectionConfig};
use liri_menu::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

/// Coffee has items, beer is down, everything else is empty
struct FixedSource;

#[async_trait]
impl CatalogSource for FixedSource {
    async fn fetch(&self, section: &SectionConfig) -> Result<Value, CatalogError> {
        match section.record_type.as_str() {
            "coffeeItem" => Ok(json!({"result": [
                {"_id": "c1", "title": {"en": "Espresso"}, "price": 2.5},
                {"_id": "c2", "title": {"en": "Cappuccino"}, "price": 3.2}
            ]})),
            "beerItem" => Err(CatalogError::Status(500, "Internal Server Error".to_string())),
            _ => Ok(json!({"result": []})),
        }
    }
}

fn setup_app(mounts: Option<Vec<String>>) -> axum::Router {
    let controller = MountController::new(Arc::new(FixedSource), Arc::new(CacheStore::disabled()), "en");
    build_router(AppState::new(controller, default_sections(), mounts))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

#[tokio::test]
async fn test_health() {
    let response = setup_app(None).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "liri-menu");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_full_menu() {
    let response = setup_app(None).oneshot(get("/menu")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("<div data-liri-coffee>"));
    assert!(html.contains("Espresso"));
    assert!(html.contains("3,20"));
    assert!(html.contains("Failed to load the beer menu"));
    assert!(html.contains("No tea items available at the moment"));
}

#[tokio::test]
async fn test_section_fragment_by_name() {
    let response = setup_app(None).oneshot(get("/menu/coffee")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.starts_with("<div data-liri-coffee>"));
    assert!(html.contains("Cappuccino"));
    assert!(!html.contains("data-liri-tea"));
}

#[tokio::test]
async fn test_section_fragment_by_mount_suffix() {
    let response = setup_app(None).oneshot(get("/menu/softdrinks")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("No soft drinks items available at the moment"));
}

#[tokio::test]
async fn test_unknown_section_is_404() {
    let response = setup_app(None).oneshot(get("/menu/desserts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_str(&body_text(response.into_body()).await).unwrap();
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_section_without_mount_point_is_404() {
    let app = setup_app(Some(vec!["data-liri-coffee".to_string()]));
    let response = app.oneshot(get("/menu/tea")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_section_still_served() {
    let response = setup_app(None).oneshot(get("/menu/beer")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert_eq!(
        html,
        "<div data-liri-beer><div class=\"error-message\" role=\"alert\">Failed to load the beer menu</div></div>"
    );
}
