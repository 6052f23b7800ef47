//! HTTP API tests

use super::*;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::PathBuf;
use tower::ServiceExt;

use crate::config::{Config, PersonSheet};
use crate::services::fixtures::{sample_dataset, sample_workbook};
use crate::services::store::DatasetStore;

fn test_config() -> Config {
    Config {
        workbook_path: PathBuf::from("/nonexistent/gastos.xlsx"),
        people: vec![
            PersonSheet { person: "Mohamed".into(), sheet: "Mohamed".into() },
            PersonSheet { person: "Evelyn".into(), sheet: "Evelyn".into() },
        ],
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

fn setup_test_app() -> Router {
    let store = DatasetStore::with_dataset(sample_dataset());
    router(Arc::new(AppState::new(test_config(), store)))
}

fn setup_empty_app() -> Router {
    router(Arc::new(AppState::new(test_config(), DatasetStore::new())))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = get(setup_test_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_people() {
    let json = get_body_json(get(setup_test_app(), "/api/people").await).await;
    assert_eq!(json["combined"], "combined");
    assert_eq!(json["people"][1]["person"], "Evelyn");
}

#[tokio::test]
async fn test_options_default_to_first_person() {
    let response = get(setup_test_app(), "/api/options").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["defaults"]["person"], "Mohamed");
    assert_eq!(json["defaults"]["month"], "Jan");
    assert_eq!(json["defaults"]["category"], "all");
    assert_eq!(json["categories"].as_array().unwrap().last().unwrap(), "all");
}

#[tokio::test]
async fn test_view_combined_month() {
    let response = get(setup_test_app(), "/api/view?person=combined&month=Jan&category=all").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
    assert_eq!(json["by_category"][0]["key"], "Food");
    assert_eq!(json["by_category"][0]["series"], "Mohamed");
    assert_eq!(json["monthly_totals"].as_array().unwrap().len(), 4);
    assert!(json["comparison"].is_null());
}

#[tokio::test]
async fn test_view_with_expense_comparison() {
    let response = get(setup_test_app(), "/api/view?person=Evelyn&expense=Lunch&month=").await;
    let json = get_body_json(response).await;

    let comparison = json["comparison"].as_array().unwrap();
    assert_eq!(comparison.len(), 2);
    assert_eq!(comparison[1]["key"], "Mar");
    assert_eq!(comparison[1]["amount"], 25.0);
    assert!(comparison[1].get("series").is_none());
}

#[tokio::test]
async fn test_view_unknown_person() {
    let response = get(setup_test_app(), "/api/view?person=Nobody").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Nobody"));
}

#[tokio::test]
async fn test_export_csv() {
    let response = get(setup_test_app(), "/api/export?person=Mohamed&category=Food").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("expenses_export.csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.starts_with("person,month,category,description,amount\n"));
}

#[tokio::test]
async fn test_export_empty_selection_is_no_content() {
    let response = get(setup_test_app(), "/api/export?person=Mohamed&category=Nope").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_failed_reload_keeps_serving_previous_data() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/reload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = get(app, "/api/view?person=combined").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_queries_before_first_load() {
    let response = get(setup_empty_app(), "/api/view").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = get(setup_empty_app(), "/api/people").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reload_from_uploaded_workbook() {
    let app = setup_empty_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/reload")
                .body(Body::from(sample_workbook()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["combined_rows"], 2);
    assert_eq!(json["people"][0]["person"], "Mohamed");
    assert_eq!(json["people"][0]["months"][0], "Jan");

    let json = get_body_json(get(app, "/api/view?person=Evelyn").await).await;
    assert_eq!(json["rows"][0]["description"], "Bus");
    assert_eq!(json["rows"][0]["amount"], 3.5);
}
