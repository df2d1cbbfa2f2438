use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use valex::api::{self, AppState};
use valex::models::employee::Employee;
use valex::services::{
    card_service::CardService,
    crypto::Argon2SecretHasher,
    memory::{InMemoryCardRepository, InMemoryCompanyAuthorizer, InMemoryEmployeeDirectory},
};

const API_KEY: &str = "zadKLNx.DzvOVjQH01TumGl2urPjPQSxUbf67vs0";

struct TestApp {
    router: Router,
    cards: Arc<InMemoryCardRepository>,
    employee_id: Uuid,
}

fn test_app() -> TestApp {
    let employee = Employee {
        id: Uuid::new_v4(),
        full_name: "Ciclana Maria Madeira".to_string(),
        cpf: "08434681895".to_string(),
        email: "ciclaninha@gmail.com".to_string(),
        company_id: Uuid::new_v4(),
    };
    let employee_id = employee.id;

    let cards = Arc::new(InMemoryCardRepository::new());
    let service = CardService::new(
        Arc::new(InMemoryCompanyAuthorizer::new([API_KEY])),
        Arc::new(InMemoryEmployeeDirectory::new([employee])),
        cards.clone(),
        Arc::new(Argon2SecretHasher::new(Secret::new("test-pepper".to_string()))),
    );

    TestApp {
        router: api::app(AppState::new(service)),
        cards,
        employee_id,
    }
}

async fn send(
    router: &Router,
    uri: &str,
    api_key: Option<&str>,
    body: Value,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        request = request.header("x-api-key", key);
    }

    let response = router
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).ok();

    (status, json)
}

async fn create_card(app: &TestApp, card_type: &str) -> Value {
    let (status, body) = send(
        &app.router,
        "/cards",
        Some(API_KEY),
        json!({ "employeeId": app.employee_id, "type": card_type }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body.unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_returns_issued_card() {
    let app = test_app();
    let issued = create_card(&app, "education").await;

    assert_eq!(issued["cardholderName"], "CICLANA M MADEIRA");
    assert_eq!(issued["type"], "education");
    assert_eq!(issued["number"].as_str().unwrap().len(), 16);
    assert_eq!(issued["securityCode"].as_str().unwrap().len(), 3);
    assert_eq!(app.cards.insert_calls(), 1);

    let id: Uuid = issued["id"].as_str().unwrap().parse().unwrap();
    let stored = app.cards.get(id).await.unwrap();
    assert_ne!(stored.security_code, issued["securityCode"].as_str().unwrap());
}

#[tokio::test]
async fn test_duplicate_card_type_is_conflict() {
    let app = test_app();
    create_card(&app, "health").await;

    let (status, body) = send(
        &app.router,
        "/cards",
        Some(API_KEY),
        json!({ "employeeId": app.employee_id, "type": "health" }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.unwrap()["type"], "conflict");
    assert_eq!(app.cards.insert_calls(), 1);
}

#[tokio::test]
async fn test_create_requires_api_key() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        "/cards",
        None,
        json!({ "employeeId": app.employee_id, "type": "health" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        "/cards",
        Some("wrong-key"),
        json!({ "employeeId": app.employee_id, "type": "health" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.unwrap()["type"], "unauthorized");

    assert_eq!(app.cards.insert_calls(), 0);
}

#[tokio::test]
async fn test_create_for_unknown_employee_is_not_found() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        "/cards",
        Some(API_KEY),
        json!({ "employeeId": Uuid::new_v4(), "type": "transport" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_card_lifecycle() {
    let app = test_app();
    let issued = create_card(&app, "restaurant").await;
    let id = issued["id"].as_str().unwrap();
    let cvc = issued["securityCode"].as_str().unwrap();
    let wrong_cvc = if cvc == "000" { "111" } else { "000" };

    let activate = format!("/cards/{}/activate", id);

    let (status, _) = send(
        &app.router,
        &activate,
        None,
        json!({ "securityCode": cvc, "password": "12ab" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        &activate,
        None,
        json!({ "securityCode": wrong_cvc, "password": "1234" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.cards.update_calls(), 0);

    let (status, _) = send(
        &app.router,
        &activate,
        None,
        json!({ "securityCode": cvc, "password": "1234" }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.cards.update_calls(), 1);

    let (status, _) = send(
        &app.router,
        &activate,
        None,
        json!({ "securityCode": cvc, "password": "4321" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.cards.update_calls(), 1);

    let block = format!("/cards/{}/block", id);
    let unblock = format!("/cards/{}/unblock", id);

    let (status, _) = send(&app.router, &block, None, json!({ "password": "9999" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, &block, None, json!({ "password": "1234" })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, &block, None, json!({ "password": "1234" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app.router, &unblock, None, json!({ "password": "1234" })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(app.cards.update_calls(), 3);
}

#[tokio::test]
async fn test_activate_unknown_card_is_not_found() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        &format!("/cards/{}/activate", Uuid::new_v4()),
        None,
        json!({ "securityCode": "123", "password": "1234" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.unwrap()["type"], "not_found");
}
