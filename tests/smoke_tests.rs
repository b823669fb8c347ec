use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tavolo::auth::{AuthConfig, AuthService};
use tavolo::config::Config;
use tavolo::handlers::AppState;
use tavolo::model::Role;
use tavolo::session::SessionRegistry;
use tavolo::startup;
use tavolo::store::{Datastore, MemoryStore};
use tokio::sync::RwLock;
use tower::ServiceExt;

fn test_config() -> Config {
    let mut screens = HashMap::new();
    for screen in [
        "orders",
        "reservations",
        "tables",
        "events",
        "staff",
        "inventory",
        "purchases",
        "shifts",
        "suppliers",
        "menu",
    ] {
        screens.insert(screen.to_string(), true);
    }
    Config {
        port: 0,
        jwt_secret: "test_secret".to_string(),
        token_expiration_minutes: 60,
        admin_username: "admin".to_string(),
        admin_password: "admin_pw".to_string(),
        manager_username: "manager".to_string(),
        manager_password: "manager_pw".to_string(),
        screens,
    }
}

async fn test_state() -> AppState {
    let config = test_config();
    let store: Arc<dyn Datastore> = Arc::new(MemoryStore::new());
    store
        .add_user(&config.admin_username, &config.admin_password, Role::Admin)
        .await
        .unwrap();
    store
        .add_user(
            &config.manager_username,
            &config.manager_password,
            Role::Manager,
        )
        .await
        .unwrap();

    AppState {
        auth_service: Arc::new(AuthService::new(AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_expiration_minutes: config.token_expiration_minutes,
        })),
        sessions: Arc::new(SessionRegistry::new()),
        config: Arc::new(RwLock::new(config)),
        store,
    }
}

async fn login(app: &axum::Router, username: &str, password: &str, role: &str) -> String {
    let body = serde_json::json!({
        "username": username,
        "password": password,
        "role": role,
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["token"].as_str().unwrap().to_string()
}

/// Smoke test to verify the config screen toggles
#[tokio::test]
async fn test_config_screen_toggles() {
    let config = test_config();
    assert!(config.is_screen_enabled("orders"));
    assert!(!config.is_screen_enabled("no-such-screen"));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = startup::router(test_state().await);
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = startup::router(test_state().await);
    let response = app
        .oneshot(Request::get("/manager/staff").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_role_split() {
    let app = startup::router(test_state().await);
    let token = login(&app, "manager", "manager_pw", "manager").await;

    // Manager screens are reachable with the manager token
    let response = app
        .clone()
        .oneshot(
            Request::get("/manager/staff")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Admin screens are not
    let response = app
        .oneshot(
            Request::get("/admin/reservations")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_wrong_role_login_rejected() {
    let app = startup::router(test_state().await);
    let body = serde_json::json!({
        "username": "manager",
        "password": "manager_pw",
        "role": "admin",
    });
    let response = app
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_order_flow_over_http() {
    let state = test_state().await;
    let store = state.store.clone();
    let category = store.add_menu_category("Mains").await.unwrap();
    let item = store.add_menu_item("Pasta", 10.0, category).await.unwrap();

    let app = startup::router(state);
    let token = login(&app, "admin", "admin_pw", "admin").await;
    let bearer = format!("Bearer {}", token);

    // Put two portions in the cart
    let body = serde_json::json!({ "menu_item_id": item, "quantity": 2 });
    let response = app
        .clone()
        .oneshot(
            Request::put("/admin/cart")
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let cart: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(cart["total"], 20.0);

    // Confirm and pay in cash
    let body = serde_json::json!({ "customer_name": "Vera", "phone": "555" });
    let response = app
        .clone()
        .oneshot(
            Request::post("/admin/orders/confirm")
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = serde_json::json!({ "method": "Cash" });
    let response = app
        .oneshot(
            Request::post("/admin/orders/pay")
                .header(header::AUTHORIZATION, &bearer)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let invoice: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(invoice["customer_name"], "Vera");
    assert_eq!(invoice["total_amount"], 20.0);
}
