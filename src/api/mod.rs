// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthenticatedUser,
    models::{
        CreateItemResponse, CredentialsRequest, DeleteItemResponse, ImportBatch, ImportResponse,
        InventoryItem, ItemFields, NextIdResponse, Quantity, RegisterResponse, TokenResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod items;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/token", post(auth::login))
        .route("/items", get(items::list_items).post(items::create_item))
        .route("/items/import", post(items::import_items))
        .route("/items/next-id", get(items::next_item_id))
        .route("/items/search", get(items::search_items))
        .route(
            "/items/{id}",
            put(items::update_item).delete(items::delete_item),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the bearer token scheme referenced by item endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        auth::register,
        auth::login,
        items::list_items,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::import_items,
        items::next_item_id,
        items::search_items,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AuthenticatedUser,
            CredentialsRequest,
            RegisterResponse,
            TokenResponse,
            Quantity,
            ItemFields,
            InventoryItem,
            CreateItemResponse,
            DeleteItemResponse,
            NextIdResponse,
            ImportBatch,
            ImportResponse
        )
    ),
    tags(
        (name = "Auth", description = "Account registration and session tokens"),
        (name = "Items", description = "Encrypted lab inventory"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, username: &str, password: &str) -> String {
        let response = send(
            app,
            "POST",
            "/v1/auth/token",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn lab_inventory_walkthrough() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let creds = json!({"username": "alice", "password": "pw1"});

        let response = send(&app, "POST", "/v1/auth/register", None, Some(creds.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &app,
            "POST",
            "/v1/auth/token",
            None,
            Some(json!({"username": "alice", "password": "wrong"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "invalid_credentials");

        let token = login(&app, "alice", "pw1").await;

        let beaker = json!({
            "name": "Beaker",
            "quantity": 10,
            "cabinet": "A1",
            "room": "101",
            "location": "shelf3"
        });
        let response = send(&app, "POST", "/v1/items", Some(&token), Some(beaker)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["id"], 1);

        let response = send(&app, "GET", "/v1/items", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let items = json_body(response).await;
        assert_eq!(items[0]["name"], "Beaker");
        assert_eq!(items[0]["quantity"], "10");

        let response = send(&app, "GET", "/v1/items/next-id", Some(&token), None).await;
        assert_eq!(json_body(response).await["next_id"], 2);

        let response = send(&app, "GET", "/v1/items/search?name=beak", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["id"], 1);

        let response = send(&app, "DELETE", "/v1/items/1", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "DELETE", "/v1/items/1", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let creds = json!({"username": "alice", "password": "pw1"});

        send(&app, "POST", "/v1/auth/register", None, Some(creds.clone())).await;
        let response = send(&app, "POST", "/v1/auth/register", None, Some(creds)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error_code"], "username_taken");
    }

    #[tokio::test]
    async fn item_routes_require_a_token() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send(&app, "GET", "/v1/items", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "missing_auth_header");

        let response = send(&app, "GET", "/v1/items", Some("not-a-jwt"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "invalid_token");
    }

    #[tokio::test]
    async fn malformed_requests_get_validation_error_body() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send(
            &app,
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({"username": "alice"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error_code"], "validation_error");
        assert!(body["error"].as_str().unwrap().contains("password"));

        let creds = json!({"username": "alice", "password": "pw1"});
        send(&app, "POST", "/v1/auth/register", None, Some(creds)).await;
        let token = login(&app, "alice", "pw1").await;

        let response = send(&app, "DELETE", "/v1/items/beaker", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "validation_error");

        let response = send(&app, "GET", "/v1/items/search", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "validation_error");
    }

    #[tokio::test]
    async fn import_reports_inserted_count() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        let creds = json!({"username": "alice", "password": "pw1"});
        send(&app, "POST", "/v1/auth/register", None, Some(creds)).await;
        let token = login(&app, "alice", "pw1").await;

        let batch = json!({
            "columns": ["Name", "Quantity", "Cabinet", "Room", "Location"],
            "rows": [
                {"Name": "Flask", "Quantity": 3, "Cabinet": "B", "Room": 204, "Location": "drawer"},
                {"Name": "Gloves", "Quantity": null, "Cabinet": "B", "Room": 204, "Location": "bin"}
            ]
        });
        let response = send(&app, "POST", "/v1/items/import", Some(&token), Some(batch)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["inserted"], 2);

        let response = send(&app, "GET", "/v1/items", Some(&token), None).await;
        let items = json_body(response).await;
        assert_eq!(items[1]["quantity"], "too many");
        assert_eq!(items[1]["room"], "204");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = send(&app, "GET", "/health/live", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_lists_item_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/items"));
        assert!(doc.paths.paths.contains_key("/v1/items/{id}"));
        assert!(doc.paths.paths.contains_key("/v1/auth/token"));

        let components = doc.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
