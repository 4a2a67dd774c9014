use std::sync::Arc;
use std::time::Duration;

use ::auth::JwtHandler;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::auth;
use super::handlers::documents;
use super::handlers::links;
use super::handlers::users;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::document::ports::DocumentServicePort;
use crate::domain::link::ports::LinkServicePort;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;

/// Matches the original upload cap of 50 MB.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub link_service: Arc<dyn LinkServicePort>,
    pub document_service: Arc<dyn DocumentServicePort>,
    /// The authentication middleware reloads users on every request.
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtHandler>,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/users", get(users::list).post(users::create))
        .route("/users/me", put(users::update_self))
        .route(
            "/users/:id",
            get(users::show).put(users::update).delete(users::remove),
        )
        .route("/users/:id/status", patch(users::toggle_status))
        .route("/nutritionists/:id/patients", get(links::list_patients))
        .route(
            "/nutritionists/:id/patients/:patient_id",
            post(links::attach).delete(links::detach),
        )
        .route("/documents", get(documents::list).post(documents::create))
        .route(
            "/documents/:id",
            get(documents::show)
                .put(documents::update)
                .delete(documents::remove),
        )
        .route("/documents/:id/status", patch(documents::toggle_status))
        .route("/documents/:id/download", get(documents::download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "time": Utc::now().to_rfc3339() }))
}
