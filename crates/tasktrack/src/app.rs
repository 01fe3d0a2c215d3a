use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use tasktrack_auth::auth_routes;

use crate::{
    handlers::{
        health::{healthz, livez},
        tasks::{create_task, delete_task, list_tasks, search_task, update_task},
    },
    state::AppState,
};

/// Builds the CORS layer. An empty origin list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
        ])
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    let task_routes = Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/create", post(create_task))
        .route("/tasks/update/{id}", put(update_task))
        .route("/tasks/delete/{id}", delete(delete_task))
        .route("/tasks/search/{id}", get(search_task));

    Router::new()
        .merge(task_routes)
        .merge(auth_routes())
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
