use axum::{http::HeaderValue, http::StatusCode, middleware, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    auth_routes, club_routes,
    error::{log_errors, method_not_allowed, not_found, panic_response},
    file_routes, post_routes,
    state::AppState,
    user_routes,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes::routes())
        .merge(user_routes::routes())
        .merge(club_routes::routes())
        .merge(post_routes::routes())
        .merge(file_routes::routes())
        .method_not_allowed_fallback(method_not_allowed)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 空列表表示不开放跨域，`*` 表示任意来源
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
