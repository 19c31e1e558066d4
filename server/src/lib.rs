use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use std::path::Path;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod context;
pub mod error;
pub mod routes;
pub mod serverless;

pub use context::{AppContext, StoreHandle};
pub use error::ApiError;

/// The recipe REST surface alone, shared by the long-running server and the
/// per-invocation adapter.
pub fn build_api_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/recipes", get(routes::list_recipes).post(routes::create_recipe))
        .route(
            "/api/recipes/:id",
            get(routes::get_recipe)
                .put(routes::update_recipe)
                .delete(routes::delete_recipe),
        )
        .with_state(ctx)
}

/// Full application: API, health probe, static client assets with an
/// `index.html` fallback for client-side routes, CORS and access logs.
pub fn build_app(ctx: AppContext, static_dir: Option<&Path>) -> Router {
    let mut app = build_api_router(ctx).route("/health", get(|| async { "ok" }));
    if let Some(dir) = static_dir {
        let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(assets);
    }
    app.layer(cors_from_env()).layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_from_env() -> CorsLayer {
    let origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}
