use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware, validate_user_middleware};
use crate::state::AppState;

/// Build the full router for the given state and settings
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Elevated API
        .merge(elevated_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    use public::{cats, users};

    Router::new()
        .route("/api/v1/users", get(users::user_list).post(users::user_register))
        .route("/api/v1/users/:id", get(users::user_show))
        .route("/api/v1/cats", get(cats::cat_list))
        .route("/api/v1/cats/area", get(cats::cat_area))
        .route("/api/v1/cats/:id", get(cats::cat_show))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{cats, users};

    Router::new()
        .route("/api/v1/users/token", get(users::user_token))
        .route("/api/v1/users", put(users::user_update).delete(users::user_delete))
        .route("/api/v1/cats/user", get(cats::cat_mine))
        .route("/api/v1/cats", post(cats::cat_create))
        .route("/api/v1/cats/:id", put(cats::cat_update).delete(cats::cat_delete))
        // Layers run bottom-up: token first, then the stored user
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::cats;

    Router::new()
        .route(
            "/api/v1/cats/admin/:id",
            put(cats::cat_admin_update).delete(cats::cat_admin_delete),
        )
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Cat API (Rust)",
            "version": version,
            "description": "Cat sightings with owners, built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "users": "/api/v1/users[/:id] (public read, register)",
                "account": "/api/v1/users, /api/v1/users/token (protected)",
                "cats": "/api/v1/cats[/:id] (public read)",
                "area": "/api/v1/cats/area?topRight=lat,lng&bottomLeft=lat,lng (public)",
                "owner": "/api/v1/cats, /api/v1/cats/user, /api/v1/cats/:id (protected)",
                "admin": "/api/v1/cats/admin/:id (admin role)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
