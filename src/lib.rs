pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod validation;

use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{jwt_auth_middleware, require_root_middleware, tenant_context_middleware};

/// Build the full application router
pub fn app() -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(school_routes())
        .merge(asset_routes())
        .merge(report_routes())
        .merge(work_order_routes())
        .merge(attendance_routes())
        .merge(notification_routes())
        .merge(find_routes())
        .merge(stats_routes())
        // Layers run outermost-last: JWT first, then tenant validation
        .layer(from_fn(tenant_context_middleware))
        .layer(from_fn(jwt_auth_middleware));

    let elevated = Router::new()
        .merge(company_routes())
        .layer(from_fn(require_root_middleware))
        .layer(from_fn(tenant_context_middleware))
        .layer(from_fn(jwt_auth_middleware));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(protected)
        .merge(elevated)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors_layer()))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<_> = security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn auth_routes() -> Router {
    use axum::routing::put;
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/password", put(auth::change_password))
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/users/:id/restore", post(users::restore))
}

fn school_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::schools;

    Router::new()
        .route("/api/schools", get(schools::list).post(schools::create))
        .route(
            "/api/schools/:id",
            get(schools::get).put(schools::update).delete(schools::delete),
        )
        .route("/api/schools/:id/restore", post(schools::restore))
}

fn asset_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::assets;

    Router::new()
        .route("/api/assets", get(assets::list).post(assets::create))
        .route(
            "/api/assets/:id",
            get(assets::get).put(assets::update).delete(assets::delete),
        )
        .route("/api/assets/:id/restore", post(assets::restore))
}

fn report_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::reports;

    Router::new()
        .route("/api/reports", get(reports::list).post(reports::create))
        .route(
            "/api/reports/:id",
            get(reports::get).put(reports::update).delete(reports::delete),
        )
        .route("/api/reports/:id/status", post(reports::transition))
        .route("/api/reports/:id/work-order", post(reports::convert))
}

fn work_order_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::work_orders;

    Router::new()
        .route("/api/work-orders", get(work_orders::list).post(work_orders::create))
        .route(
            "/api/work-orders/:id",
            get(work_orders::get).put(work_orders::update).delete(work_orders::delete),
        )
        .route("/api/work-orders/:id/restore", post(work_orders::restore))
        .route("/api/work-orders/:id/assign", post(work_orders::assign))
        .route("/api/work-orders/:id/status", post(work_orders::transition))
}

fn attendance_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::attendance;

    Router::new()
        .route("/api/attendance", get(attendance::list))
        .route("/api/attendance/check-in", post(attendance::check_in))
        .route("/api/attendance/check-out", post(attendance::check_out))
}

fn notification_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::notifications;

    Router::new()
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
}

fn find_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::find;

    Router::new().route("/api/find/:entity", post(find::find))
}

fn stats_routes() -> Router {
    use handlers::protected::stats;

    Router::new().route("/api/stats", get(stats::dashboard))
}

fn company_routes() -> Router {
    use axum::routing::post;
    use handlers::elevated::companies;

    Router::new()
        .route("/api/root/companies", get(companies::list).post(companies::create))
        .route(
            "/api/root/companies/:id",
            get(companies::get).put(companies::update).delete(companies::delete),
        )
        .route("/api/root/companies/:id/restore", post(companies::restore))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "CAFM API",
            "version": version,
            "description": "Multi-tenant facility management backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/login, /auth/refresh (public - token acquisition)",
                "users": "/api/users (protected)",
                "schools": "/api/schools (protected)",
                "assets": "/api/assets (protected)",
                "reports": "/api/reports (protected)",
                "work_orders": "/api/work-orders (protected)",
                "attendance": "/api/attendance (protected)",
                "notifications": "/api/notifications (protected)",
                "find": "/api/find/:entity (protected)",
                "stats": "/api/stats (protected)",
                "root": "/api/root/companies (restricted, root role)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
