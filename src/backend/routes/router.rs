/**
 * Router Configuration
 *
 * Combines public and protected routes into one router. Protected routes get
 * the auth middleware; the whole app gets request tracing and CORS.
 */

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::{configure_protected_routes, configure_public_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_protected_routes(Router::new()).route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth_middleware),
    );

    configure_public_routes(Router::new())
        .merge(protected)
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
