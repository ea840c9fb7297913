use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use porta_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(&app_state.frontend_url)?;

    let action_routes = Router::new()
        .route(
            "/_api/portal_actions",
            get(handlers::actions::query_portal_actions_handler),
        )
        .route(
            "/api/actions",
            post(handlers::actions::invoke_action_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_caller,
        ))
        .route_layer(from_fn(middleware::reject_cross_site_requests));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(action_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
