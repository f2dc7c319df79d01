use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/audits", get(handlers::audits::list_audits_handler))
        .route("/api/audits/{id}", get(handlers::audits::get_audit_handler))
        .route(
            "/api/audits/actors/{email}",
            get(handlers::audits::list_actor_audits_handler),
        )
        .route(
            "/api/products",
            post(handlers::products::create_product_handler),
        )
        .route(
            "/api/products/{id}",
            get(handlers::products::get_product_handler)
                .put(handlers::products::update_product_handler)
                .delete(handlers::products::delete_product_handler),
        )
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route_layer(from_fn(middleware::bind_principal));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
