use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{protected, public};
use crate::media::MEDIA_ROUTE;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full router for the given state.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route(&format!("{}/*reference", MEDIA_ROUTE), get(public::media::get))
        // Mixed: reads are public, writes authenticate per handler
        .merge(menu_routes())
        // Protected
        .merge(dish_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&config.security) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn menu_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/menus",
            get(public::menus::list).post(protected::menus::post),
        )
        .route(
            "/menus/:id",
            get(public::menus::get)
                .post(protected::menus::not_allowed)
                .put(protected::menus::put)
                .patch(protected::menus::patch)
                .delete(protected::menus::delete),
        )
        .route(
            "/menus/:menu_id/dishes",
            get(public::menu_dishes::list).post(protected::menu_dishes::post),
        )
}

fn dish_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/dishes/:id",
            get(protected::dishes::get)
                .put(protected::dishes::put)
                .patch(protected::dishes::patch)
                .delete(protected::dishes::delete),
        )
        .route(
            "/dishes/:id/image",
            axum::routing::post(protected::dish_image::post).delete(protected::dish_image::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
