//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Character path segments accept either
//! a UUID or an exact character name.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Characters
        .route(
            "/characters",
            get(handlers::character::list_characters).post(handlers::character::create_character),
        )
        .route("/characters/import", post(handlers::catalog::import_characters))
        .route(
            "/characters/{id}",
            get(handlers::character::get_character)
                .patch(handlers::character::rename_character)
                .delete(handlers::character::delete_character),
        )
        .route("/characters/{id}/copy", post(handlers::character::copy_character))
        .route("/characters/{id}/save", post(handlers::character::save_character))
        .route("/characters/{id}/revert", post(handlers::character::revert_character))
        // Skills
        .route("/characters/{id}/skills", put(handlers::skill::replace_skills))
        .route(
            "/characters/{id}/skills/{skill_id}",
            get(handlers::skill::get_skill_level).put(handlers::skill::set_skill_level),
        )
        // Implants
        .route(
            "/characters/{id}/implants",
            get(handlers::implant::list_implants).post(handlers::implant::add_implant),
        )
        .route(
            "/characters/{id}/implants/{slot}",
            delete(handlers::implant::remove_implant),
        )
        // XML API link
        .route("/characters/{id}/api", get(handlers::eveapi::get_api_details))
        .route(
            "/characters/{id}/api/characters",
            post(handlers::eveapi::list_api_characters),
        )
        .route(
            "/characters/{id}/api/fetch",
            post(handlers::eveapi::fetch_api_character),
        )
        // Catalogue
        .route("/catalog", post(handlers::catalog::import_catalog))
        .route("/skill-groups", get(handlers::skill::list_skill_groups))
        .route(
            "/skill-groups/{group_id}/skills",
            get(handlers::skill::list_group_skills),
        )
        .route(
            "/items/{item_id}/description",
            get(handlers::skill::get_item_description),
        )
        .route(
            "/market-groups/{group_id}/description",
            get(handlers::skill::get_market_group_description),
        )
        // Requirements and plans
        .route("/requirements", post(handlers::requirements::check_requirements))
        .route("/requirements/plan", post(handlers::requirements::skill_plan))
        .route("/requirements/backup", post(handlers::requirements::backup_plan));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
