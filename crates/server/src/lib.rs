pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod utils;

use axum::{
    Router,
    routing::{get, put},
};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

/// Liveness and documentation routes, always reachable
pub fn public_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root::root))
        .route("/health", get(routes::health::health))
        .route("/api-docs/openapi.json", get(doc::openapi_json))
        .with_state(state)
}

/// The timetable API
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/me", get(routes::me::me))
        .route(
            "/teachers",
            get(routes::teachers::list_teachers).post(routes::teachers::create_teacher),
        )
        .route(
            "/teachers/{id}",
            get(routes::teachers::get_teacher)
                .put(routes::teachers::update_teacher)
                .delete(routes::teachers::delete_teacher),
        )
        .route(
            "/teachers/{id}/timetable",
            get(routes::teachers::teacher_timetable),
        )
        .route(
            "/rooms",
            get(routes::rooms::list_rooms).post(routes::rooms::create_room),
        )
        .route(
            "/rooms/{id}",
            get(routes::rooms::get_room)
                .put(routes::rooms::update_room)
                .delete(routes::rooms::delete_room),
        )
        .route("/rooms/{id}/timetable", get(routes::rooms::room_timetable))
        .route(
            "/subjects",
            get(routes::subjects::list_subjects).post(routes::subjects::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(routes::subjects::get_subject)
                .put(routes::subjects::update_subject)
                .delete(routes::subjects::delete_subject),
        )
        .route(
            "/classes",
            get(routes::classes::list_classes).post(routes::classes::create_class),
        )
        .route(
            "/classes/{id}",
            get(routes::classes::get_class)
                .put(routes::classes::update_class)
                .delete(routes::classes::delete_class),
        )
        .route(
            "/classes/{id}/timetable",
            get(routes::classes::class_timetable),
        )
        .route("/classes/{id}/groups", put(routes::classes::set_groups))
        .route(
            "/lessons",
            get(routes::lessons::list_lessons)
                .post(routes::lessons::create_lesson)
                .put(routes::lessons::replace_lesson),
        )
        .route(
            "/lessons/{id}",
            get(routes::lessons::get_lesson)
                .put(routes::lessons::update_lesson)
                .delete(routes::lessons::delete_lesson),
        )
        .route("/audit", get(routes::audit::audit))
        .with_state(state)
}

/// Puts the public routes and an (optionally guarded) API together
pub fn build(state: AppState, api: Router) -> Router {
    public_router(state)
        .merge(api)
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
}

/// The full application without an identity provider in front of the API
pub fn app(state: AppState) -> Router {
    build(state.clone(), api_router(state))
}
