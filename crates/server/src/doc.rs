use crate::{
    error::ErrorResponse,
    routes::{audit, classes, health, lessons, me, rooms, root, subjects, teachers},
};
use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        me::me,
        teachers::list_teachers,
        teachers::get_teacher,
        teachers::create_teacher,
        teachers::update_teacher,
        teachers::delete_teacher,
        teachers::teacher_timetable,
        rooms::list_rooms,
        rooms::get_room,
        rooms::create_room,
        rooms::update_room,
        rooms::delete_room,
        rooms::room_timetable,
        subjects::list_subjects,
        subjects::get_subject,
        subjects::create_subject,
        subjects::update_subject,
        subjects::delete_subject,
        classes::list_classes,
        classes::get_class,
        classes::create_class,
        classes::update_class,
        classes::delete_class,
        classes::set_groups,
        classes::class_timetable,
        lessons::list_lessons,
        lessons::get_lesson,
        lessons::create_lesson,
        lessons::replace_lesson,
        lessons::update_lesson,
        lessons::delete_lesson,
        audit::audit
    ),
    components(schemas(ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Authentication", description = "Authentication related endpoints"),
        (name = "Teachers", description = "Teachers and their timetables"),
        (name = "Rooms", description = "Rooms and their timetables"),
        (name = "Subjects", description = "Subjects taught"),
        (name = "Classes", description = "Classes, their groups and timetables"),
        (name = "Lessons", description = "Lesson placement"),
        (name = "Audit", description = "Consistency checks over stored lessons"),
    ),
    info(
        title = "School Timetable API",
        version = "1.0.0",
        description = "Weekly lesson planning with conflict detection",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
