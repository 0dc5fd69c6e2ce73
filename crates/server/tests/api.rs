use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use server::{api_router, app, build, session::Session, state::AppState};
use tower::ServiceExt;

async fn state() -> AppState {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    AppState::new(db)
}

/// The application with every request signed in as "tester"
async fn signed_in() -> Router {
    let state = state().await;
    let api = api_router(state.clone()).layer(Extension(Session::new("tester")));
    build(state, api)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value
}

fn id(value: &Value) -> &str {
    value["id"].as_str().unwrap()
}

struct Fixture {
    app: Router,
    class: Value,
    other_class: Value,
    room: Value,
    teacher: Value,
    other_teacher: Value,
    subject: Value,
}

async fn fixture() -> Fixture {
    let app = signed_in().await;

    let room = create(&app, "/rooms", json!({ "name": "101", "capacity": 30 })).await;
    let teacher = create(&app, "/teachers", json!({ "name": "Anna", "surname": "Nowak" })).await;
    let other_teacher =
        create(&app, "/teachers", json!({ "name": "Piotr", "surname": "Lis" })).await;
    let subject = create(&app, "/subjects", json!({ "name": "Mathematics" })).await;
    let class = create(&app, "/classes", json!({ "name": "1A", "amountOfStudents": 24 })).await;
    let other_class =
        create(&app, "/classes", json!({ "name": "1B", "amountOfStudents": "20" })).await;

    Fixture {
        app,
        class,
        other_class,
        room,
        teacher,
        other_teacher,
        subject,
    }
}

impl Fixture {
    fn lesson(&self, class: &Value, teacher: &Value, day: i64, hour: i64) -> Value {
        json!({
            "dayOfWeek": day,
            "lessonHour": hour,
            "roomId": id(&self.room),
            "teacherId": id(teacher),
            "subjectId": id(&self.subject),
            "classId": id(class),
        })
    }
}

#[tokio::test]
async fn test_public_routes_need_no_session() {
    let app = app(state().await);

    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/lessons"].is_object());
}

#[tokio::test]
async fn test_mutations_require_a_session() {
    let app = app(state().await);

    let (status, body) = send(
        &app,
        Method::POST,
        "/teachers",
        Some(json!({ "name": "Anna", "surname": "Nowak" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "Unauthorized");

    let (status, teachers) = send(&app, Method::GET, "/teachers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teachers, json!([]));
}

#[tokio::test]
async fn test_me_reports_the_session() {
    let app = signed_in().await;
    let (status, body) = send(&app, Method::GET, "/me", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "tester");
}

#[tokio::test]
async fn test_teacher_crud_errors() {
    let app = signed_in().await;
    let teacher = create(&app, "/teachers", json!({ "name": "Anna", "surname": "Nowak" })).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/teachers",
        Some(json!({ "name": " Anna ", "surname": "Nowak" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "AlreadyExists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/teachers",
        Some(json!({ "name": "Al", "surname": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "ValidationFailed");
    assert_eq!(body["field"], "name");
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let uri = format!("/teachers/{}", id(&teacher));
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "name": "Anna", "surname": "Nowak" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "NoChangesDetected");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "TeacherNotFound");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = signed_in().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rooms")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lesson_conflicts() {
    let f = fixture().await;

    let lesson = create(&f.app, "/lessons", f.lesson(&f.class, &f.teacher, 1, 0)).await;
    assert_eq!(lesson["dayOfWeek"], 1);
    assert_eq!(lesson["groupId"], Value::Null);

    // another class, same room
    let (status, body) = send(
        &f.app,
        Method::POST,
        "/lessons",
        Some(f.lesson(&f.other_class, &f.other_teacher, 1, 0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "RoomAlreadyTaken");
    assert_eq!(body["field"], "roomId");
    assert_eq!(body["conflictingEntity"], "1A");

    // same class, same slot
    let (status, body) = send(
        &f.app,
        Method::POST,
        "/lessons",
        Some(f.lesson(&f.class, &f.other_teacher, 1, 0)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "ClassHasLessonAtThisTime");

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/lessons",
        Some(json!({ "dayOfWeek": 6, "lessonHour": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "dayOfWeek");
}

#[tokio::test]
async fn test_lesson_move_and_replace() {
    let f = fixture().await;
    let lesson = create(&f.app, "/lessons", f.lesson(&f.class, &f.teacher, 2, 3)).await;
    let uri = format!("/lessons/{}", id(&lesson));

    let (status, body) = send(
        &f.app,
        Method::PUT,
        &uri,
        Some(f.lesson(&f.class, &f.teacher, 2, 3)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "NoChangesDetected");

    let (status, moved) = send(
        &f.app,
        Method::PUT,
        &uri,
        Some(f.lesson(&f.class, &f.teacher, 2, 4)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["id"], lesson["id"]);
    assert_eq!(moved["lessonHour"], 4);

    // replacing the cell swaps the class's lesson for a new one
    let (status, replaced) = send(
        &f.app,
        Method::PUT,
        "/lessons",
        Some(f.lesson(&f.class, &f.other_teacher, 2, 4)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(replaced["id"], lesson["id"]);

    let (status, _) = send(&f.app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let query = format!("/lessons?classId={}", id(&f.class));
    let (_, lessons) = send(&f.app, Method::GET, &query, None).await;
    assert_eq!(lessons.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_small_room_is_rejected() {
    let f = fixture().await;
    let closet = create(&f.app, "/rooms", json!({ "name": "Closet", "capacity": 5 })).await;

    let mut lesson = f.lesson(&f.class, &f.teacher, 3, 1);
    lesson["roomId"] = closet["id"].clone();
    let (status, body) = send(&f.app, Method::POST, "/lessons", Some(lesson)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "RoomTooSmall");
    assert_eq!(body["conflictingEntity"], "Closet");
}

#[tokio::test]
async fn test_groups_share_a_slot() {
    let f = fixture().await;
    let uri = format!("/classes/{}/groups", id(&f.class));

    let (status, body) = send(
        &f.app,
        Method::PUT,
        &uri,
        Some(json!({ "groups": [
            { "name": "Group 1", "amountOfStudents": 12 },
            { "name": "Group 2", "amountOfStudents": 11 }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "InvalidGroupStudentsSum");

    let (status, class) = send(
        &f.app,
        Method::PUT,
        &uri,
        Some(json!({ "groups": [
            { "name": "Group 1", "amountOfStudents": 12 },
            { "name": "Group 2", "amountOfStudents": 12 }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(class["splitGroups"], true);

    let groups = class["groups"].as_array().unwrap();
    let mut first = f.lesson(&f.class, &f.teacher, 4, 2);
    first["groupId"] = groups[0]["id"].clone();
    create(&f.app, "/lessons", first).await;

    let second_room = create(&f.app, "/rooms", json!({ "name": "102", "capacity": 30 })).await;
    let mut second = f.lesson(&f.class, &f.other_teacher, 4, 2);
    second["groupId"] = groups[1]["id"].clone();
    second["roomId"] = second_room["id"].clone();
    create(&f.app, "/lessons", second).await;

    let (status, timetable) = send(
        &f.app,
        Method::GET,
        &format!("/classes/{}/timetable", id(&f.class)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let thursday = &timetable["days"][3];
    assert_eq!(thursday["dayOfWeek"], 4);
    assert_eq!(thursday["dayName"], "Thursday");
    let lessons = thursday["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["group"]["name"], "Group 1");
    assert_eq!(lessons[1]["group"]["name"], "Group 2");
    assert_eq!(lessons[0]["startsAt"], "08:55");
}

#[tokio::test]
async fn test_teacher_timetable_and_audit() {
    let f = fixture().await;
    create(&f.app, "/lessons", f.lesson(&f.class, &f.teacher, 1, 0)).await;
    create(&f.app, "/lessons", f.lesson(&f.other_class, &f.teacher, 5, 14)).await;

    let (status, timetable) = send(
        &f.app,
        Method::GET,
        &format!("/teachers/{}/timetable", id(&f.teacher)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = timetable["days"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[0]["lessons"][0]["startsAt"], "07:10");
    assert_eq!(days[0]["lessons"][0]["teacher"]["name"], "Anna Nowak");
    assert_eq!(days[4]["lessons"][0]["endsAt"], "20:40");
    assert_eq!(days[2]["lessons"], json!([]));

    let (status, audit) = send(&f.app, Method::GET, "/audit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["healthy"], true);
    assert_eq!(audit["violations"], json!([]));
}

#[tokio::test]
async fn test_unknown_lesson_is_not_found() {
    let app = signed_in().await;
    let uri = format!("/lessons/{}", uuid::Uuid::new_v4());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "LessonNotFound");
}
