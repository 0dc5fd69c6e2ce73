use crate::{
    dtos::lessons::{LessonQueryParams, LessonResponse},
    error::{AppError, ErrorResponse},
    session::Session,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use database::services::lessons::{LessonService, PlacementMode};
use log::info;
use models::input::LessonDraft;
use uuid::Uuid;

/// List lessons, optionally narrowed to a class, teacher or room
#[utoipa::path(
    get,
    path = "/lessons",
    params(LessonQueryParams),
    responses(
        (status = 200, description = "Matching lessons ordered by slot", body = Vec<LessonResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "Lessons"
)]
pub async fn list_lessons(
    State(state): State<AppState>,
    Query(params): Query<LessonQueryParams>,
) -> Result<Json<Vec<LessonResponse>>, AppError> {
    let lessons = LessonService::list(&state.db, params.into()).await?;
    Ok(Json(lessons.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "The lesson", body = LessonResponse),
        (status = 404, description = "No such lesson", body = ErrorResponse)
    ),
    tag = "Lessons"
)]
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LessonResponse>, AppError> {
    Ok(Json(LessonService::get(&state.db, id).await?.into()))
}

async fn place(
    session: &Session,
    state: &AppState,
    draft: &LessonDraft,
    mode: PlacementMode,
) -> Result<LessonResponse, AppError> {
    let candidate = draft.validate()?;
    let lesson = LessonService::place_lesson(&state.db, candidate, mode).await?;

    info!("{session} placed lesson {} ({mode:?})", lesson.id);
    Ok(lesson.into())
}

/// Book a lesson into a free slot
#[utoipa::path(
    post,
    path = "/lessons",
    request_body = LessonDraft,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "A referenced record does not exist", body = ErrorResponse),
        (status = 409, description = "Class, room or teacher is busy, or the room is too small", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Lessons"
)]
pub async fn create_lesson(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<LessonDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<LessonResponse>), AppError> {
    let Json(draft) = payload?;
    let lesson = place(&session, &state, &draft, PlacementMode::Create).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Book a lesson into a grid cell, replacing what the same class or group
/// already has there
#[utoipa::path(
    put,
    path = "/lessons",
    request_body = LessonDraft,
    responses(
        (status = 201, description = "Lesson placed", body = LessonResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "A referenced record does not exist", body = ErrorResponse),
        (status = 409, description = "Room or teacher is busy, or the room is too small", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Lessons"
)]
pub async fn replace_lesson(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<LessonDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<LessonResponse>), AppError> {
    let Json(draft) = payload?;
    let lesson = place(&session, &state, &draft, PlacementMode::Replace).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Move or edit a lesson
#[utoipa::path(
    put,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    request_body = LessonDraft,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 400, description = "Nothing changed", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "The lesson or a referenced record does not exist", body = ErrorResponse),
        (status = 409, description = "Room or teacher is busy, or the room is too small", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Lessons"
)]
pub async fn update_lesson(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<LessonDraft>, JsonRejection>,
) -> Result<Json<LessonResponse>, AppError> {
    let Json(draft) = payload?;
    let lesson = place(&session, &state, &draft, PlacementMode::Update(id)).await?;
    Ok(Json(lesson))
}

#[utoipa::path(
    delete,
    path = "/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 404, description = "No such lesson", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Lessons"
)]
pub async fn delete_lesson(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    LessonService::delete(&state.db, id).await?;

    info!("{session} deleted lesson {id}");
    Ok(StatusCode::NO_CONTENT)
}
