use crate::{
    dtos::{entities::TeacherResponse, timetable::TimetableResponse},
    error::{AppError, ErrorResponse},
    session::Session,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use database::services::{teachers::TeacherService, timetable::TimetableService};
use log::info;
use models::input::TeacherDraft;
use uuid::Uuid;

/// List every teacher, by surname
#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "All teachers", body = Vec<TeacherResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    let teachers = TeacherService::list(&state.db).await?;
    Ok(Json(teachers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "The teacher", body = TeacherResponse),
        (status = 404, description = "No such teacher", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeacherResponse>, AppError> {
    Ok(Json(TeacherService::get(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/teachers",
    request_body = TeacherDraft,
    responses(
        (status = 201, description = "Teacher created", body = TeacherResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 409, description = "A teacher with this name exists", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Teachers"
)]
pub async fn create_teacher(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<TeacherDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<TeacherResponse>), AppError> {
    let Json(draft) = payload?;
    let teacher = TeacherService::create(&state.db, &draft).await?;

    info!("{session} created teacher {}", teacher.id);
    Ok((StatusCode::CREATED, Json(teacher.into())))
}

#[utoipa::path(
    put,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    request_body = TeacherDraft,
    responses(
        (status = 200, description = "Teacher updated", body = TeacherResponse),
        (status = 400, description = "Nothing changed", body = ErrorResponse),
        (status = 404, description = "No such teacher", body = ErrorResponse),
        (status = 409, description = "A teacher with this name exists", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Teachers"
)]
pub async fn update_teacher(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TeacherDraft>, JsonRejection>,
) -> Result<Json<TeacherResponse>, AppError> {
    let Json(draft) = payload?;
    let teacher = TeacherService::update(&state.db, id, &draft).await?;

    info!("{session} updated teacher {id}");
    Ok(Json(teacher.into()))
}

/// Delete a teacher along with their lessons
#[utoipa::path(
    delete,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 404, description = "No such teacher", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Teachers"
)]
pub async fn delete_teacher(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    TeacherService::delete(&state.db, id).await?;

    info!("{session} deleted teacher {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Weekly timetable of a teacher
#[utoipa::path(
    get,
    path = "/teachers/{id}/timetable",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Lessons taught by the teacher, Monday to Friday", body = TimetableResponse),
        (status = 404, description = "No such teacher", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
pub async fn teacher_timetable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, AppError> {
    Ok(Json(TimetableService::for_teacher(&state.db, id).await?.into()))
}
