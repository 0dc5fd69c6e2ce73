use crate::{
    dtos::entities::SubjectResponse,
    error::{AppError, ErrorResponse},
    session::Session,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use database::services::subjects::SubjectService;
use log::info;
use models::input::SubjectDraft;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/subjects",
    responses(
        (status = 200, description = "All subjects, by name", body = Vec<SubjectResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Subjects"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    let subjects = SubjectService::list(&state.db).await?;
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "The subject", body = SubjectResponse),
        (status = 404, description = "No such subject", body = ErrorResponse)
    ),
    tag = "Subjects"
)]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubjectResponse>, AppError> {
    Ok(Json(SubjectService::get(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/subjects",
    request_body = SubjectDraft,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 409, description = "A subject with this name exists", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn create_subject(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<SubjectDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<SubjectResponse>), AppError> {
    let Json(draft) = payload?;
    let subject = SubjectService::create(&state.db, &draft).await?;

    info!("{session} created subject {}", subject.id);
    Ok((StatusCode::CREATED, Json(subject.into())))
}

#[utoipa::path(
    put,
    path = "/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    request_body = SubjectDraft,
    responses(
        (status = 200, description = "Subject renamed", body = SubjectResponse),
        (status = 400, description = "Nothing changed", body = ErrorResponse),
        (status = 404, description = "No such subject", body = ErrorResponse),
        (status = 409, description = "A subject with this name exists", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn update_subject(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SubjectDraft>, JsonRejection>,
) -> Result<Json<SubjectResponse>, AppError> {
    let Json(draft) = payload?;
    let subject = SubjectService::update(&state.db, id, &draft).await?;

    info!("{session} updated subject {id}");
    Ok(Json(subject.into()))
}

/// Delete a subject along with its lessons
#[utoipa::path(
    delete,
    path = "/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 404, description = "No such subject", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn delete_subject(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SubjectService::delete(&state.db, id).await?;

    info!("{session} deleted subject {id}");
    Ok(StatusCode::NO_CONTENT)
}
