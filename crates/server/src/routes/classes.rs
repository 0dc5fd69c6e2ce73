use crate::{
    dtos::{
        entities::{ClassResponse, SplitRequest},
        timetable::TimetableResponse,
    },
    error::{AppError, ErrorResponse},
    session::Session,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use database::services::{
    classes::ClassService, split::SplitManager, timetable::TimetableService,
};
use log::info;
use models::input::ClassDraft;
use uuid::Uuid;

/// List every class with its groups
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "All classes, by name", body = Vec<ClassResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    let classes = ClassService::list(&state.db).await?;
    Ok(Json(classes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "The class and its groups", body = ClassResponse),
        (status = 404, description = "No such class", body = ErrorResponse)
    ),
    tag = "Classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassResponse>, AppError> {
    Ok(Json(ClassService::get(&state.db, id).await?.into()))
}

/// Create a class, split into two groups when the body lists them
#[utoipa::path(
    post,
    path = "/classes",
    request_body = ClassDraft,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Main teacher does not exist", body = ErrorResponse),
        (status = 409, description = "Name taken, teacher already leads a class, or groups do not add up", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn create_class(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<ClassDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ClassResponse>), AppError> {
    let Json(draft) = payload?;
    let class = ClassService::create(&state.db, &draft).await?;

    info!("{session} created class {}", class.class.id);
    Ok((StatusCode::CREATED, Json(class.into())))
}

/// Edit a class, including its split into groups
#[utoipa::path(
    put,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = ClassDraft,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Nothing changed", body = ErrorResponse),
        (status = 404, description = "No such class or main teacher", body = ErrorResponse),
        (status = 409, description = "The change conflicts with existing data", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn update_class(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ClassDraft>, JsonRejection>,
) -> Result<Json<ClassResponse>, AppError> {
    let Json(draft) = payload?;
    let class = ClassService::update(&state.db, id, &draft).await?;

    info!("{session} updated class {id}");
    Ok(Json(class.into()))
}

/// Delete a class with its groups and lessons
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "No such class", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn delete_class(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ClassService::delete(&state.db, id).await?;

    info!("{session} deleted class {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Split, re-split or unsplit a class.
///
/// Two groups split the class; an empty list merges it back, dropping the
/// group lessons.
#[utoipa::path(
    put,
    path = "/classes/{id}/groups",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = SplitRequest,
    responses(
        (status = 200, description = "Class with its new groups", body = ClassResponse),
        (status = 404, description = "No such class", body = ErrorResponse),
        (status = 409, description = "Groups do not add up or no longer fit their rooms", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn set_groups(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> Result<Json<ClassResponse>, AppError> {
    let Json(request) = payload?;
    let class = SplitManager::set_split(&state.db, id, &request.groups).await?;

    info!("{session} set {} group(s) on class {id}", class.groups.len());
    Ok(Json(class.into()))
}

/// Weekly timetable of a class, group lessons included
#[utoipa::path(
    get,
    path = "/classes/{id}/timetable",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Lessons of the class, Monday to Friday", body = TimetableResponse),
        (status = 404, description = "No such class", body = ErrorResponse)
    ),
    tag = "Classes"
)]
pub async fn class_timetable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, AppError> {
    Ok(Json(TimetableService::for_class(&state.db, id).await?.into()))
}
