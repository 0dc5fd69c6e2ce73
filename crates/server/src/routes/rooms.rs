use crate::{
    dtos::{entities::RoomResponse, timetable::TimetableResponse},
    error::{AppError, ErrorResponse},
    session::Session,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use database::services::{rooms::RoomService, timetable::TimetableService};
use log::info;
use models::input::RoomDraft;
use uuid::Uuid;

/// List every room, by name
#[utoipa::path(
    get,
    path = "/rooms",
    responses(
        (status = 200, description = "All rooms", body = Vec<RoomResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomResponse>>, AppError> {
    let rooms = RoomService::list(&state.db).await?;
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 200, description = "The room", body = RoomResponse),
        (status = 404, description = "No such room", body = ErrorResponse)
    ),
    tag = "Rooms"
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomResponse>, AppError> {
    Ok(Json(RoomService::get(&state.db, id).await?.into()))
}

#[utoipa::path(
    post,
    path = "/rooms",
    request_body = RoomDraft,
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 409, description = "A room with this name exists", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Rooms"
)]
pub async fn create_room(
    session: Session,
    State(state): State<AppState>,
    payload: Result<Json<RoomDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    let Json(draft) = payload?;
    let room = RoomService::create(&state.db, &draft).await?;

    info!("{session} created room {}", room.id);
    Ok((StatusCode::CREATED, Json(room.into())))
}

#[utoipa::path(
    put,
    path = "/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room id")),
    request_body = RoomDraft,
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 400, description = "Nothing changed", body = ErrorResponse),
        (status = 404, description = "No such room", body = ErrorResponse),
        (status = 409, description = "Name taken, or capacity too small for booked lessons", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Rooms"
)]
pub async fn update_room(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<RoomDraft>, JsonRejection>,
) -> Result<Json<RoomResponse>, AppError> {
    let Json(draft) = payload?;
    let room = RoomService::update(&state.db, id, &draft).await?;

    info!("{session} updated room {id}");
    Ok(Json(room.into()))
}

/// Delete a room along with the lessons held in it
#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "No such room", body = ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Rooms"
)]
pub async fn delete_room(
    session: Session,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    RoomService::delete(&state.db, id).await?;

    info!("{session} deleted room {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Weekly timetable of a room
#[utoipa::path(
    get,
    path = "/rooms/{id}/timetable",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 200, description = "Lessons held in the room, Monday to Friday", body = TimetableResponse),
        (status = 404, description = "No such room", body = ErrorResponse)
    ),
    tag = "Rooms"
)]
pub async fn room_timetable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimetableResponse>, AppError> {
    Ok(Json(TimetableService::for_room(&state.db, id).await?.into()))
}
