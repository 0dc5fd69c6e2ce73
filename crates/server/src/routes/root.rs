use axum::http::StatusCode;

/// Greets whoever opens the service in a browser
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service name", content_type = "text/plain", body = String)
    ),
    tag = "Health"
)]
pub async fn root() -> (StatusCode, &'static str) {
    (StatusCode::OK, "School timetable API")
}
