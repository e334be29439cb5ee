use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{SubmitMarksRequest, SubmitMarksResponse};
use super::repo::MARKS_FILE;
use super::repo_types::MarkSheet;
use crate::{error::reject, state::AppState};

pub fn marks_routes() -> Router<AppState> {
    Router::new()
        .route("/marks", get(get_marks).put(submit_marks))
        .route("/marks/download", get(download_marks))
}

#[instrument(skip(state, payload))]
pub async fn submit_marks(
    State(state): State<AppState>,
    Json(payload): Json<SubmitMarksRequest>,
) -> Result<Json<SubmitMarksResponse>, (StatusCode, String)> {
    let controller = state.controller.lock().await;
    let marks = controller
        .submit_marks(payload.marks)
        .await
        .map_err(reject)?;
    Ok(Json(SubmitMarksResponse {
        message: "Marks submitted successfully!".into(),
        marks,
    }))
}

#[instrument(skip(state))]
pub async fn get_marks(
    State(state): State<AppState>,
) -> Result<Json<MarkSheet>, (StatusCode, String)> {
    let controller = state.controller.lock().await;
    match controller.marks().await.map_err(reject)? {
        Some(sheet) => Ok(Json(sheet)),
        None => Err((StatusCode::NOT_FOUND, "No marks submitted yet".into())),
    }
}

/// GET /marks/download, the stored CSV as an attachment.
#[instrument(skip(state))]
pub async fn download_marks(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let controller = state.controller.lock().await;
    let Some(body) = controller.marks_csv().await.map_err(reject)? else {
        return Err((StatusCode::NOT_FOUND, "No marks submitted yet".into()));
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", MARKS_FILE),
            ),
        ],
        body,
    ))
}
