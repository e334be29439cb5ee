use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{debug, instrument};

use super::services::Report;
use crate::{error::reject, state::AppState};

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/reports", get(get_report))
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
) -> Result<Json<Report>, (StatusCode, String)> {
    let controller = state.controller.lock().await;
    match controller.report().await.map_err(reject)? {
        Some(report) => {
            debug!(average = ?report.average, "report built");
            Ok(Json(report))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            "Submit your marks to see reports".into(),
        )),
    }
}
