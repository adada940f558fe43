//! Public signup form.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cohort_core::models::{NewParticipant, Participant};
use cohort_sheets::repositories::ParticipantRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/signup
///
/// Append one participant with status `Pending`. No login required.
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<NewParticipant>,
) -> AppResult<(StatusCode, Json<DataResponse<Participant>>)> {
    let sheets = state.sheets.session();
    let participant = ParticipantRepo::signup(&sheets, &form).await?;
    tracing::info!(email = %participant.email, "New participant signed up");
    Ok((StatusCode::CREATED, Json(DataResponse { data: participant })))
}
