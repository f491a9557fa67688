use axum::{extract::State, response::IntoResponse, Json};

use crate::error::{ApiResponse, Result};
use crate::models::ContactRequest;
use crate::services::ContactService;
use crate::AppState;

/// Relay a contact form submission
/// POST /contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<impl IntoResponse> {
    ContactService::submit(state.mailer.as_ref(), &state.config.mail, req).await?;
    Ok(Json(ApiResponse::<()>::success_message(
        "Emails sent successfully.",
    )))
}
