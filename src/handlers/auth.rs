use axum::{extract::State, Json};

use crate::error::{ApiResponse, Result};
use crate::models::{Identity, LoginRequest};
use crate::services::AuthService;
use crate::AppState;

/// Verify a credential pair
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Identity>>> {
    let identity = AuthService::login(&state.db, req).await?;
    Ok(Json(ApiResponse::success(identity)))
}
