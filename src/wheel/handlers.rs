use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::{WheelService, SPIN_COST};
use super::types::{ClaimRequest, ClaimResponse, SpinResponse};
use crate::auth::UserClaims;
use crate::shared::{AppError, AppState};

fn wheel_service(state: &AppState) -> WheelService {
    WheelService::new(Arc::clone(&state.economy), Arc::clone(&state.collection))
}

/// HTTP handler for paying a wheel spin (authenticated)
///
/// POST /wheel/spin
/// The spin-outcome selector runs client-side of this boundary; this
/// route only charges. Claiming is a separate call.
#[instrument(name = "spin_wheel", skip(state, claims))]
pub async fn spin_wheel(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<SpinResponse>, AppError> {
    wheel_service(&state).pay_spin(&claims.user_id).await?;

    info!(user_id = %claims.user_id, "Wheel spin paid via API");
    Ok(Json(SpinResponse { charged: SPIN_COST }))
}

/// HTTP handler for claiming a resolved wheel prize (authenticated)
///
/// POST /wheel/claim
#[instrument(name = "claim_prize", skip(state, claims, request))]
pub async fn claim_prize(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    wheel_service(&state)
        .resolve(&claims.user_id, &request.prize)
        .await?;

    info!(user_id = %claims.user_id, "Wheel prize claimed via API");
    Ok(Json(ClaimResponse { claimed: true }))
}
