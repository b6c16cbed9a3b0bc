use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{PackDefinition, PackOpeningResult};
use super::service::PackService;
use super::types::{PackCreateRequest, PackSummary, PackUpdateRequest};
use crate::auth::UserClaims;
use crate::limits::DailyLimitStatus;
use crate::shared::{AppError, AppState};

fn pack_service(state: &AppState) -> PackService {
    PackService::new(
        Arc::clone(&state.pack_repository),
        Arc::clone(&state.catalog),
        Arc::clone(&state.economy),
        Arc::clone(&state.collection),
        Arc::clone(&state.daily_limits),
    )
}

/// HTTP handler for listing pack summaries
///
/// GET /packs
#[instrument(name = "list_packs", skip(state))]
pub async fn list_packs(State(state): State<AppState>) -> Result<Json<Vec<PackSummary>>, AppError> {
    let packs = pack_service(&state).list_packs().await?;
    Ok(Json(packs))
}

/// HTTP handler for fetching a full pack definition
///
/// GET /packs/:id
#[instrument(name = "get_pack", skip(state))]
pub async fn get_pack(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
) -> Result<Json<PackDefinition>, AppError> {
    let pack = pack_service(&state).get_pack(&pack_id).await?;
    Ok(Json(pack))
}

/// HTTP handler for creating a pack definition (admin)
///
/// POST /packs
#[instrument(name = "create_pack", skip(state, request))]
pub async fn create_pack(
    State(state): State<AppState>,
    Json(request): Json<PackCreateRequest>,
) -> Result<(StatusCode, Json<PackDefinition>), AppError> {
    let pack = pack_service(&state).create_pack(request).await?;

    info!(pack_id = %pack.id, "Pack created via API");
    Ok((StatusCode::CREATED, Json(pack)))
}

/// HTTP handler for partially updating a pack definition (admin)
///
/// PUT /packs/:id
#[instrument(name = "update_pack", skip(state, patch))]
pub async fn update_pack(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
    Json(patch): Json<PackUpdateRequest>,
) -> Result<Json<PackDefinition>, AppError> {
    let pack = pack_service(&state).update_pack(&pack_id, patch).await?;
    Ok(Json(pack))
}

/// HTTP handler for deleting a pack definition (admin)
///
/// DELETE /packs/:id
#[instrument(name = "delete_pack", skip(state))]
pub async fn delete_pack(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let existed = pack_service(&state).delete_pack(&pack_id).await?;
    if existed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Pack '{}' not found", pack_id)))
    }
}

/// HTTP handler for opening a pack (authenticated)
///
/// POST /packs/:id/open
#[instrument(name = "open_pack", skip(state, claims))]
pub async fn open_pack(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(pack_id): Path<String>,
) -> Result<Json<PackOpeningResult>, AppError> {
    let result = pack_service(&state)
        .open_pack_for_user(&claims.user_id, &pack_id)
        .await?;

    info!(
        user_id = %claims.user_id,
        pack_id = %pack_id,
        cards_drawn = result.cards.len(),
        "Pack opened via API"
    );
    Ok(Json(result))
}

/// HTTP handler for reading today's pack allowance (authenticated)
///
/// GET /packs/limit/status
#[instrument(name = "limit_status", skip(state, claims))]
pub async fn limit_status(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<DailyLimitStatus>, AppError> {
    let status = pack_service(&state).limit_status(&claims.user_id);
    Ok(Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{header, Method, Request},
        routing::{delete, get, post, put},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt; // for `oneshot`

    fn admin_router(state: AppState) -> Router {
        Router::new()
            .route("/packs", get(list_packs))
            .route("/packs", post(create_pack))
            .route("/packs/:id", get(get_pack))
            .route("/packs/:id", put(update_pack))
            .route("/packs/:id", delete(delete_pack))
            .with_state(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_packs_returns_seeded_summaries() {
        let app = admin_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(Request::get("/packs").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert!(json[0].get("slots").is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_pack_returns_404_with_error_body() {
        let app = admin_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(Request::get("/packs/ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_duplicate_pack_returns_409() {
        let app = admin_router(AppStateBuilder::new().build());

        let payload = serde_json::json!({
            "id": "base-set-booster",
            "name": "Duplicate",
            "set_id": "base-set",
            "card_count": 5,
            "slots": [{"rarity": "common", "count": 5}],
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/packs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_create_invalid_pack_returns_400() {
        let app = admin_router(AppStateBuilder::new().build());

        let payload = serde_json::json!({
            "id": "bad-pack",
            "name": "Bad",
            "set_id": "base-set",
            "card_count": 5,
            "slots": [],
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/packs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_404() {
        let app = admin_router(AppStateBuilder::new().build());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/packs/holo-collector")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::get("/packs/holo-collector")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
