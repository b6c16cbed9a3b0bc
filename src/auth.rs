use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, AppState};

/// Claims carried by a player's bearer token. Token issuance lives in the
/// account service; this crate only validates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: String,
    pub exp: usize,
    pub iat: usize,
}

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new() -> Self {
        let expiration_days = std::env::var("SESSION_EXPIRATION_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            expiration_days,
        }
    }

    /// Creates a token for a user; used by tests and the dev login path
    #[instrument(skip(self))]
    pub fn create_token(&self, user_id: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::days(self.expiration_days)).timestamp() as usize;

        let claims = UserClaims {
            user_id: user_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode token");
            AppError::Unauthorized(e.to_string())
        })
    }

    /// Validates a token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<UserClaims, AppError> {
        decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode token");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bearer-token middleware - validates the Authorization header and adds
/// UserClaims to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))
/// Handlers then extract Extension(claims): Extension<UserClaims>.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            AppError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = state.token_config.validate_token(token)?;

    debug!(user_id = %claims.user_id, "Authentication successful");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
