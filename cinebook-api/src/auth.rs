use axum::{
    body::Bytes,
    extract::State,
    Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use jsonwebtoken::{encode, Header, EncodingKey};
use chrono::{Utc, Duration};
use uuid::Uuid;
use crate::{
    state::{AppState, AuthConfig},
    error::AppError,
    middleware::auth::{AdminClaims, CustomerClaims, ADMIN_ROLE, CUSTOMER_ROLE},
};

#[derive(Debug, Default, Deserialize)]
pub struct GuestLoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

fn expires_at(auth: &AuthConfig) -> usize {
    (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize
}

fn sign<T: Serialize>(auth: &AuthConfig, claims: &T) -> Result<String, AppError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn issue_customer_token(
    auth: &AuthConfig,
    user_id: &str,
    email: Option<String>,
    name: Option<String>,
) -> Result<String, AppError> {
    let claims = CustomerClaims {
        sub: user_id.to_string(),
        email,
        name,
        role: CUSTOMER_ROLE.to_owned(),
        exp: expires_at(auth),
    };
    sign(auth, &claims)
}

/// Admin tokens are minted by operators holding the signing secret; no route hands them out.
pub fn issue_admin_token(auth: &AuthConfig, admin_id: &str) -> Result<String, AppError> {
    let claims = AdminClaims {
        sub: admin_id.to_string(),
        role: ADMIN_ROLE.to_owned(),
        exp: expires_at(auth),
    };
    sign(auth, &claims)
}

async fn login_guest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AuthResponse>, AppError> {
    // the body is optional; an anonymous guest posts nothing
    let req: GuestLoginRequest = if body.is_empty() {
        GuestLoginRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::ValidationError(e.to_string()))?
    };

    let email = req.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(AppError::ValidationError("Invalid e-mail address".to_string()));
        }
    }

    let user_id = format!("guest-{}", Uuid::new_v4());
    let token = issue_customer_token(&state.auth, &user_id, email, req.name)?;

    Ok(Json(AuthResponse { token, user_id }))
}
