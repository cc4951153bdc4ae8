use axum::{
    extract::{FromRef, Path, State},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            LoginRequest, LoginResponse, MessageResponse, RecoverPasswordRequest,
            RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
        },
        jwt::JwtKeys,
        services,
    },
    error::AuthError,
    state::AppState,
};

const AUTH_COOKIE_NAME: &str = "authToken";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/password-recovery", post(recover_password))
        .route("/reset-password/:token", post(reset_password))
        .route("/verify-email", post(verify_email))
}

/// Build the session cookie. `SameSite=None` because the frontend is served
/// from a different origin; `Secure` only outside local development.
fn session_cookie(
    token: &str,
    max_age_secs: u64,
    production: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=None; Max-Age={max_age_secs}"
    );
    if production {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Registration successful. Please verify your email.",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (user, session_token) = services::login(&state, payload).await?;

    let keys = JwtKeys::from_ref(&state);
    let cookie = session_cookie(
        &session_token,
        keys.session_ttl.as_secs(),
        state.config.production,
    )
    .map_err(|e| AuthError::Dependency(anyhow::anyhow!(e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            message: "Login successful".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn recover_password(
    State(state): State<AppState>,
    Json(payload): Json<RecoverPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    services::request_password_reset(&state, &payload.email).await?;
    Ok(Json(MessageResponse::new("Password reset email sent")))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    services::reset_password(&state, &token, &payload.password).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

#[instrument(skip(state, payload))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    services::verify_email(&state, &payload.verification_code).await?;
    Ok(Json(MessageResponse::new("Email verified successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_cross_site() {
        let cookie = session_cookie("abc.def.ghi", 2_592_000, false).unwrap();
        let value = cookie.to_str().unwrap();
        assert!(value.starts_with("authToken=abc.def.ghi"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Max-Age=2592000"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn session_cookie_is_secure_in_production() {
        let cookie = session_cookie("abc.def.ghi", 2_592_000, true).unwrap();
        assert!(cookie.to_str().unwrap().contains("; Secure"));
    }
}
