use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::{NewUser, User};
use crate::auth::{password, token};
use crate::error::AuthError;
use crate::mail;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Register a new, unverified account and email its verification code.
///
/// Nothing is persisted unless every validation passes. If the mail
/// dispatch fails after the insert, the account stays created-but-unverified
/// and the caller sees a generic server error.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<(), AuthError> {
    if req.full_name.trim().is_empty()
        || req.email.is_empty()
        || req.password.is_empty()
        || req.confirm_password.is_empty()
    {
        return Err(AuthError::Validation("All fields are required".into()));
    }
    if !is_valid_email(&req.email) {
        warn!(email = %req.email, "register: invalid email");
        return Err(AuthError::Validation("Invalid email address".into()));
    }
    if req.password != req.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".into()));
    }
    if !password::meets_policy(&req.password) {
        return Err(AuthError::Validation(password::POLICY_MESSAGE.into()));
    }
    if state.store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "register: email already registered");
        return Err(AuthError::DuplicateEmail);
    }

    let code = token::generate_verification_code();
    let password_hash = password::hash_password(&req.password)?;
    let user = state
        .store
        .create(NewUser {
            full_name: req.full_name,
            email: req.email,
            password_hash,
            verification_code: code.clone(),
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "user registered, verification pending");

    state
        .mailer
        .send(mail::verification_email(&user.email, &code))
        .await?;
    Ok(())
}

/// Mark the account holding this code as verified and clear the code.
/// A code can only succeed once; re-submitting it yields not-found.
pub async fn verify_email(state: &AppState, code: &str) -> Result<(), AuthError> {
    let mut user = state
        .store
        .find_by_verification_code(code)
        .await?
        .ok_or_else(|| {
            AuthError::NotFound("Verification code incorrect or user not found".into())
        })?;

    user.is_verified = true;
    user.verification_code = None;
    state.store.save(&user).await?;
    info!(user_id = %user.id, "email verified");
    Ok(())
}

/// Check credentials and issue a signed 30-day session token.
///
/// Unknown email and wrong password yield the same error so callers
/// cannot enumerate accounts. Unverified accounts are denied after a
/// successful password match.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<(User, String), AuthError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AuthError::Validation("Email and password are required".into()));
    }

    let user = match state.store.find_by_email(&req.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %req.email, "login: unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };
    if !password::verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login: invalid password");
        return Err(AuthError::InvalidCredentials);
    }
    if !user.is_verified {
        warn!(user_id = %user.id, "login: email not verified");
        return Err(AuthError::EmailNotVerified);
    }

    let keys = JwtKeys::from_ref(state);
    let session_token = keys.sign_session(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, session_token))
}

/// Store a hashed one-hour reset token and email its plaintext as a link.
/// The plaintext token is never persisted.
pub async fn request_password_reset(state: &AppState, email: &str) -> Result<(), AuthError> {
    let mut user = state
        .store
        .find_by_email(email)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".into()))?;

    let reset_token = token::generate_reset_token();
    user.reset_token_hash = Some(token::hash_reset_token(&reset_token));
    user.reset_token_expiry = Some(OffsetDateTime::now_utc() + Duration::hours(1));
    state.store.save(&user).await?;
    info!(user_id = %user.id, "password reset requested");

    state
        .mailer
        .send(mail::reset_email(
            &user.email,
            &state.config.frontend_url,
            &reset_token,
        ))
        .await?;
    Ok(())
}

/// Complete a reset: policy-check first, then match the token hash against
/// an unexpired stored pair. A used token is cleared and cannot replay.
pub async fn reset_password(
    state: &AppState,
    reset_token: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    if !password::meets_policy(new_password) {
        return Err(AuthError::Validation(password::POLICY_MESSAGE.into()));
    }

    let hash = token::hash_reset_token(reset_token);
    let mut user = state
        .store
        .find_by_reset_token_hash(&hash, OffsetDateTime::now_utc())
        .await?
        .ok_or(AuthError::InvalidResetToken)?;

    user.password_hash = password::hash_password(new_password)?;
    user.reset_token_hash = None;
    user.reset_token_expiry = None;
    state.store.save(&user).await?;
    info!(user_id = %user.id, "password reset completed");
    Ok(())
}
