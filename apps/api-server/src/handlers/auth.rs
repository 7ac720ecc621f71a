//! Sign-up, login and profile handlers.

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use commons_core::domain::User;
use commons_core::ports::{PasswordService, TokenService, UserRepository};
use commons_core::signup::{self, SignUpForm, SignUpOutcome};
use commons_shared::ApiResponse;
use commons_shared::dto::{AuthResponse, LoginRequest, SignUpRequest, SignUpResponse, UserResponse};

use super::{optional_viewer, require_viewer};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/sign-up
pub async fn sign_up(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let form = SignUpForm {
        display_name: req.display_name,
        email: req.email,
        password: req.password,
        confirm_password: req.confirm_password,
        consent: req.consent,
    };

    let signed_in = optional_viewer(&state, identity.0.as_ref()).await?;
    if signed_in.is_none() {
        signup::validate(&form).map_err(|errors| {
            AppError::Validation(
                errors
                    .into_iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect(),
            )
        })?;
    }

    match state.signup.submit(signed_in.as_ref(), &form).await? {
        SignUpOutcome::AlreadySignedIn { redirect } => Ok(HttpResponse::Ok().json(
            ApiResponse::ok(SignUpResponse {
                user: None,
                redirect: redirect.to_string(),
            }),
        )),
        SignUpOutcome::UsernameTaken { message } => Err(AppError::Conflict(message.to_string())),
        SignUpOutcome::Registered { user, redirect } => Ok(HttpResponse::Created().json(
            ApiResponse::ok(SignUpResponse {
                user: Some(user_response(&user)),
                redirect: redirect.to_string(),
            }),
        )),
    }
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(req.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    let roles = user.roles.iter().map(|r| r.as_str().to_string()).collect();
    let token = token_service
        .generate_token(user.id, &user.username, roles)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
    }))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = require_viewer(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user_response(&user))))
}

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        verified: user.verified,
        roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        country: user.country.clone(),
        created_at: user.created_at,
    }
}
