//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::identity::Identity;
use kernel::response::ApiResponse;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
use crate::token::TokenCodec;

/// Shared state for auth handlers
pub struct AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub sessions: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

impl<U, S> Clone for AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<ApiResponse<AuthResponse>>)>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(RegisterInput {
            email: req.email,
            display_name: req.display_name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse {
            token: output.token,
            user: UserDto::from(&output.user),
        })),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<ApiResponse<AuthResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        token: output.token,
        user: UserDto::from(&output.user),
    })))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ApiResponse<()>>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.sessions.clone());
    use_case.execute(&identity).await?;

    Ok(Json(ApiResponse::empty()))
}

/// POST /api/auth/logout/all
pub async fn logout_all<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ApiResponse<()>>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.sessions.clone());
    use_case.execute_all(&identity).await?;

    Ok(Json(ApiResponse::empty()))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me
pub async fn me<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ApiResponse<UserDto>>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(ApiResponse::ok(UserDto::from(&user))))
}

// ============================================================================
// Token Refresh
// ============================================================================

/// POST /api/auth/refresh
///
/// Re-issues a token against the existing session. The session TTL is
/// not extended; logout still revokes the new token with the old one.
pub async fn refresh<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Extension(identity): Extension<Identity>,
) -> AuthResult<Json<ApiResponse<AuthResponse>>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    // Role is read from the database, so a promotion since issue time
    // lands in the refreshed token.
    let token = state
        .codec
        .issue(user.user_id, user.role, identity.session_id)?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        token,
        user: UserDto::from(&user),
    })))
}
