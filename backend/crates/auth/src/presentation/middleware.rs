//! Auth Gate Middleware
//!
//! Three gates, composed per route group by the binary:
//! - `require_auth`: mandatory authentication; rejects with 401
//! - `optional_auth`: attaches an identity when a valid one is carried,
//!   passes anonymous traffic through untouched
//! - `require_role`: role gate layered after `require_auth`
//!
//! A successful gate inserts [`Identity`] into request extensions for
//! downstream handlers.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use kernel::identity::{Identity, Role};
use platform::bearer::extract_bearer;

use crate::application::AuthenticateUseCase;
use crate::domain::repository::SessionStore;
use crate::error::AuthError;
use crate::token::TokenCodec;

/// Middleware state for the auth gates
pub struct AuthGateState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub sessions: Arc<S>,
    pub codec: Arc<TokenCodec>,
}

impl<S> Clone for AuthGateState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<S> AuthGateState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(sessions: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { sessions, codec }
    }
}

/// Middleware that requires a live authenticated identity
pub async fn require_auth<S>(
    state: AuthGateState<S>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    S: SessionStore + Send + Sync + 'static,
{
    let Some(token) = extract_bearer(req.headers()) else {
        return Err(AuthError::AuthenticationRequired.into_response());
    };

    let gate = AuthenticateUseCase::new(state.sessions.clone(), state.codec.clone());
    let identity = match gate.execute(token).await {
        Ok(identity) => identity,
        Err(e) => return Err(e.into_response()),
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Middleware that attaches an identity when one is present and valid
///
/// Anonymous requests and requests with a stale token both pass
/// through without an identity; handlers that need one reject later.
pub async fn optional_auth<S>(
    state: AuthGateState<S>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    S: SessionStore + Send + Sync + 'static,
{
    if let Some(token) = extract_bearer(req.headers()) {
        let gate = AuthenticateUseCase::new(state.sessions.clone(), state.codec.clone());
        match gate.execute(token).await {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid credentials on optional route");
            }
        }
    }

    next.run(req).await
}

/// Middleware that restricts a route group to the given roles
///
/// Must be layered after [`require_auth`], which populates the
/// identity extension this gate reads.
pub async fn require_role(
    allowed: &'static [Role],
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(identity) = req.extensions().get::<Identity>().copied() else {
        return Err(AuthError::AuthenticationRequired.into_response());
    };

    if !allowed.contains(&identity.role) {
        return Err(AuthError::InsufficientRole.into_response());
    }

    Ok(next.run(req).await)
}
