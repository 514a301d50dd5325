//! Auth Router

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::domain::repository::{SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthGateState, require_auth};

/// Create the auth router
///
/// `/register` and `/login` are public; everything else sits behind
/// the mandatory auth gate.
pub fn auth_router<U, S>(state: AuthAppState<U, S>, gate: AuthGateState<S>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/register", post(handlers::register::<U, S>))
        .route("/login", post(handlers::login::<U, S>));

    let protected = Router::new()
        .route("/logout", post(handlers::logout::<U, S>))
        .route("/logout/all", post(handlers::logout_all::<U, S>))
        .route("/refresh", post(handlers::refresh::<U, S>))
        .route("/me", get(handlers::me::<U, S>))
        .layer(from_fn(move |req, next| {
            require_auth(gate.clone(), req, next)
        }));

    public.merge(protected).with_state(state)
}
