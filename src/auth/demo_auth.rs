use axum_extra::extract::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::models::{AuthenticatedUser, Role};
use crate::auth::session::{clear_session, load_session, store_session, Session};
use crate::error::AppError;

/// Built-in demo user definition.
#[derive(Debug, Clone)]
struct DemoUser {
    username: &'static str,
    password: &'static str,
    role: Role,
    email: &'static str,
}

/// The hard-coded demo users available when `demo_mode` is on.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "subscriber",
        password: "subscriber",
        role: Role::Subscriber,
        email: "subscriber@demo.toolshed.dev",
    },
    DemoUser {
        username: "contributor",
        password: "contributor",
        role: Role::Contributor,
        email: "contributor@demo.toolshed.dev",
    },
    DemoUser {
        username: "editor",
        password: "editor",
        role: Role::Editor,
        email: "editor@demo.toolshed.dev",
    },
    DemoUser {
        username: "admin",
        password: "admin",
        role: Role::Administrator,
        email: "admin@demo.toolshed.dev",
    },
];

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: AuthenticatedUser,
    /// Must be echoed in the `X-CSRF-Token` header on every tool request.
    pub csrf_token: String,
}

/// Current session as returned by `GET /api/auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthenticatedUser,
    pub csrf_token: String,
}

/// Validate demo credentials and return the corresponding user.
pub fn authenticate_demo_user(
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .map(|u| AuthenticatedUser {
            user_id: format!("demo-{}", u.username),
            email: u.email.to_string(),
            role: u.role,
        })
        .ok_or_else(|| AppError::Auth("Invalid username or password".into()))
}

/// `POST /api/auth/login`: demo login handler.
///
/// Validates credentials against the built-in user table. On success, sets
/// the signed session cookie and returns the user with a fresh anti-forgery
/// token.
pub async fn login_handler(
    jar: SignedCookieJar,
    axum::Json(req): axum::Json<LoginRequest>,
) -> Result<(SignedCookieJar, axum::Json<LoginResponse>), AppError> {
    let user = authenticate_demo_user(&req.username, &req.password)?;
    let session = Session::start(user);
    let jar = store_session(jar, &session)?;

    tracing::info!(user = %session.user.user_id, role = %session.user.role, "Login successful");

    Ok((
        jar,
        axum::Json(LoginResponse {
            message: "Login successful".to_string(),
            user: session.user,
            csrf_token: session.csrf_token,
        }),
    ))
}

/// `GET /api/auth/me`: returns the current user from the session cookie.
pub async fn me_handler(jar: SignedCookieJar) -> Result<axum::Json<MeResponse>, AppError> {
    let session = load_session(&jar)?;

    Ok(axum::Json(MeResponse {
        user: session.user,
        csrf_token: session.csrf_token,
    }))
}

/// `POST /api/auth/logout`: clears the session cookie.
pub async fn logout_handler(jar: SignedCookieJar) -> SignedCookieJar {
    clear_session(jar)
}
