use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::auth::models::{AuthenticatedUser, Capability};
use crate::error::AppError;

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "toolshed_session";

/// Header carrying the per-session anti-forgery token.
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// Session payload stored in the signed cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthenticatedUser,
    pub csrf_token: String,
}

impl Session {
    /// Start a new session for `user` with a fresh anti-forgery token.
    pub fn start(user: AuthenticatedUser) -> Self {
        Self {
            user,
            csrf_token: generate_csrf_token(),
        }
    }
}

/// 32 random bytes, URL-safe base64.
pub fn generate_csrf_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Attach the session to the jar.
pub fn store_session(jar: SignedCookieJar, session: &Session) -> Result<SignedCookieJar, AppError> {
    let value = serde_json::to_string(session)
        .map_err(|e| AppError::Internal(format!("Failed to serialize session: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();

    Ok(jar.add(cookie))
}

/// Read the session from the jar. Tampered cookies fail signature
/// verification and are treated as absent.
pub fn load_session(jar: &SignedCookieJar) -> Result<Session, AppError> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| AppError::Auth("Not logged in".into()))?;

    serde_json::from_str(cookie.value())
        .map_err(|e| AppError::Auth(format!("Invalid session: {}", e)))
}

/// Drop the session cookie from the jar.
pub fn clear_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Token equality over SHA-256 digests; timing reveals no matching prefix.
fn tokens_match(presented: &str, expected: &str) -> bool {
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Check the anti-forgery header and the required capability for `session`.
pub fn authorize(
    session: &Session,
    headers: &HeaderMap,
    capability: Capability,
) -> Result<(), AppError> {
    let presented = headers
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Forbidden("Missing anti-forgery token".into()))?;

    if !tokens_match(presented, &session.csrf_token) {
        return Err(AppError::Forbidden("Invalid anti-forgery token".into()));
    }

    if !session.user.can(capability) {
        tracing::info!(
            user = %session.user.user_id,
            role = %session.user.role,
            %capability,
            "Capability check failed"
        );
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    Ok(())
}

/// Route guard: rejects the request unless it carries a valid session, a
/// matching anti-forgery token and a user holding `capability`.
///
/// On success the `AuthenticatedUser` is inserted into request extensions.
pub async fn require_capability(
    capability: Capability,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = load_session(&jar)?;
    authorize(&session, request.headers(), capability)?;

    request.extensions_mut().insert(session.user);
    Ok(next.run(request).await)
}
