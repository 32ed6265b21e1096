//! Sign-in, session and route guard handlers.
//!
//! The OAuth exchange itself happens at the identity provider. Once the
//! provider has verified the user, its profile is posted to
//! `/api/auth/callback`, which reconciles the guest record and opens a
//! session.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use cabinstay_core::{enrich_session, reconcile_login, ProviderProfile, Session};
use serde::Serialize;

use super::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "cabinstay_session";

/// Where unauthenticated visitors of protected pages are sent.
const LOGIN_PATH: &str = "/login";

#[derive(Serialize)]
pub struct SignInResponse {
    allowed: bool,
}

/// Identity provider callback.
pub async fn callback(
    State(state): State<AppState>,
    Json(profile): Json<ProviderProfile>,
) -> Response {
    let allowed = reconcile_login(state.guests.as_ref(), &profile).await;

    let session = Session::for_user(profile.email, profile.name);
    let token = state.sessions.create(session);
    let cookie = session_cookie(&token, state.sessions.ttl().as_secs(), state.cookie_secure);

    let mut response = Json(SignInResponse { allowed }).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Returns the enriched session of the caller, or `null`.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<Option<Session>> {
    Json(current_session(&state, &headers).await)
}

/// Ends the caller's session.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(value) = HeaderValue::from_str(&session_cookie("", 0, state.cookie_secure)) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Route guard.
///
/// Auth endpoints are always reachable. Account pages require a session
/// and redirect to the login page otherwise; the enriched session is made
/// available to them as a request extension.
pub async fn authorize(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if path.starts_with("/api/auth") || !is_protected(&path) {
        return next.run(request).await;
    }

    match current_session(&state, request.headers()).await {
        Some(session) if session.user.is_some() => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        _ => {
            tracing::debug!("No session for {}, redirecting to login", path);
            Redirect::to(&format!(
                "{}?callbackUrl={}",
                LOGIN_PATH,
                urlencoding::encode(&path)
            ))
            .into_response()
        }
    }
}

fn is_protected(path: &str) -> bool {
    path == "/account" || path.starts_with("/account/")
}

/// Loads and enriches the session referenced by the request headers.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let token = session_token(headers)?;
    let session = state.sessions.get(&token)?;
    Some(enrich_session(state.guests.as_ref(), session).await)
}

/// Extracts the session token from a bearer header or the session cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age_secs,
        if secure { "; Secure" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; cabinstay_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("cabinstay_session="));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_protected_paths() {
        assert!(is_protected("/account"));
        assert!(is_protected("/account/bookings"));
        assert!(!is_protected("/accounts"));
        assert!(!is_protected("/cabins"));
    }

    #[test]
    fn test_session_cookie_format() {
        assert_eq!(
            session_cookie("tok", 60, false),
            "cabinstay_session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(session_cookie("tok", 60, true).ends_with("; Secure"));
    }
}
