//! Cookie-backed browser sessions
//!
//! Every request gets a [`SessionId`] extension. A fresh id is issued when the
//! request carries no usable `session_id` cookie, and handlers can rotate the
//! id by returning a [`RotateSession`] response extension.

use axum::{
    extract::Request,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_id";

/// Session of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    id: String,
    is_new: bool,
}

impl SessionId {
    fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when this request had no session before
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

/// Response extension asking the middleware to switch the client to a new id
#[derive(Debug, Clone)]
pub struct RotateSession(pub String);

impl RotateSession {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RotateSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware resolving the session cookie and issuing `Set-Cookie` when needed
pub async fn session_layer(mut request: Request, next: Next) -> Response {
    let session = match cookie_value(request.headers(), SESSION_COOKIE) {
        Some(id) if is_valid_id(&id) => SessionId { id, is_new: false },
        _ => SessionId::generate(),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let issue = match response.extensions_mut().remove::<RotateSession>() {
        Some(RotateSession(id)) => Some(id),
        None if session.is_new => Some(session.id),
        None => None,
    };

    if let Some(id) = issue {
        match HeaderValue::from_str(&session_cookie(&id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}

/// `Set-Cookie` value for a session id
pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// Value of a named cookie across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session_id=abc-123"));
        assert_eq!(cookie_value(&headers, "session_id").as_deref(), Some("abc-123"));
        assert_eq!(cookie_value(&headers, "theme").as_deref(), Some("dark"));
        assert!(cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_id_validation() {
        assert!(is_valid_id(&Uuid::new_v4().to_string()));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("quote\"d"));
        assert!(!is_valid_id(&"a".repeat(65)));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc");
        assert!(cookie.starts_with("session_id=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }
}
