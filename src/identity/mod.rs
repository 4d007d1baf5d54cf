//! Anonymous visitor identity.
//!
//! There are no accounts: each browser gets an opaque random token in a
//! long-lived cookie, regenerated whenever absent. Nothing server-side
//! records issued tokens — uniqueness is probabilistic (128-bit random
//! UUID) and never checked against existing values. Task logic only ever
//! sees a `VisitorId`, so a real auth system can replace this module
//! without touching the task layer.

use axum::http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use axum::response::Response;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "user_id";

/// One year, in seconds.
const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Opaque per-browser token used in place of real authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorId(String);

impl VisitorId {
    /// Generate a fresh 128-bit random token in canonical UUID form.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for VisitorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The identity resolved for one request, plus whether it was newly
/// generated (and therefore must be set as a cookie on the response).
#[derive(Debug, Clone)]
pub struct Identity {
    pub visitor: VisitorId,
    pub fresh: bool,
}

impl Identity {
    /// Read the identity token from the request's cookies, generating a new
    /// one when absent.
    pub fn resolve(headers: &HeaderMap) -> Self {
        for value in headers.get_all(COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            if let Some(token) = cookie_value(raw, COOKIE_NAME) {
                return Self {
                    visitor: VisitorId(token.to_string()),
                    fresh: false,
                };
            }
        }
        Self {
            visitor: VisitorId::generate(),
            fresh: true,
        }
    }

    /// Append the identity cookie to `resp` when this identity was newly
    /// generated; pass the response through unchanged otherwise.
    pub fn apply(&self, mut resp: Response) -> Response {
        if self.fresh {
            if let Ok(value) = HeaderValue::try_from(self.cookie_string()) {
                resp.headers_mut().append(SET_COOKIE, value);
            }
        }
        resp
    }

    /// The full `Set-Cookie` value for this identity.
    pub fn cookie_string(&self) -> String {
        format!(
            "{COOKIE_NAME}={}; Max-Age={COOKIE_MAX_AGE_SECS}; Path=/; SameSite=Lax; HttpOnly",
            self.visitor.as_str()
        )
    }
}

/// Extract a named cookie's value from a `Cookie:` header line.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name && !v.is_empty()).then_some(v)
    })
}
