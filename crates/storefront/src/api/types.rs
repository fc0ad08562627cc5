//! Wire types for commerce service responses.
//!
//! Request bodies and error envelopes are private to the client; these are the
//! success payloads handed back to callers.

use redis_shop_core::{CartEntry, UserId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Response to `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token identifying the new session.
    pub token: SecretString,
}

/// Response to `GET /me`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: UserId,
}

/// Response to `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddResponse {
    pub message: String,
    pub cart: Vec<CartEntry>,
}

/// Response to `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart: Vec<CartEntry>,
}

/// Request body for `POST /login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable message carried by `detail`, if any.
    ///
    /// `detail` is usually a string. Request validation failures instead send
    /// a list of `{msg, ...}` objects, whose messages are joined.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}
