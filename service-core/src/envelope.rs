//! The `{data, message, status}` wrapper every route responds with.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    Success,
    Failed,
    Updated,
    Deleted,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: Message,
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::ok(Some(data), Message::Success)
    }

    pub fn updated(data: T) -> Self {
        Self::ok(Some(data), Message::Updated)
    }

    pub fn deleted(data: T) -> Self {
        Self::ok(Some(data), Message::Deleted)
    }

    /// A successful envelope whose payload may be absent, e.g. an empty listing.
    pub fn ok(data: Option<T>, message: Message) -> Self {
        Self {
            data,
            message,
            status: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Message::Failed,
            status: false,
            error: Some(error.into()),
        }
    }
}

/// Renders as `200 OK`. Other codes come from a `(StatusCode, Envelope)`
/// tuple; failures are rendered by `AppError`.
impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
