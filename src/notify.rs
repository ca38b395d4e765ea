use std::fmt;

use crate::client::ApiError;
use crate::player::PlayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
    /// The server refused the action for this user
    Unauthorized,
}

/// A user-visible message produced at the caller boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            NotificationKind::Unauthorized,
            "You do not have permission for this action.",
        )
    }

    /// Map an API failure, keeping forbidden responses distinct
    pub fn from_api_error(err: &ApiError, what: &str) -> Self {
        match err {
            ApiError::Forbidden => Self::unauthorized(),
            other => Self::error(format!("Failed to {}: {}", what, other)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            NotificationKind::Error | NotificationKind::Unauthorized
        )
    }
}

impl From<&PlayerError> for Notification {
    fn from(err: &PlayerError) -> Self {
        match err {
            PlayerError::EmptySequence => Self::info("No slides available."),
            PlayerError::SurfaceUnavailable(_) => Self::error(
                "Unable to open the presentation window. Please allow pop-ups to view the slides.",
            ),
            PlayerError::SessionActive(board) => Self::info(format!(
                "Board {} is already being shown.",
                board
            )),
            PlayerError::Scheduler(msg) => Self::error(format!("Failed to start rotation: {}", msg)),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
            NotificationKind::Unauthorized => "unauthorized",
        };
        write!(f, "[{}] {}", label, self.message)
    }
}
