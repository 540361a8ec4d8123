//! Transient user-facing notifications

use std::time::Duration;

use tokio::time::Instant;

use crate::api::ApiError;

/// How long a notice stays visible unless dismissed.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: Option<String>,
    pub message: String,
    pub level: NoticeLevel,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl Notice {
    pub fn new(message: String, level: NoticeLevel) -> Self {
        Self {
            title: None,
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Error)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn from_api_error(err: &ApiError) -> Self {
        Self::error(err.user_message()).with_title(err.label())
    }

    pub fn expires_at(&self) -> Instant {
        self.timestamp + NOTICE_TTL
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}
