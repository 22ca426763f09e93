//! Auto-expiring user notices

use std::time::{Duration, Instant};

use crate::error::ClientError;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub expires_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Newest-first queue of notices
#[derive(Debug)]
pub struct Notices {
    items: Vec<Notice>,
    ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_NOTICE_TTL)
    }
}

impl Notices {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: NoticeLevel) {
        self.items.insert(0, Notice::new(message, level, self.ttl));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, NoticeLevel::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(message, NoticeLevel::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, NoticeLevel::Error);
    }

    /// Surface a recovered client failure
    pub fn report(&mut self, err: &ClientError) {
        let level = match err {
            ClientError::Auth(_) | ClientError::NotFound(_) => NoticeLevel::Warning,
            ClientError::Persistence(_) | ClientError::Render(_) => NoticeLevel::Error,
        };
        self.push(err.user_message(), level);
    }

    /// Drop expired notices; true if any were removed
    pub fn prune(&mut self) -> bool {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired());
        self.items.len() != before
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.first()
    }

    pub fn all(&self) -> &[Notice] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
