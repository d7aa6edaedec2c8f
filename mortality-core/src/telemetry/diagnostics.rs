//! Per-call diagnostic trail.
//!
//! Each save produces its own ordered list of timestamped messages; nothing
//! is shared between calls. Every entry is mirrored to the `log` facade.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticMessage {
    pub at: DateTime<Utc>,
    pub level: DiagnosticLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DiagnosticLog {
    messages: Vec<DiagnosticMessage>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: DiagnosticLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            DiagnosticLevel::Info | DiagnosticLevel::Success => log::info!("[sheets] {}", message),
            DiagnosticLevel::Warning => log::warn!("[sheets] {}", message),
            DiagnosticLevel::Error => log::error!("[sheets] {}", message),
        }
        self.messages.push(DiagnosticMessage {
            at: Utc::now(),
            level,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Error, message);
    }

    pub fn messages(&self) -> &[DiagnosticMessage] {
        &self.messages
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.message.contains(needle))
    }

    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.messages.iter().filter(|m| m.level == level).count()
    }
}
