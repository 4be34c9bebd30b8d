//! # UI Types
//!
//! Toast notifications and coarse display preferences. The toast queue is
//! in-process only; dark mode and font size are the fields the UI store
//! persists.

use serde::{Deserialize, Serialize};

/// Severity of a toast notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
            ToastKind::Info => write!(f, "info"),
            ToastKind::Warning => write!(f, "warning"),
        }
    }
}

/// A queued toast notification.
///
/// Self-expiring: the UI store removes it after `duration_ms`, except
/// when `duration_ms == 0`, which means "never auto-remove".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    /// Short random id, generated by the UI store on enqueue.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
    pub duration_ms: u64,
}

/// UI font scale. One of the two preferences that survive a UI reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl std::fmt::Display for FontSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSize::Small => write!(f, "small"),
            FontSize::Medium => write!(f, "medium"),
            FontSize::Large => write!(f, "large"),
        }
    }
}
