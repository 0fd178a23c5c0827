use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::models::status::DataStatus;
use crate::models::user::User;
use crate::view::spec::{RoleFilter, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Initializing,
    Idle,
    Loading,
    Error(String),
}

impl SessionStatus {
    /// True while triggers must be refused
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Initializing | SessionStatus::Loading)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Initializing => f.write_str("initializing"),
            SessionStatus::Idle => f.write_str("idle"),
            SessionStatus::Loading => f.write_str("loading"),
            SessionStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Transient operator-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// What happened to a trigger request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The remote call succeeded and the session was updated
    Applied,
    /// The remote call failed; the collection was left as it was
    Failed,
    /// Another action is in flight, or the session is still initializing
    Busy,
    /// The staged search term is too short; nothing was sent
    TermTooShort,
    /// Bulk load was requested while data is loaded or status is unknown
    NotActionable,
}

/// Read-only view of the session handed to the display layer.
/// A new one is published on every state change.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub status: SessionStatus,
    pub data_status: Option<DataStatus>,
    pub projected_records: Arc<Vec<User>>,
    pub total_records: usize,
    pub available_roles: Arc<Vec<String>>,
    pub filter: RoleFilter,
    pub sort: SortSpec,
    pub error_message: Option<String>,
    pub pending_term: String,
    pub committed_term: String,
    pub search_hint: Option<String>,
    /// A focus request is still waiting to be served
    pub focus_requested: bool,
    /// Id of the latest focus request, passed back to `acknowledge_focus`
    pub focus_request: u64,
}

impl Snapshot {
    pub fn is_loading(&self) -> bool {
        self.status.is_busy()
    }

    /// Trigger affordances are disabled while this is false
    pub fn controls_enabled(&self) -> bool {
        !self.is_loading()
    }

    pub fn can_bulk_load(&self) -> bool {
        self.controls_enabled() && matches!(self.data_status, Some(s) if !s.data_loaded)
    }

    /// `"{projected} of {total}"`
    pub fn count_summary(&self) -> String {
        format!("{} of {}", self.projected_records.len(), self.total_records)
    }

    pub fn view_is_default(&self) -> bool {
        self.filter.is_all() && self.sort == SortSpec::None
    }

    /// Nothing loaded on the backend and nothing to show yet
    pub fn show_welcome(&self) -> bool {
        matches!(self.data_status, Some(s) if !s.data_loaded)
            && self.total_records == 0
            && self.error_message.is_none()
    }
}
