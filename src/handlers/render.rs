use std::fmt::Write as _;
use std::sync::Arc;

use crate::models::user::User;
use crate::session::state::{Notification, SessionStatus, Severity, Snapshot, TriggerOutcome};

/// Redraw only when something visible in the grid changed
pub fn should_redraw(previous: &Snapshot, next: &Snapshot) -> bool {
    previous.status != next.status
        || previous.data_status != next.data_status
        || !Arc::ptr_eq(&previous.projected_records, &next.projected_records)
        || previous.total_records != next.total_records
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = write!(out, "== User Browser == [{}]", snapshot.status);
    if let Some(data) = snapshot.data_status {
        let _ = write!(out, "  Total Users: {}", data.total_users);
    }
    out.push('\n');

    if !snapshot.committed_term.is_empty() {
        let _ = writeln!(out, "Search: \"{}\"", snapshot.committed_term);
    }
    if let Some(hint) = &snapshot.search_hint {
        let _ = writeln!(out, "  {}", hint);
    }

    if snapshot.show_welcome() {
        out.push_str("No user data is currently loaded. Run `load` to fetch users from the external API.\n");
    }

    match &snapshot.status {
        SessionStatus::Initializing => {
            out.push_str("Loading User Management System...\n");
            return out;
        }
        SessionStatus::Loading => {
            out.push_str("Loading...\n");
            return out;
        }
        // last good records stay listed under the error
        SessionStatus::Error(message) => {
            let _ = writeln!(out, "Error loading users: {}", message);
            if snapshot.total_records == 0 {
                return out;
            }
        }
        SessionStatus::Idle => {}
    }

    if snapshot.total_records == 0 {
        out.push_str("No users found. Try adjusting your search criteria or load data from the external API.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Sort: {} | Role: {} | {} users",
        snapshot.sort.label(),
        snapshot.filter,
        snapshot.count_summary()
    );
    let _ = writeln!(out, "Roles: all, {}", snapshot.available_roles.join(", "));

    let _ = writeln!(out, "{:>6}  {:<28} {:<12} {:>4}  {}", "ID", "Name", "Role", "Age", "Email");
    for user in snapshot.projected_records.iter() {
        let _ = writeln!(
            out,
            "{:>6}  {:<28} {:<12} {:>4}  {}",
            user.id,
            user.full_name(),
            user.role,
            user.age,
            user.email
        );
    }

    out
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.severity {
        Severity::Success => "ok",
        Severity::Error => "error",
        Severity::Info => "info",
    };
    format!("[{}] {}", tag, notification.message)
}

/// Explain outcomes the session did not announce itself
pub fn render_outcome(outcome: TriggerOutcome, snapshot: &Snapshot) -> Option<String> {
    match outcome {
        TriggerOutcome::Applied | TriggerOutcome::Failed => None,
        TriggerOutcome::Busy => Some("Busy: another action is still running".to_string()),
        TriggerOutcome::TermTooShort => snapshot.search_hint.clone(),
        TriggerOutcome::NotActionable => {
            Some("Load is only available while the server reports no data".to_string())
        }
    }
}

pub fn render_user(user: &User) -> String {
    serde_json::to_string_pretty(user).unwrap_or_else(|_| user.full_name())
}
