use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused a sync pass to be attempted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Manual { force: bool },
    Timer,
    ConnectivityRestored,
}

impl SyncTrigger {
    pub fn is_automatic(&self) -> bool {
        matches!(self, SyncTrigger::Timer | SyncTrigger::ConnectivityRestored)
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, SyncTrigger::Manual { force: true })
    }
}

/// Gatekeeping precondition that stopped a pass before it started.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyRunning,
    AutoSyncDisabled,
    Offline,
    MeteredConnection,
    NoSession,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::AlreadyRunning => "already_running",
            SkipReason::AutoSyncDisabled => "auto_sync_disabled",
            SkipReason::Offline => "offline",
            SkipReason::MeteredConnection => "metered_connection",
            SkipReason::NoSession => "no_session",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PassOutcome {
    Skipped(SkipReason),
    Completed,
}

/// Result of one full pass: pull, then push, then photo upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub trigger: SyncTrigger,
    pub outcome: PassOutcome,
    pub pulled: u32,
    pub pushed: u32,
    pub push_failures: u32,
    pub photos_uploaded: u32,
    pub photo_failures: u32,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn started(trigger: SyncTrigger) -> Self {
        Self {
            trigger,
            outcome: PassOutcome::Completed,
            pulled: 0,
            pushed: 0,
            push_failures: 0,
            photos_uploaded: 0,
            photo_failures: 0,
            errors: Vec::new(),
        }
    }

    pub fn skipped(trigger: SyncTrigger, reason: SkipReason) -> Self {
        Self {
            outcome: PassOutcome::Skipped(reason),
            ..Self::started(trigger)
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, PassOutcome::Skipped(_))
    }

    /// A clean pass advances the global watermark and clears the visible
    /// error list.
    pub fn is_clean(&self) -> bool {
        matches!(self.outcome, PassOutcome::Completed) && self.errors.is_empty()
    }
}

/// Phase of the pass currently executing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Gatekeeping,
    Pulling,
    Pushing,
    UploadingPhotos,
}

/// Read-only counters surfaced to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub is_syncing: bool,
    pub phase: SyncPhase,
    pub pending_operations: u64,
    pub dead_letters: u64,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub recent_errors: Vec<String>,
}

impl SyncSnapshot {
    pub fn idle() -> Self {
        Self {
            is_syncing: false,
            phase: SyncPhase::Idle,
            pending_operations: 0,
            dead_letters: 0,
            last_synced_at: None,
            recent_errors: Vec::new(),
        }
    }
}
