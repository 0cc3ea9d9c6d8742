/// Job status definitions for tracking crawl job progress
///
/// A job moves `pending → running → {done | failed}`. `idle` is synthetic: it
/// is what readers see when no job has ever been persisted.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current status of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// No job has been started yet
    Idle,

    /// Accepted, before any network activity
    Pending,

    /// The worker is consuming the job's targets
    Running,

    // ===== Terminal States =====
    /// Every target was crawled
    Done,

    /// A crawl failed unexpectedly; completed reports are kept
    Failed,
}

impl JobStatus {
    /// Returns true if the job can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true while a job is accepted but not finished
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Whether a job in this status may move to `next`
    ///
    /// `running` is never skipped, and a terminal status is final.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Pending)
                | (Self::Pending, Self::Running)
                | (Self::Running, Self::Done)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a status name; None if it doesn't match any known status
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all statuses in lifecycle order
    pub fn all() -> &'static [JobStatus] {
        &[
            Self::Idle,
            Self::Pending,
            Self::Running,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
