use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coursework::timer::{TimerHandle, TimerKind};

/// Grades strictly above this pass; exactly 50 fails.
pub const PASS_THRESHOLD: f64 = 50.0;

/// Label shown for an assignment a student has never been given.
pub const NOT_ASSIGNED: &str = "not assigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentStatus {
    Released,
    Working,
    Submitted,
    FinalReminder,
    Pass,
    Fail,
}

impl AssignmentStatus {
    /// Released, working or on final reminder: the student still owes work.
    pub fn is_outstanding(self) -> bool {
        matches!(
            self,
            AssignmentStatus::Released | AssignmentStatus::Working | AssignmentStatus::FinalReminder
        )
    }

    /// Handed in, whether or not a grade has arrived yet.
    pub fn is_submitted_or_graded(self) -> bool {
        matches!(
            self,
            AssignmentStatus::Submitted | AssignmentStatus::Pass | AssignmentStatus::Fail
        )
    }

    pub fn is_graded(self) -> bool {
        matches!(self, AssignmentStatus::Pass | AssignmentStatus::Fail)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Released => write!(f, "released"),
            AssignmentStatus::Working => write!(f, "working"),
            AssignmentStatus::Submitted => write!(f, "submitted"),
            AssignmentStatus::FinalReminder => write!(f, "final-reminder"),
            AssignmentStatus::Pass => write!(f, "pass"),
            AssignmentStatus::Fail => write!(f, "fail"),
        }
    }
}

/// One student's copy of an assignment.
///
/// The grade, graded flag and pending timer are only reachable through the
/// methods below; the owning student is the only writer.
#[derive(Debug, Clone)]
pub struct Assignment {
    name: String,
    status: AssignmentStatus,
    grade: Option<f64>,
    graded: bool,
    pending_timer: Option<TimerHandle>,
    released_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            status: AssignmentStatus::Released,
            grade: None,
            graded: false,
            pending_timer: None,
            released_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn grade(&self) -> Option<f64> {
        self.grade
    }

    pub fn is_graded(&self) -> bool {
        self.graded
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending_timer
            .as_ref()
            .is_some_and(|timer| !timer.is_cancelled())
    }

    /// Kind of the queued auto-transition, if one is still live.
    pub fn pending_timer_kind(&self) -> Option<TimerKind> {
        self.pending_timer
            .as_ref()
            .filter(|timer| !timer.is_cancelled())
            .map(|timer| timer.kind())
    }

    pub fn released_at(&self) -> DateTime<Utc> {
        self.released_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Record a grade and derive pass/fail from it.
    pub fn set_grade(&mut self, grade: f64) {
        self.grade = Some(grade);
        self.graded = true;
        self.status = if grade > PASS_THRESHOLD {
            AssignmentStatus::Pass
        } else {
            AssignmentStatus::Fail
        };
        self.touch();
    }

    /// Move to a non-graded status. Graded statuses only come from
    /// [`Assignment::set_grade`].
    pub(crate) fn set_status(&mut self, status: AssignmentStatus) {
        debug_assert!(!status.is_graded(), "graded status set without a grade");
        self.status = status;
        self.touch();
    }

    /// Cancel whatever auto-transition is queued for this assignment.
    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            tracing::trace!(
                timer_id = timer.id(),
                kind = %timer.kind(),
                assignment = %self.name,
                "Pending timer cancelled"
            );
            timer.cancel();
        }
    }

    /// Replace the pending timer, cancelling the previous one.
    pub(crate) fn set_timer(&mut self, timer: TimerHandle) {
        self.cancel_timer();
        self.pending_timer = Some(timer);
    }

    /// Forget the pending timer if it is the one identified by `timer_id`.
    /// Returns false when a newer timer has superseded it.
    pub(crate) fn clear_timer_if_current(&mut self, timer_id: u64) -> bool {
        match &self.pending_timer {
            Some(timer) if timer.id() == timer_id => {
                self.pending_timer = None;
                true
            }
            _ => false,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
