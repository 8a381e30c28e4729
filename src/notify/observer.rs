use std::sync::Arc;

use crate::coursework::{Assignment, AssignmentStatus};
use crate::notify::sink::{OutputSink, TracingSink};
use crate::roster::Student;

/// Receives every assignment transition.
///
/// Observers only look; they never change the student or the assignment.
pub trait Observer: Send + Sync {
    fn notify(&self, student: &Student, assignment: &Assignment, is_reminder: bool);
}

/// Build the notification line for a transition.
///
/// A reminder flag wins over the status, so a reminder reads the same
/// whatever state the assignment was in.
pub fn format_notification(
    full_name: &str,
    assignment: &str,
    status: AssignmentStatus,
    is_reminder: bool,
) -> String {
    if is_reminder {
        return reminder_line(full_name, assignment);
    }

    match status {
        AssignmentStatus::FinalReminder => reminder_line(full_name, assignment),
        AssignmentStatus::Released => {
            format!("Observer → {}, {} has been released.", full_name, assignment)
        }
        AssignmentStatus::Working => {
            format!("Observer → {} is working on {}.", full_name, assignment)
        }
        AssignmentStatus::Submitted => {
            format!("Observer → {} has submitted {}.", full_name, assignment)
        }
        AssignmentStatus::Pass => format!("Observer → {} has passed {}.", full_name, assignment),
        AssignmentStatus::Fail => format!("Observer → {} has failed {}.", full_name, assignment),
    }
}

fn reminder_line(full_name: &str, assignment: &str) -> String {
    format!("Observer → {}, final reminder for {}.", full_name, assignment)
}

/// Formats each notification and hands it to an [`OutputSink`].
#[derive(Clone)]
pub struct SinkObserver {
    sink: Arc<dyn OutputSink>,
}

impl Default for SinkObserver {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for SinkObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkObserver").finish_non_exhaustive()
    }
}

impl SinkObserver {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

impl Observer for SinkObserver {
    fn notify(&self, student: &Student, assignment: &Assignment, is_reminder: bool) {
        tracing::debug!(
            student = %student.full_name(),
            assignment = %assignment.name(),
            status = %assignment.status(),
            grade = ?assignment.grade(),
            is_reminder,
            "Assignment notification"
        );

        let line = format_notification(
            student.full_name(),
            assignment.name(),
            assignment.status(),
            is_reminder,
        );
        self.sink.emit(&line);
    }
}
