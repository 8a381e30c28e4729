use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::coursework::grading::usable_grade;
use crate::coursework::timer::{self, TimerHandle, TimerKind};
use crate::coursework::{Assignment, AssignmentStatus, GradeSource, RandomGrades};
use crate::notify::Observer;
use crate::roster::report::{AssignmentReport, StudentReport};

/// A student and their assignments.
///
/// `Student` is a cheap handle: clones share the same assignments, and two
/// handles are equal when they refer to the same student. Every mutator
/// creates the named assignment on first use (notifying `released`) before
/// applying its own transition.
#[derive(Clone)]
pub struct Student {
    inner: Arc<StudentInner>,
}

struct StudentInner {
    id: Uuid,
    full_name: String,
    email: String,
    observer: Arc<dyn Observer>,
    grades: Arc<dyn GradeSource>,
    config: EngineConfig,
    state: Mutex<StudentState>,
}

#[derive(Default)]
struct StudentState {
    /// In first-touched order
    assignments: Vec<Assignment>,
    overall_grade: Option<f64>,
}

impl StudentState {
    fn position(&self, name: &str) -> Option<usize> {
        self.assignments.iter().position(|a| a.name() == name)
    }

    fn get(&self, name: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.name() == name)
    }

    /// Mean over graded assignments only.
    fn recompute_overall(&mut self) -> Option<f64> {
        let grades: Vec<f64> = self.assignments.iter().filter_map(|a| a.grade()).collect();
        self.overall_grade = if grades.is_empty() {
            None
        } else {
            Some(grades.iter().sum::<f64>() / grades.len() as f64)
        };
        self.overall_grade
    }
}

impl Drop for StudentInner {
    fn drop(&mut self) {
        for assignment in &mut self.state.get_mut().assignments {
            assignment.cancel_timer();
        }
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Student {}

impl std::fmt::Debug for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Student")
            .field("id", &self.inner.id)
            .field("full_name", &self.inner.full_name)
            .field("email", &self.inner.email)
            .finish_non_exhaustive()
    }
}

impl Student {
    /// Student with the default timings and uniformly random auto-grades.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self::with_engine(
            full_name,
            email,
            observer,
            EngineConfig::default(),
            Arc::new(RandomGrades),
        )
    }

    pub fn with_engine(
        full_name: impl Into<String>,
        email: impl Into<String>,
        observer: Arc<dyn Observer>,
        config: EngineConfig,
        grades: Arc<dyn GradeSource>,
    ) -> Self {
        Self {
            inner: Arc::new(StudentInner {
                id: Uuid::new_v4(),
                full_name: full_name.into(),
                email: email.into(),
                observer,
                grades,
                config,
                state: Mutex::new(StudentState::default()),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn full_name(&self) -> &str {
        &self.inner.full_name
    }

    pub fn email(&self) -> &str {
        &self.inner.email
    }

    /// Release an assignment by name, and grade it if a grade is given.
    ///
    /// A non-finite grade counts as no grade. Without a grade, an existing
    /// assignment is left untouched.
    pub async fn update_assignment_status(&self, name: &str, grade: Option<f64>) {
        let mut state = self.inner.state.lock().await;
        let idx = self.ensure_assignment(&mut state, name);

        if let Some(grade) = grade.and_then(usable_grade) {
            self.grade_locked(&mut state, idx, grade);
        }
    }

    /// Start working on an assignment and queue its auto-submit.
    ///
    /// A graded assignment stays graded: the call leaves its status, grade
    /// and notifications untouched.
    pub async fn start_working(&self, name: &str) {
        let mut state = self.inner.state.lock().await;
        let idx = self.ensure_assignment(&mut state, name);

        let assignment = &mut state.assignments[idx];
        if assignment.status().is_graded() {
            tracing::debug!(
                student = %self.inner.full_name,
                assignment = %name,
                status = %assignment.status(),
                "Ignoring start_working on graded assignment"
            );
            return;
        }

        assignment.set_status(AssignmentStatus::Working);
        self.inner.observer.notify(self, assignment, false);

        assignment.cancel_timer();
        let timer = self.schedule_auto_submit(name);
        assignment.set_timer(timer);
    }

    /// Submit an assignment and queue its auto-grade. Does nothing if the
    /// assignment is already submitted or graded.
    pub async fn submit_assignment(&self, name: &str) {
        let mut state = self.inner.state.lock().await;
        let idx = self.ensure_assignment(&mut state, name);
        self.submit_locked(&mut state, idx);
    }

    /// Current status, or `None` if the assignment was never given to this
    /// student. Never creates the assignment.
    pub async fn assignment_status(&self, name: &str) -> Option<AssignmentStatus> {
        self.inner.state.lock().await.get(name).map(|a| a.status())
    }

    /// Mean grade over graded assignments, `None` until something is graded.
    pub async fn grade(&self) -> Option<f64> {
        self.inner.state.lock().await.recompute_overall()
    }

    /// Snapshot of one assignment.
    pub async fn assignment(&self, name: &str) -> Option<Assignment> {
        self.inner.state.lock().await.get(name).cloned()
    }

    /// Snapshot of every assignment in first-touched order.
    pub async fn assignments(&self) -> Vec<Assignment> {
        self.inner.state.lock().await.assignments.clone()
    }

    /// True if the named assignment (or any assignment, for `None`) is still
    /// outstanding.
    pub async fn has_outstanding(&self, name: Option<&str>) -> bool {
        let state = self.inner.state.lock().await;
        match name {
            Some(name) => state
                .get(name)
                .is_some_and(|a| a.status().is_outstanding()),
            None => state
                .assignments
                .iter()
                .any(|a| a.status().is_outstanding()),
        }
    }

    /// Cancel every queued auto-submit and auto-grade.
    pub async fn cancel_pending_timers(&self) {
        let mut state = self.inner.state.lock().await;
        for assignment in &mut state.assignments {
            assignment.cancel_timer();
        }
    }

    pub async fn report(&self) -> StudentReport {
        let mut state = self.inner.state.lock().await;
        let overall_grade = state.recompute_overall();
        StudentReport {
            id: self.inner.id,
            full_name: self.inner.full_name.clone(),
            email: self.inner.email.clone(),
            overall_grade,
            assignments: state
                .assignments
                .iter()
                .map(AssignmentReport::from)
                .collect(),
        }
    }

    /// Force the assignment into `final-reminder`, announce it through
    /// `observer` as a reminder, then submit it.
    ///
    /// Returns false (and does nothing beyond creating the assignment) when
    /// the assignment is no longer outstanding, e.g. it was submitted after
    /// the roster picked this student.
    pub(crate) async fn send_final_reminder(&self, name: &str, observer: &dyn Observer) -> bool {
        let mut state = self.inner.state.lock().await;
        let idx = self.ensure_assignment(&mut state, name);

        let assignment = &mut state.assignments[idx];
        if !assignment.status().is_outstanding() {
            tracing::debug!(
                student = %self.inner.full_name,
                assignment = %name,
                status = %assignment.status(),
                "Reminder skipped, assignment no longer outstanding"
            );
            return false;
        }

        assignment.set_status(AssignmentStatus::FinalReminder);
        observer.notify(self, assignment, true);
        assignment.cancel_timer();

        self.submit_locked(&mut state, idx);
        true
    }

    /// Index of the named assignment, creating and announcing it if needed.
    fn ensure_assignment(&self, state: &mut StudentState, name: &str) -> usize {
        if let Some(idx) = state.position(name) {
            return idx;
        }

        state.assignments.push(Assignment::new(name));
        let idx = state.assignments.len() - 1;
        tracing::debug!(
            student = %self.inner.full_name,
            assignment = %name,
            "Assignment released"
        );
        self.inner
            .observer
            .notify(self, &state.assignments[idx], false);
        idx
    }

    fn submit_locked(&self, state: &mut StudentState, idx: usize) -> bool {
        let assignment = &mut state.assignments[idx];
        if assignment.status().is_submitted_or_graded() {
            tracing::debug!(
                student = %self.inner.full_name,
                assignment = %assignment.name(),
                status = %assignment.status(),
                "Submission ignored, already submitted"
            );
            return false;
        }

        assignment.cancel_timer();
        assignment.set_status(AssignmentStatus::Submitted);
        self.inner.observer.notify(self, assignment, false);

        let timer = self.schedule_auto_grade(assignment.name());
        assignment.set_timer(timer);
        true
    }

    fn grade_locked(&self, state: &mut StudentState, idx: usize, grade: f64) {
        let assignment = &mut state.assignments[idx];
        assignment.cancel_timer();
        assignment.set_grade(grade);
        self.inner.observer.notify(self, assignment, false);

        tracing::info!(
            student = %self.inner.full_name,
            assignment = %assignment.name(),
            grade,
            status = %assignment.status(),
            "Assignment graded"
        );

        state.recompute_overall();
    }

    fn schedule_auto_submit(&self, name: &str) -> TimerHandle {
        let student = Arc::downgrade(&self.inner);
        let name = name.to_string();
        timer::schedule(
            TimerKind::AutoSubmit,
            self.inner.config.auto_submit_delay(),
            move |timer_id| async move {
                if let Some(student) = Self::upgrade(&student) {
                    student.auto_submit(&name, timer_id).await;
                }
            },
        )
    }

    fn schedule_auto_grade(&self, name: &str) -> TimerHandle {
        let student = Arc::downgrade(&self.inner);
        let name = name.to_string();
        timer::schedule(
            TimerKind::AutoGrade,
            self.inner.config.auto_grade_delay(),
            move |timer_id| async move {
                if let Some(student) = Self::upgrade(&student) {
                    student.auto_grade(&name, timer_id).await;
                }
            },
        )
    }

    fn upgrade(inner: &Weak<StudentInner>) -> Option<Student> {
        inner.upgrade().map(|inner| Student { inner })
    }

    async fn auto_submit(&self, name: &str, timer_id: u64) {
        let mut state = self.inner.state.lock().await;
        let Some(idx) = state.position(name) else {
            return;
        };

        let assignment = &mut state.assignments[idx];
        if !assignment.clear_timer_if_current(timer_id) {
            tracing::trace!(
                timer_id,
                assignment = %name,
                superseded_by = ?assignment.pending_timer_kind(),
                "Stale auto-submit ignored"
            );
            return;
        }
        if !assignment.status().is_outstanding() {
            return;
        }

        tracing::debug!(
            student = %self.inner.full_name,
            assignment = %name,
            "Auto-submitting"
        );
        self.submit_locked(&mut state, idx);
    }

    async fn auto_grade(&self, name: &str, timer_id: u64) {
        let mut state = self.inner.state.lock().await;
        let Some(idx) = state.position(name) else {
            return;
        };

        let assignment = &mut state.assignments[idx];
        if !assignment.clear_timer_if_current(timer_id) {
            tracing::trace!(
                timer_id,
                assignment = %name,
                superseded_by = ?assignment.pending_timer_kind(),
                "Stale auto-grade ignored"
            );
            return;
        }
        if assignment.is_graded() {
            return;
        }

        let grade = f64::from(self.inner.grades.draw());
        self.grade_locked(&mut state, idx, grade);
    }
}
