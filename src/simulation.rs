use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SimulationConfig;
use crate::coursework::grading::parse_grade;
use crate::coursework::{GradeSource, RandomGrades, SeededGrades};
use crate::error::{ClassroomError, Result};
use crate::notify::{Observer, OutputSink};
use crate::roster::{ClassList, ClassReport, Student};

/// Runs one class through a scripted term.
pub struct Simulation {
    config: SimulationConfig,
    class_list: ClassList,
    observer: Arc<dyn Observer>,
    grades: Arc<dyn GradeSource>,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        observer: Arc<dyn Observer>,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        config.engine.validate()?;

        let grades: Arc<dyn GradeSource> = match config.seed {
            Some(seed) => Arc::new(SeededGrades::new(seed)),
            None => Arc::new(RandomGrades),
        };

        Ok(Self {
            class_list: ClassList::with_sink(observer.clone(), sink),
            config,
            observer,
            grades,
        })
    }

    /// Replace the grade source chosen from the seed.
    pub fn with_grade_source(mut self, grades: Arc<dyn GradeSource>) -> Self {
        self.grades = grades;
        self
    }

    pub fn class_list(&self) -> &ClassList {
        &self.class_list
    }

    /// Run the term and report on the class.
    ///
    /// Steps, in order:
    /// 1. Enrol every configured student
    /// 2. Release all assignments to everyone in parallel
    /// 3. Start every student working on the `work` assignments
    /// 4. Apply manual grades (non-numeric grades are skipped)
    /// 5. Send the final reminder, if configured
    /// 6. Wait for the auto-submit and auto-grade timers to settle
    ///
    /// Cancelling `shutdown` cuts step 6 short and cancels pending timers.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<ClassReport> {
        for spec in &self.config.students {
            let student = Student::with_engine(
                spec.full_name.clone(),
                spec.email.clone(),
                self.observer.clone(),
                self.config.engine,
                self.grades.clone(),
            );
            self.class_list.add_student(student).await;
        }

        self.class_list
            .release_assignments_parallel(&self.config.assignments)
            .await?;

        for name in &self.config.work {
            for student in self.class_list.students().await {
                student.start_working(name).await;
            }
        }

        for spec in &self.config.grades {
            let student = self
                .class_list
                .find_student_by_name(&spec.full_name)
                .await
                .ok_or_else(|| ClassroomError::StudentNotFound(spec.full_name.clone()))?;

            let grade = parse_grade(&spec.grade);
            if grade.is_none() {
                tracing::warn!(
                    student = %spec.full_name,
                    assignment = %spec.assignment,
                    grade = %spec.grade,
                    "Ignoring non-numeric grade"
                );
            }
            student.update_assignment_status(&spec.assignment, grade).await;
        }

        if let Some(name) = &self.config.remind {
            let reminded = self.class_list.send_reminder(name).await;
            tracing::info!(assignment = %name, students = ?reminded, "Final reminders sent");
        }

        self.settle(&shutdown).await;
        Ok(self.class_list.report().await)
    }

    /// Wait long enough for any queued auto-submit and its auto-grade to
    /// finish, unless shutdown is requested first.
    async fn settle(&self, shutdown: &CancellationToken) {
        // One extra millisecond so timers due exactly at the deadline run first.
        let wait = self.config.engine.settle_time() + std::time::Duration::from_millis(1);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                tracing::debug!(wait_ms = wait.as_millis(), "Simulation settled");
            }
            _ = shutdown.cancelled() => {
                tracing::info!("Simulation interrupted, cancelling pending timers");
                self.class_list.cancel_pending_timers().await;
            }
        }
    }
}
