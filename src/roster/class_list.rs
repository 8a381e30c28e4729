use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinSet;

use crate::error::Result;
use crate::notify::{Observer, OutputSink, TracingSink};
use crate::roster::report::ClassReport;
use crate::roster::Student;

/// How to pick students to remove from a roster.
#[derive(Debug, Clone, Copy)]
pub enum StudentRef<'a> {
    Student(&'a Student),
    Name(&'a str),
}

impl StudentRef<'_> {
    fn full_name(&self) -> &str {
        match self {
            StudentRef::Student(student) => student.full_name(),
            StudentRef::Name(name) => *name,
        }
    }
}

impl<'a> From<&'a Student> for StudentRef<'a> {
    fn from(student: &'a Student) -> Self {
        StudentRef::Student(student)
    }
}

impl<'a> From<&'a str> for StudentRef<'a> {
    fn from(name: &'a str) -> Self {
        StudentRef::Name(name)
    }
}

impl<'a> From<&'a String> for StudentRef<'a> {
    fn from(name: &'a String) -> Self {
        StudentRef::Name(name)
    }
}

/// An ordered roster of students with class-wide operations.
pub struct ClassList {
    students: RwLock<Vec<Student>>,
    observer: Arc<dyn Observer>,
    sink: Arc<dyn OutputSink>,
}

impl std::fmt::Debug for ClassList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassList").finish_non_exhaustive()
    }
}

impl ClassList {
    /// Roster whose join messages go to the tracing log.
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self::with_sink(observer, Arc::new(TracingSink))
    }

    pub fn with_sink(observer: Arc<dyn Observer>, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            students: RwLock::new(Vec::new()),
            observer,
            sink,
        }
    }

    /// Enrol a student. Returns false if this student is already on the roster.
    pub async fn add_student(&self, student: Student) -> bool {
        let mut students = self.students.write().await;
        if students.contains(&student) {
            return false;
        }

        tracing::info!(student = %student.full_name(), id = %student.id(), "Student enrolled");
        self.sink.emit(&format!(
            "{} has been added to the classlist.",
            student.full_name()
        ));
        students.push(student);
        true
    }

    /// Remove every student whose full name matches. Returns how many were
    /// removed.
    pub async fn remove_student<'a>(&self, target: impl Into<StudentRef<'a>>) -> usize {
        let target = target.into();
        let full_name = target.full_name();

        let mut students = self.students.write().await;
        let before = students.len();
        students.retain(|s| s.full_name() != full_name);
        let removed = before - students.len();

        if removed > 0 {
            tracing::info!(student = %full_name, removed, "Student removed");
        }
        removed
    }

    pub async fn find_student_by_name(&self, full_name: &str) -> Option<Student> {
        self.students
            .read()
            .await
            .iter()
            .find(|s| s.full_name() == full_name)
            .cloned()
    }

    /// Full names of students with outstanding work: on `name` if given,
    /// otherwise on any assignment. Students who were never given the
    /// assignment (or any assignment) are not listed.
    pub async fn find_outstanding_assignments(&self, name: Option<&str>) -> Vec<String> {
        self.outstanding_students(name)
            .await
            .iter()
            .map(|s| s.full_name().to_string())
            .collect()
    }

    /// Release every named assignment to every student, one task per
    /// student and assignment, and wait for all of them.
    pub async fn release_assignments_parallel<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let students = self.students().await;
        let mut tasks = JoinSet::new();

        for name in names {
            for student in &students {
                let student = student.clone();
                let name = name.as_ref().to_string();
                tasks.spawn(async move {
                    student.update_assignment_status(&name, None).await;
                });
            }
        }

        tracing::debug!(
            assignments = names.len(),
            students = students.len(),
            tasks = tasks.len(),
            "Releasing assignments"
        );

        let mut failure = None;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Release task failed");
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Push every student with `name` outstanding through a final reminder
    /// and into submission. Returns the names of the students reminded.
    pub async fn send_reminder(&self, name: &str) -> Vec<String> {
        let mut reminded = Vec::new();
        for student in self.outstanding_students(Some(name)).await {
            if student
                .send_final_reminder(name, self.observer.as_ref())
                .await
            {
                reminded.push(student.full_name().to_string());
            }
        }

        tracing::info!(assignment = %name, reminded = reminded.len(), "Reminder sent");
        reminded
    }

    /// Snapshot of the roster in enrolment order.
    pub async fn students(&self) -> Vec<Student> {
        self.students.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.students.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.students.read().await.is_empty()
    }

    /// Mean of the students' overall grades, ignoring students with no
    /// graded work.
    pub async fn class_average(&self) -> Option<f64> {
        let mut grades = Vec::new();
        for student in self.students().await {
            if let Some(grade) = student.grade().await {
                grades.push(grade);
            }
        }

        if grades.is_empty() {
            None
        } else {
            Some(grades.iter().sum::<f64>() / grades.len() as f64)
        }
    }

    pub async fn report(&self) -> ClassReport {
        let mut students = Vec::new();
        for student in self.students().await {
            students.push(student.report().await);
        }

        ClassReport {
            students,
            class_average: self.class_average().await,
            outstanding: self.find_outstanding_assignments(None).await,
        }
    }

    /// Cancel queued auto-transitions for the whole roster.
    pub async fn cancel_pending_timers(&self) {
        for student in self.students().await {
            student.cancel_pending_timers().await;
        }
    }

    async fn outstanding_students(&self, name: Option<&str>) -> Vec<Student> {
        let mut outstanding = Vec::new();
        for student in self.students().await {
            if student.has_outstanding(name).await {
                outstanding.push(student);
            }
        }
        outstanding
    }
}
