use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::coursework::{Assignment, AssignmentStatus, NOT_ASSIGNED};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReport {
    pub name: String,
    pub status: AssignmentStatus,
    pub grade: Option<f64>,
    pub released_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Assignment> for AssignmentReport {
    fn from(assignment: &Assignment) -> Self {
        Self {
            name: assignment.name().to_string(),
            status: assignment.status(),
            grade: assignment.grade(),
            released_at: assignment.released_at(),
            updated_at: assignment.updated_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReport {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub overall_grade: Option<f64>,
    pub assignments: Vec<AssignmentReport>,
}

impl StudentReport {
    pub fn assignment(&self, name: &str) -> Option<&AssignmentReport> {
        self.assignments.iter().find(|a| a.name == name)
    }

    /// Table cell for one assignment: status plus grade when graded.
    pub fn cell(&self, name: &str) -> String {
        match self.assignment(name) {
            Some(AssignmentReport {
                status,
                grade: Some(grade),
                ..
            }) => format!("{} ({:.0})", status, grade),
            Some(report) => report.status.to_string(),
            None => NOT_ASSIGNED.to_string(),
        }
    }
}

/// Whole-class summary printed at the end of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub students: Vec<StudentReport>,
    pub class_average: Option<f64>,
    pub outstanding: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(assignments: Vec<Assignment>) -> StudentReport {
        StudentReport {
            id: Uuid::new_v4(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            overall_grade: None,
            assignments: assignments.iter().map(AssignmentReport::from).collect(),
        }
    }

    #[test]
    fn cell_shows_status_and_grade() {
        let mut graded = Assignment::new("HW1");
        graded.set_grade(72.0);
        let report = report_with(vec![graded, Assignment::new("HW2")]);

        assert_eq!(report.cell("HW1"), "pass (72)");
        assert_eq!(report.cell("HW2"), "released");
        assert_eq!(report.cell("HW3"), NOT_ASSIGNED);
    }

    #[test]
    fn report_serializes_status_labels() {
        let mut failed = Assignment::new("HW1");
        failed.set_grade(50.0);
        let report = report_with(vec![failed]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["assignments"][0]["status"], "fail");
        assert_eq!(json["assignments"][0]["grade"], 50.0);
        assert_eq!(json["full_name"], "Ada Lovelace");
    }
}
