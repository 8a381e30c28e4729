use std::time::Duration;

use crate::error::{ClassroomError, Result};

/// Longest delay accepted for either auto-transition.
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

/// Timing for the automatic transitions of an assignment.
///
/// Both delays are logical: the engine only guarantees that work happens
/// before submission and submission happens before grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay between `start_working` and the automatic submission
    pub auto_submit_delay_ms: u64,
    /// Delay between submission and the automatic grade
    pub auto_grade_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_submit_delay_ms: 500,
            auto_grade_delay_ms: 500,
        }
    }
}

impl EngineConfig {
    pub fn new(auto_submit_delay_ms: u64, auto_grade_delay_ms: u64) -> Self {
        Self {
            auto_submit_delay_ms,
            auto_grade_delay_ms,
        }
    }

    pub fn with_auto_submit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.auto_submit_delay_ms = delay_ms;
        self
    }

    pub fn with_auto_grade_delay_ms(mut self, delay_ms: u64) -> Self {
        self.auto_grade_delay_ms = delay_ms;
        self
    }

    pub fn auto_submit_delay(&self) -> Duration {
        Duration::from_millis(self.auto_submit_delay_ms)
    }

    pub fn auto_grade_delay(&self) -> Duration {
        Duration::from_millis(self.auto_grade_delay_ms)
    }

    /// Upper bound on how long it takes an untouched assignment to go from
    /// `working` to graded.
    pub fn settle_time(&self) -> Duration {
        self.auto_submit_delay() + self.auto_grade_delay()
    }

    /// Check that both delays fall within [`MAX_DELAY_MS`].
    pub fn validate(&self) -> Result<()> {
        if self.auto_submit_delay_ms > MAX_DELAY_MS {
            return Err(ClassroomError::InvalidConfig(format!(
                "auto-submit delay {}ms exceeds {}ms",
                self.auto_submit_delay_ms, MAX_DELAY_MS
            )));
        }
        if self.auto_grade_delay_ms > MAX_DELAY_MS {
            return Err(ClassroomError::InvalidConfig(format!(
                "auto-grade delay {}ms exceeds {}ms",
                self.auto_grade_delay_ms, MAX_DELAY_MS
            )));
        }
        Ok(())
    }
}

/// How the simulation report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentSpec {
    pub full_name: String,
    pub email: String,
}

/// A manual grade to apply during a simulation run. The grade stays textual
/// until it reaches the engine, which ignores anything non-numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSpec {
    pub full_name: String,
    pub assignment: String,
    pub grade: String,
}

/// Everything a simulation run needs, gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    pub students: Vec<StudentSpec>,
    pub assignments: Vec<String>,
    pub work: Vec<String>,
    pub grades: Vec<GradeSpec>,
    pub remind: Option<String>,
    pub seed: Option<u64>,
    pub output: OutputFormat,
}

impl SimulationConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            ..Default::default()
        }
    }

    pub fn with_student(mut self, full_name: &str, email: &str) -> Self {
        self.students.push(StudentSpec {
            full_name: full_name.to_string(),
            email: email.to_string(),
        });
        self
    }

    pub fn with_assignment(mut self, name: &str) -> Self {
        self.assignments.push(name.to_string());
        self
    }
}

/// Parse `"Full Name:email,Other Name:email"` into student specs.
pub fn parse_students(spec: &str) -> Result<Vec<StudentSpec>> {
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }

    spec.split(',')
        .map(|entry| {
            let entry = entry.trim();
            match entry.split_once(':') {
                Some((name, email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                    Ok(StudentSpec {
                        full_name: name.trim().to_string(),
                        email: email.trim().to_string(),
                    })
                }
                _ => Err(ClassroomError::InvalidStudentSpec(entry.to_string())),
            }
        })
        .collect()
}

/// Parse a comma separated list of assignment names, skipping blanks.
pub fn parse_names(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `"Full Name:assignment:grade"`.
pub fn parse_grade_spec(spec: &str) -> Result<GradeSpec> {
    let parts: Vec<&str> = spec.splitn(3, ':').map(str::trim).collect();
    match parts.as_slice() {
        [name, assignment, grade] if !name.is_empty() && !assignment.is_empty() => {
            Ok(GradeSpec {
                full_name: name.to_string(),
                assignment: assignment.to_string(),
                grade: grade.to_string(),
            })
        }
        _ => Err(ClassroomError::InvalidGradeSpec(spec.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_default() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.auto_submit_delay_ms, 500);
        assert_eq!(cfg.auto_grade_delay_ms, 500);
        assert_eq!(cfg.settle_time(), Duration::from_millis(1000));
    }

    #[test]
    fn engine_config_builders() {
        let cfg = EngineConfig::default()
            .with_auto_submit_delay_ms(20)
            .with_auto_grade_delay_ms(30);
        assert_eq!(cfg.auto_submit_delay(), Duration::from_millis(20));
        assert_eq!(cfg.auto_grade_delay(), Duration::from_millis(30));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn engine_config_rejects_huge_delays() {
        let cfg = EngineConfig::new(MAX_DELAY_MS + 1, 10);
        assert!(matches!(
            cfg.validate(),
            Err(ClassroomError::InvalidConfig(_))
        ));

        let cfg = EngineConfig::new(10, MAX_DELAY_MS + 1);
        assert!(cfg.validate().is_err());

        assert!(EngineConfig::new(MAX_DELAY_MS, 0).validate().is_ok());
    }

    #[test]
    fn parse_students_accepts_list() {
        let students =
            parse_students("Ada Lovelace:ada@example.com, Alan Turing:alan@example.com").unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].full_name, "Ada Lovelace");
        assert_eq!(students[0].email, "ada@example.com");
        assert_eq!(students[1].full_name, "Alan Turing");
    }

    #[test]
    fn parse_students_empty_is_empty() {
        assert!(parse_students("").unwrap().is_empty());
        assert!(parse_students("   ").unwrap().is_empty());
    }

    #[test]
    fn parse_students_rejects_missing_email() {
        let err = parse_students("Ada Lovelace").unwrap_err();
        assert!(matches!(err, ClassroomError::InvalidStudentSpec(s) if s == "Ada Lovelace"));
        assert!(parse_students("Ada:").is_err());
    }

    #[test]
    fn parse_names_skips_blanks() {
        assert_eq!(parse_names("HW1, ,HW2,"), vec!["HW1", "HW2"]);
        assert!(parse_names("").is_empty());
    }

    #[test]
    fn parse_grade_spec_keeps_raw_grade() {
        let spec = parse_grade_spec("Ada Lovelace:HW1:75").unwrap();
        assert_eq!(spec.full_name, "Ada Lovelace");
        assert_eq!(spec.assignment, "HW1");
        assert_eq!(spec.grade, "75");

        let spec = parse_grade_spec("Ada Lovelace:HW1:abc").unwrap();
        assert_eq!(spec.grade, "abc");

        assert!(parse_grade_spec("Ada Lovelace:HW1").is_err());
        assert!(parse_grade_spec(":HW1:10").is_err());
    }

    #[test]
    fn simulation_config_builders() {
        let cfg = SimulationConfig::new(EngineConfig::default())
            .with_student("Ada Lovelace", "ada@example.com")
            .with_assignment("HW1");
        assert_eq!(cfg.students.len(), 1);
        assert_eq!(cfg.assignments, vec!["HW1"]);
        assert_eq!(cfg.output, OutputFormat::Table);
        assert!(cfg.seed.is_none());
    }
}
