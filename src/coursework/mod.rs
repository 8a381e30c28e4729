pub mod assignment;
pub mod grading;
pub mod timer;

pub use assignment::{Assignment, AssignmentStatus, NOT_ASSIGNED, PASS_THRESHOLD};
pub use grading::{FixedGrade, GradeSource, RandomGrades, ScriptedGrades, SeededGrades};
pub use timer::{TimerHandle, TimerKind};
