//! Students and the rosters they are enrolled in.
//!
//! - [`Student`]: owns assignments and drives each one through
//!   `released → working → submitted → pass | fail`, with timed
//!   auto-submit and auto-grade
//! - [`ClassList`]: fans operations out across a roster (parallel release,
//!   outstanding-work queries, reminders)
//! - [`report`]: serializable snapshots used for printing results

pub mod class_list;
pub mod report;
pub mod student;

pub use class_list::{ClassList, StudentRef};
pub use report::{AssignmentReport, ClassReport, StudentReport};
pub use student::Student;
