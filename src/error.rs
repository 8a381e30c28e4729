use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassroomError {
    #[error("Invalid student spec {0:?}, expected \"Full Name:email\"")]
    InvalidStudentSpec(String),

    #[error("Invalid grade spec {0:?}, expected \"Full Name:assignment:grade\"")]
    InvalidGradeSpec(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Roster task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClassroomError>;
