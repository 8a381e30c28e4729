pub mod config;
pub mod coursework;
pub mod error;
pub mod notify;
pub mod roster;
pub mod shutdown;
pub mod simulation;

pub use error::{ClassroomError, Result};
