//! Notification plumbing between the engine and the outside world.
//!
//! - [`Observer`]: receives every assignment transition
//! - [`SinkObserver`]: the stock observer, formats lines with
//!   [`format_notification`] and writes them to an [`OutputSink`]
//! - [`OutputSink`]: where text lines end up (stdout, tracing, or memory)
//!
//! Roster-level lines (a student joining a class) bypass the observer and go
//! straight to the class list's sink.

pub mod observer;
pub mod sink;

pub use observer::{format_notification, Observer, SinkObserver};
pub use sink::{ConsoleSink, MemorySink, OutputSink, TracingSink};
