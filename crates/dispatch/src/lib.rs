//! Fan-out of one post to many platforms.
//!
//! The [`Dispatcher`] validates per platform, resolves live tokens through
//! the connection manager, and publishes (or hands off to the scheduler
//! backend) concurrently. Each platform gets an independent outcome in the
//! [`DispatchReport`]; one platform failing never aborts its siblings.

pub mod dispatcher;
pub mod error;
pub mod report;
pub mod scheduler;

pub use {
    dispatcher::Dispatcher,
    error::{Error, Result},
    report::{DispatchEntry, DispatchOutcome, DispatchReport},
    scheduler::{HttpScheduler, MemoryScheduler, ScheduledPostRequest, SchedulerBackend},
};
