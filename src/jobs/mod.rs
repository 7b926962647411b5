//! Scheduled background jobs

pub mod sweeper;

pub use sweeper::SweepScheduler;
