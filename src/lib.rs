//! CodeArena - Competitive Programming Practice Platform
//!
//! This library provides the backend for the CodeArena platform: account
//! and session management with rotating refresh tokens, contest
//! registration and leaderboards, submission judging through an external
//! execution service, and preference-filtered notifications.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic, one object per domain, built in `main`
//! - **Repositories**: Database access
//! - **Models**: Domain models and DTOs
//! - **Clients**: Wire contracts of the external collaborators

pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
