//! Business logic services
//!
//! Services are constructed once in `main` with the handles they need and
//! shared through `AppState`.

pub mod auth_service;
pub mod contest_service;
pub mod notification_service;
pub mod scoreboard;
pub mod submission_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use contest_service::ContestService;
pub use notification_service::NotificationService;
pub use submission_service::SubmissionService;
pub use user_service::UserService;
