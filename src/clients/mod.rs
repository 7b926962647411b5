//! HTTP and SMTP clients for external collaborator services
//!
//! Judging and code analysis live in separate services; this module only
//! speaks their wire contracts. Email goes out over SMTP.

pub mod analysis;
pub mod email;
pub mod execution;

pub use analysis::AnalysisClient;
pub use email::{EmailTransport, SmtpMailer};
pub use execution::ExecutionClient;
