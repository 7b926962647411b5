//! Application-wide constants, grouped by concern

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default access token expiry in minutes
pub const DEFAULT_ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Default refresh token expiry in days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Default expiry for email verification tokens in hours
pub const DEFAULT_VERIFICATION_TOKEN_EXPIRY_HOURS: i64 = 48;

/// Default expiry for password reset tokens in minutes
pub const DEFAULT_RESET_TOKEN_EXPIRY_MINUTES: i64 = 30;

/// Length of opaque refresh/verification tokens before hashing
pub const OPAQUE_TOKEN_LENGTH: usize = 64;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Username minimum length
pub const MIN_USERNAME_LENGTH: u64 = 3;

/// Username maximum length
pub const MAX_USERNAME_LENGTH: u64 = 32;

// =============================================================================
// CONTEST DEFAULTS
// =============================================================================

/// Maximum contest title length
pub const MAX_CONTEST_TITLE_LENGTH: u64 = 200;

/// Maximum contest description length
pub const MAX_CONTEST_DESCRIPTION_LENGTH: u64 = 10_000;

/// Maximum source code size in bytes accepted per submission
pub const MAX_SOURCE_CODE_LENGTH: u64 = 65_536;

/// Default cap on submissions per participant per problem
pub const DEFAULT_MAX_SUBMISSIONS_PER_PROBLEM: i32 = 50;

/// Default points awarded for a solved problem
pub const DEFAULT_POINTS_PER_PROBLEM: i32 = 100;

/// Default penalty in minutes per wrong attempt before the first accept
pub const DEFAULT_PENALTY_PER_WRONG_MINUTES: i32 = 20;

/// Default leaderboard page size when no limit is given
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 100;

// =============================================================================
// NOTIFICATION DEFAULTS
// =============================================================================

/// Default notification retention before the sweep removes read rows, in days
pub const DEFAULT_NOTIFICATION_RETENTION_DAYS: i64 = 90;

// =============================================================================
// SCHEDULED JOBS
// =============================================================================

/// Default cron schedule for the expiry sweep (every 15 minutes)
pub const DEFAULT_SWEEP_SCHEDULE: &str = "0 */15 * * * *";

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers accepted by the execution service
pub mod languages {
    pub const CPP: &str = "cpp";
    pub const JAVA: &str = "java";
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const GO: &str = "go";
    pub const RUST: &str = "rust";

    pub const ALL: &[&str] = &[CPP, JAVA, PYTHON, JAVASCRIPT, GO, RUST];
}

// =============================================================================
// USER ROLES
// =============================================================================

/// Role identifiers
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const ORGANIZER: &str = "organizer";
    pub const PARTICIPANT: &str = "participant";
}

// =============================================================================
// RATE LIMITS
// =============================================================================

/// Rate limit windows and budgets per path bucket
pub mod rate_limits {
    /// Auth endpoints: stricter to slow down credential stuffing
    pub const AUTH_MAX_REQUESTS: i64 = 20;
    pub const AUTH_WINDOW_SECS: i64 = 60;

    /// Submission endpoints: judging is expensive
    pub const SUBMISSION_MAX_REQUESTS: i64 = 30;
    pub const SUBMISSION_WINDOW_SECS: i64 = 60;

    /// Everything else
    pub const GENERAL_MAX_REQUESTS: i64 = 300;
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}
