//! User request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,

    #[validate(length(max = 1000))]
    pub bio: Option<String>,

    /// ISO 3166-1 alpha-2 code
    #[validate(length(equal = 2))]
    pub country: Option<String>,

    /// Required when new_password is set
    pub current_password: Option<String>,

    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub new_password: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}
