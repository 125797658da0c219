/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can review intake responses and edit news/blog content
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// FORM LIMITS
// =============================================================================

pub const MAX_NAME_LENGTH: u64 = 100;
pub const MAX_COMPANY_LENGTH: u64 = 200;
pub const MAX_SHORT_TEXT_LENGTH: u64 = 100;
pub const MAX_LONG_TEXT_LENGTH: u64 = 5000;
pub const MAX_PHONE_LENGTH: u64 = 20;
