//! Domain-level constants.
//!
//! Seeded lookup identifiers and the field limits enforced on input.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role identifier (seeded)
pub const ROLE_ADMIN_ID: i32 = 1;

/// Regular user role identifier (seeded, assigned on registration)
pub const ROLE_USER_ID: i32 = 2;

/// Administrator role name
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Regular user role name
pub const ROLE_USER: &str = "ROLE_USER";

// =============================================================================
// Bug lookups
// =============================================================================

/// Status: open
pub const STATUS_OPEN: i32 = 1;

/// Status: closed (done)
pub const STATUS_CLOSED: i32 = 2;

/// Priority: urgent. Lower ids rank higher.
pub const PRIORITY_URGENT: i32 = 1;

/// Priority: important
pub const PRIORITY_IMPORTANT: i32 = 2;

/// Priorities matched by the "important" filter
pub const IMPORTANT_PRIORITIES: &[i32] = &[PRIORITY_URGENT, PRIORITY_IMPORTANT];

/// Priorities matched by the "urgent" filter
pub const URGENT_PRIORITIES: &[i32] = &[PRIORITY_URGENT];

/// Bug types filed under front-end
pub const FRONT_END_TYPES: &[i32] = &[1, 2];

/// Bug types filed under back-end
pub const BACK_END_TYPES: &[i32] = &[3, 4];

// =============================================================================
// Validation
// =============================================================================

/// Project and bug name bound (mirrored in the `validate` attributes)
pub const MAX_NAME_LENGTH: u64 = 45;

/// Plain password bounds
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 32;

/// Date placeholders treated as "no date"
pub const ZERO_DATES: &[&str] = &["", "0000-00-00", "0000-00-00 00:00:00"];

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
