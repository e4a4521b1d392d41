// =============================================================================
// IDENTITY PROVIDERS
// =============================================================================

/// Identity provider for email + password accounts
pub const PROVIDER_EMAIL_PASSWORD: &str = "EmailPassword";

/// Identity provider for phone one-time-password logins
pub const PROVIDER_PHONE_OTP: &str = "PhoneOTP";

/// Domain of the placeholder email given to phone-only users
pub const PHONE_PLACEHOLDER_DOMAIN: &str = "phone.local";

// =============================================================================
// IDENTITY METADATA KEYS
// =============================================================================

pub const META_PASSWORD_HASH: &str = "passwordHash";
pub const META_EMAIL_VERIFIED: &str = "emailVerified";
pub const META_REGISTERED_AT: &str = "registeredAt";
pub const META_LAST_LOGIN_AT: &str = "lastLoginAt";
pub const META_PHONE: &str = "phone";
pub const META_PHONE_VERIFIED: &str = "phoneVerified";

// =============================================================================
// FILES
// =============================================================================

/// Maximum multipart upload size accepted by the files endpoint
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

// =============================================================================
// ROLES
// =============================================================================

/// Role carried by tokens of trusted backend callers (sign-in frontends that
/// have already verified a phone number or OAuth profile)
pub const ROLE_SERVICE: &str = "service";

/// Prefix under which a user's files are stored
pub const USER_FILES_PREFIX: &str = "users";
