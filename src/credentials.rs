//! Credential fallback sources.
//!
//! When a configuration leaves credentials unset, finalize falls back to
//! the well-known environment variables. The lookup goes through the
//! [`CredentialSource`] trait so tests can inject credentials without
//! mutating the process environment.

/// Environment variable consulted for the access key.
pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable consulted for the secret key.
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable consulted for the session token.
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Supplies fallback credentials by variable name.
pub trait CredentialSource {
    /// Returns the value for `name`, if one is available.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
