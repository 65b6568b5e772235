use std::env;
use std::process;
use tracing::error;

/// Retrieves a required environment variable, terminating the process when it
/// is unset or empty. Credentials are checked this way at startup so no
/// partial work happens before a misconfiguration is noticed.
///
/// # Arguments
/// - `var`: The name of the environment variable.
///
/// # Returns
/// - `String`
pub fn require_env(var: &str) -> String {
    match env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            error!("Error: required environment variable {} is not set", var);
            process::exit(1);
        }
    }
}

/// Retrieves an environment variable, falling back to a default when unset.
pub fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}
