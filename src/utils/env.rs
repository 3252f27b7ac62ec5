/// Read an environment variable, preferring the `ORGAUTH_` prefixed form.
///
/// `ORGAUTH_{key}` wins over `{key}`, so deployments can namespace settings
/// without breaking the conventional names (`PORT`, `JWT_SECRET`, ...).
///
/// ```rust
/// use orgauth::utils::get_env_with_prefix;
///
/// // Checks ORGAUTH_JWT_EXPIRES_IN first, then JWT_EXPIRES_IN
/// let ttl = get_env_with_prefix("JWT_EXPIRES_IN");
/// # let _ = ttl;
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("ORGAUTH_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Interpret a flag value the way operators usually write them.
pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        unsafe {
            std::env::set_var("ORGAUTH_ENV_TEST_VAR", "prefixed_value");
            std::env::set_var("ENV_TEST_VAR", "unprefixed_value");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("prefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ORGAUTH_ENV_TEST_VAR");
        }
        assert_eq!(
            get_env_with_prefix("ENV_TEST_VAR"),
            Some("unprefixed_value".to_string())
        );
        unsafe {
            std::env::remove_var("ENV_TEST_VAR");
        }

        assert_eq!(get_env_with_prefix("ENV_TEST_NON_EXISTENT"), None);
    }

    #[test]
    fn test_parse_bool_flag() {
        assert_eq!(parse_bool_flag("true"), Some(true));
        assert_eq!(parse_bool_flag(" YES "), Some(true));
        assert_eq!(parse_bool_flag("0"), Some(false));
        assert_eq!(parse_bool_flag("off"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }
}
