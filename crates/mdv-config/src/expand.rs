//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Bare `$VAR` is left alone so asset URLs and titles may contain dollar
/// signs. An unset variable without a default is an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDV_TEST_ASSETS_SET", "https://cdn.example.com/");
        }
        let result = expand_env("${MDV_TEST_ASSETS_SET:-assets/}", "assets.base_url").unwrap();
        assert_eq!(result, "https://cdn.example.com/");
        unsafe {
            std::env::remove_var("MDV_TEST_ASSETS_SET");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDV_TEST_ASSETS_UNSET");
        }
        let result = expand_env("${MDV_TEST_ASSETS_UNSET:-assets/}", "assets.base_url").unwrap();
        assert_eq!(result, "assets/");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MDV_TEST_MISSING");
        }
        let err = expand_env("${MDV_TEST_MISSING}/x", "toc.title").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDV_TEST_MISSING"));
        assert!(err.to_string().contains("toc.title"));
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("Costs $5", "toc.title").unwrap();
        assert_eq!(result, "Costs $5");
    }
}
