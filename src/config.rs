//! Invocation context and client settings resolved from the environment.
//!
//! Lookups go through an injected `Fn(&str) -> Option<String>` so tests
//! never touch the real process environment.

use url::Url;

use crate::error::CliError;

pub const TOKEN_VAR: &str = "TOKEN";
pub const PROJECT_VAR: &str = "PROJECT_ID";
pub const SPRINT_VAR: &str = "SPRINT_ID";
pub const BASE_URL_VAR: &str = "EVERYQA_BASE_URL";
pub const LEGACY_EXIT_VAR: &str = "EVERYQA_LEGACY_EXIT";
pub const NO_COLOR_VAR: &str = "NO_COLOR";

pub const DEFAULT_BASE_URL: &str = "https://api.everyqa.io/v1/";

/// Environment lookup used throughout startup.
pub type EnvLookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Process-wide immutable credentials and target identifiers.
#[derive(Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub token: String,
    pub project_id: String,
    pub sprint_id: String,
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("token", &"<redacted>")
            .field("project_id", &self.project_id)
            .field("sprint_id", &self.sprint_id)
            .finish()
    }
}

impl InvocationContext {
    /// Resolve `TOKEN`, `PROJECT_ID` and `SPRINT_ID` in that order,
    /// failing on the first one that is absent or blank.
    pub fn from_env(env: &EnvLookup<'_>) -> Result<Self, CliError> {
        Ok(Self {
            token: require_env(env, TOKEN_VAR)?,
            project_id: require_env(env, PROJECT_VAR)?,
            sprint_id: require_env(env, SPRINT_VAR)?,
        })
    }
}

fn require_env(env: &EnvLookup<'_>, name: &str) -> Result<String, CliError> {
    match env(name).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CliError::Config(format!("{name} env is not set"))),
    }
}

/// Settings for constructing the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: Url,
}

impl ClientSettings {
    pub fn from_env(env: &EnvLookup<'_>) -> Result<Self, CliError> {
        let raw = env(BASE_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            base_url: parse_base_url(&raw)?,
        })
    }
}

/// Parse an http(s) base URL, forcing a trailing slash on the path.
pub fn parse_base_url(raw: &str) -> Result<Url, CliError> {
    let mut url = Url::parse(raw)
        .map_err(|e| CliError::Config(format!("{BASE_URL_VAR} is invalid ('{raw}'): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::Config(format!(
            "{BASE_URL_VAR} must be an http or https url, got '{raw}'"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Whether failures should still exit with status 0.
pub fn legacy_exit(env: &EnvLookup<'_>) -> bool {
    env(LEGACY_EXIT_VAR)
        .map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn context_from_complete_env() {
        let env = env_of(&[("TOKEN", "t"), ("PROJECT_ID", "p1"), ("SPRINT_ID", " s1 ")]);
        let ctx = InvocationContext::from_env(&env).unwrap();
        assert_eq!(ctx.token, "t");
        assert_eq!(ctx.project_id, "p1");
        assert_eq!(ctx.sprint_id, "s1");
    }

    #[test]
    fn missing_variable_is_named() {
        let env = env_of(&[("TOKEN", "t"), ("SPRINT_ID", "s1")]);
        let err = InvocationContext::from_env(&env).unwrap_err();
        assert_eq!(err.to_string(), "PROJECT_ID env is not set");
    }

    #[test]
    fn blank_variable_counts_as_missing() {
        let env = env_of(&[("TOKEN", "  "), ("PROJECT_ID", "p"), ("SPRINT_ID", "s")]);
        let err = InvocationContext::from_env(&env).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("TOKEN"));
    }

    #[test]
    fn debug_hides_token() {
        let env = env_of(&[("TOKEN", "hunter2"), ("PROJECT_ID", "p"), ("SPRINT_ID", "s")]);
        let ctx = InvocationContext::from_env(&env).unwrap();
        assert!(!format!("{ctx:?}").contains("hunter2"));
    }

    #[test]
    fn default_base_url() {
        let settings = ClientSettings::from_env(&env_of(&[])).unwrap();
        assert_eq!(settings.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_override_gets_trailing_slash() {
        let env = env_of(&[("EVERYQA_BASE_URL", "http://localhost:8080/api")]);
        let settings = ClientSettings::from_env(&env).unwrap();
        assert_eq!(settings.base_url.as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn base_url_rejects_garbage_and_other_schemes() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://example.com/").is_err());
    }

    #[test]
    fn legacy_exit_flag() {
        assert!(legacy_exit(&env_of(&[("EVERYQA_LEGACY_EXIT", "1")])));
        assert!(legacy_exit(&env_of(&[("EVERYQA_LEGACY_EXIT", "True")])));
        assert!(!legacy_exit(&env_of(&[("EVERYQA_LEGACY_EXIT", "0")])));
        assert!(!legacy_exit(&env_of(&[])));
    }
}
