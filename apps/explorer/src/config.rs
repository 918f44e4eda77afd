use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use client_core::{parse_base_url, ClientOptions, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    /// `0` disables the per-request timeout.
    pub request_timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 10,
            user_agent: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

impl Settings {
    fn merge_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.user_agent {
            self.user_agent = Some(v);
        }
        Ok(())
    }

    fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("EXPLORER_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(err) => warn!(value = %v, %err, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(v) = lookup("APP__USER_AGENT") {
            self.user_agent = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.api_base_url)?;
        Ok(())
    }

    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            base_url: self.api_base_url.clone(),
            request_timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

/// Defaults, then the TOML file, then environment variables.
///
/// An explicit `config_path` must exist; the default `explorer.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            settings
                .merge_file(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                settings
                    .merge_file(&raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    settings.merge_env(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        settings
            .merge_file(
                r#"
api_base_url = "http://localhost:8080/api"
request_timeout_secs = 3
"#,
            )
            .expect("merge");

        assert_eq!(settings.api_base_url, "http://localhost:8080/api");
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.user_agent, None);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut settings = Settings::default();
        assert!(settings.merge_file("page_size = 20").is_err());
    }

    #[test]
    fn prefixed_env_wins_over_short_alias() {
        let mut settings = Settings::default();
        settings.merge_env(env_from(&[
            ("EXPLORER_API_URL", "http://short.example/api"),
            ("APP__API_BASE_URL", "http://prefixed.example/api"),
            ("APP__USER_AGENT", "explorer-tests"),
        ]));

        assert_eq!(settings.api_base_url, "http://prefixed.example/api");
        assert_eq!(settings.user_agent.as_deref(), Some("explorer-tests"));
    }

    #[test]
    fn invalid_timeout_env_is_ignored() {
        let mut settings = Settings::default();
        settings.merge_env(env_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]));
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[test]
    fn zero_timeout_disables_request_timeout() {
        let settings = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.client_options().request_timeout, None);
        assert_eq!(
            Settings::default().client_options().request_timeout,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn validate_rejects_malformed_base_url() {
        let settings = Settings {
            api_base_url: "rickandmortyapi.com/api".into(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("explorer_config_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join("explorer.toml");
        fs::write(&path, "user_agent = \"from-file\"\n").expect("write config");

        let settings = load_settings(Some(&path)).expect("load");
        assert_eq!(settings.user_agent.as_deref(), Some("from-file"));

        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn missing_explicit_config_path_fails() {
        let path = env::temp_dir().join("explorer_config_test_missing/explorer.toml");
        let err = load_settings(Some(&path)).expect_err("must fail");
        assert!(err.to_string().contains("failed to read config file"));
    }
}
