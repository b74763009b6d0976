use std::{fs, io, path::Path};

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";
pub const DEFAULT_DASHBOARD_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub dashboard_route: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            dashboard_route: DEFAULT_DASHBOARD_ROUTE.into(),
            request_timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = env("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = env("APP__DASHBOARD_ROUTE") {
            self.dashboard_route = v;
        }

        if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(parsed) => self.request_timeout_secs = parsed,
                Err(err) => warn!(value = %v, error = %err, "config: ignoring invalid request timeout"),
            }
        }
    }
}

/// Loads `client.toml` from the working directory, then applies environment overrides.
pub fn load_settings() -> Result<ClientSettings, ClientError> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, ClientError> {
    let config_error = |message: String| ClientError::Config {
        path: path.display().to_string(),
        message,
    };

    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => {
            toml::from_str::<ClientSettings>(&raw).map_err(|err| config_error(err.to_string()))?
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => ClientSettings::default(),
        Err(err) => return Err(config_error(err.to_string())),
    };

    settings.apply_env(env);
    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

/// Trims the url, drops trailing slashes and checks that request paths can be
/// appended to it. A blank value falls back to the default base url.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(ClientSettings::default().api_base_url);
    }

    let trimmed = raw.trim_end_matches('/');
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) url".to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_config(name: &str, contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("employee_client_{name}_{suffix}.toml"));
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn strips_trailing_slashes_from_base_url() {
        assert_eq!(
            normalize_base_url(" http://api.local:9000/v1/ ").expect("url"),
            "http://api.local:9000/v1"
        );
    }

    #[test]
    fn blank_base_url_falls_back_to_default() {
        assert_eq!(
            normalize_base_url("  ").expect("url"),
            ClientSettings::default().api_base_url
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            normalize_base_url("localhost:8080"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let path = env::temp_dir().join("employee_client_config_does_not_exist.toml");
        let settings = load_settings_from(&path, no_env).expect("settings");
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn file_values_are_overridden_by_environment() {
        let path = temp_config(
            "overrides",
            "api_base_url = \"http://from-file:1234/\"\nrequest_timeout_secs = 5\n",
        );
        let vars = HashMap::from([
            ("APP__API_BASE_URL", "https://from-env.example/api/"),
            ("APP__DASHBOARD_ROUTE", "/home"),
        ]);

        let settings =
            load_settings_from(&path, |key| vars.get(key).map(|v| v.to_string())).expect("settings");
        fs::remove_file(&path).expect("cleanup");

        assert_eq!(settings.api_base_url, "https://from-env.example/api");
        assert_eq!(settings.dashboard_route, "/home");
        assert_eq!(settings.request_timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_override_is_ignored() {
        let path = env::temp_dir().join("employee_client_config_absent_timeout.toml");
        let settings = load_settings_from(&path, |key| {
            (key == "APP__REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .expect("settings");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = temp_config("malformed", "api_base_url = [");
        let result = load_settings_from(&path, no_env);
        fs::remove_file(&path).expect("cleanup");
        assert!(matches!(result, Err(ClientError::Config { .. })));
    }
}
