use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

use crate::constants::{DEFAULT_API_URL, URL_PLACEHOLDER};

/// Unit of the `time` field stored on each slide
///
/// Both rotation entry points of the admin client scale the stored time as
/// minutes while the slide editor labels the same field as seconds. The unit
/// is therefore an explicit setting rather than an assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Slide time is a number of minutes
    Minutes,
    /// Slide time is a number of seconds
    Seconds,
}

/// What to do when a rotation is started for a board that already has one running
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrentStart {
    /// Start another session next to the running one
    Allow,
    /// Refuse to start while a session for the board is alive
    Reject,
    /// Stop the running session, then start the new one
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Launch an external program (browser, kiosk viewer) per URL
    Command,
    /// Print each URL to stdout (dry run)
    Console,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_credential_profile() -> String {
    "default".to_string()
}

fn default_duration_unit() -> DurationUnit {
    DurationUnit::Minutes
}

fn default_concurrent_start() -> ConcurrentStart {
    ConcurrentStart::Reject
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_surface_command() -> Vec<String> {
    vec!["xdg-open".to_string(), URL_PLACEHOLDER.to_string()]
}

fn default_surface_kind() -> SurfaceKind {
    SurfaceKind::Command
}

/// Presentation surface configuration (maps to [surface] section in TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct SurfaceConfig {
    /// Surface implementation (default: command)
    #[serde(default = "default_surface_kind")]
    pub kind: SurfaceKind,
    /// Program and arguments; `{url}` is replaced by the slide URL
    /// (default: ["xdg-open", "{url}"])
    #[serde(default = "default_surface_command")]
    pub command: Vec<String>,
    /// The command stays running while its window is open (a kiosk browser,
    /// not a launcher like xdg-open); when it has exited the surface counts as
    /// closed and the rotation ends
    #[serde(default)]
    pub persistent: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            kind: default_surface_kind(),
            command: default_surface_command(),
            persistent: false,
        }
    }
}

/// Client configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the boards/slides API (default: https://localhost:7289)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Credential profile name to look up the bearer token from
    /// ~/.config/slide_rotation/credentials.toml (default: "default")
    #[serde(default = "default_credential_profile")]
    pub credential_profile: String,
    /// Unit of the slide `time` field (default: minutes)
    #[serde(default = "default_duration_unit")]
    pub duration_unit: DurationUnit,
    /// Policy for a second rotation on the same board (default: reject)
    #[serde(default = "default_concurrent_start")]
    pub concurrent_start: ConcurrentStart,
    /// Accept self-signed TLS certificates (development API servers)
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub surface: SurfaceConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            credential_profile: default_credential_profile(),
            duration_unit: default_duration_unit(),
            concurrent_start: default_concurrent_start(),
            accept_invalid_certs: false,
            request_timeout_secs: default_request_timeout_secs(),
            surface: SurfaceConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings that serde cannot check on its own
    ///
    /// The API URL must be an absolute http(s) URL, the request timeout must be
    /// non-zero and a command surface needs a program to run.
    pub fn validate(&self) -> Result<(), String> {
        let api = url::Url::parse(&self.api_url)
            .map_err(|e| format!("Invalid api_url '{}': {}", self.api_url, e))?;
        if api.scheme() != "http" && api.scheme() != "https" {
            return Err(format!(
                "api_url '{}' must use http or https",
                self.api_url
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        if self.surface.kind == SurfaceKind::Command {
            if self.surface.command.is_empty() {
                return Err(
                    "surface kind is 'command' but [surface] command is empty".to_string(),
                );
            }
            if !self.surface.command.iter().any(|a| a.contains(URL_PLACEHOLDER)) {
                return Err(format!(
                    "surface command must contain the {} placeholder",
                    URL_PLACEHOLDER
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.credential_profile, "default");
        assert_eq!(config.duration_unit, DurationUnit::Minutes);
        assert_eq!(config.concurrent_start, ConcurrentStart::Reject);
        assert_eq!(config.surface.kind, SurfaceKind::Command);
        assert!(!config.surface.persistent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_url = "http://boards.internal:8080"
            credential_profile = "kiosk"
            duration_unit = "seconds"
            concurrent_start = "replace"
            accept_invalid_certs = true

            [surface]
            kind = "command"
            command = ["chromium", "--kiosk", "{url}"]
            persistent = true
            "#,
        )
        .unwrap();
        assert_eq!(config.duration_unit, DurationUnit::Seconds);
        assert_eq!(config.concurrent_start, ConcurrentStart::Replace);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.surface.command[0], "chromium");
        assert!(config.surface.persistent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = ClientConfig::default();
        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.surface.command = vec!["firefox".to_string()];
        assert!(config.validate().unwrap_err().contains("{url}"));

        let mut config = ClientConfig::default();
        config.surface.command.clear();
        assert!(config.validate().is_err());

        // console surface ignores the command
        config.surface.kind = SurfaceKind::Console;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_duration_unit_fails_to_parse() {
        let result: Result<ClientConfig, _> = toml::from_str(r#"duration_unit = "hours""#);
        assert!(result.is_err());
    }
}
