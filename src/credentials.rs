use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::TOKEN_ENV_VAR;

/// Credentials file structure
///
/// Format:
/// ```toml
/// [api.profile_name]
/// token = "bearer_token_issued_by_the_identity_service"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub api: HashMap<String, TokenProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenProfile {
    pub token: String,
    /// User id recorded by the identity service, informational only
    pub user_id: Option<String>,
}

/// Get the default credentials file path: ~/.config/slide_rotation/credentials.toml
pub fn get_credentials_path() -> Result<PathBuf, String> {
    let home = std::env::var("HOME")
        .map_err(|_| "HOME environment variable not set".to_string())?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("slide_rotation")
        .join("credentials.toml"))
}

/// Load credentials from an explicit path
/// Returns None if the file doesn't exist
pub fn load_credentials_from(
    creds_path: &Path,
) -> Result<Option<Credentials>, Box<dyn std::error::Error + Send + Sync>> {
    if !creds_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(creds_path)?;
    let credentials: Credentials = toml::from_str(&content)?;

    Ok(Some(credentials))
}

/// Load credentials from the default location
/// Returns None if the file doesn't exist
pub fn load_credentials() -> Result<Option<Credentials>, Box<dyn std::error::Error + Send + Sync>> {
    load_credentials_from(&get_credentials_path()?)
}

/// Get the bearer token for a profile
pub fn get_token(credentials: &Option<Credentials>, profile: &str) -> Result<String, String> {
    match credentials {
        Some(creds) => creds
            .api
            .get(profile)
            .map(|p| p.token.clone())
            .ok_or_else(|| {
                format!(
                    "Credential profile '[api.{}]' not found in credentials file",
                    profile
                )
            }),
        None => Err(format!(
            "Credentials file not found. Expected at: {}",
            get_credentials_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|e| e)
        )),
    }
}

/// Resolve the token to send, preferring the environment override
pub fn resolve_token(credentials: &Option<Credentials>, profile: &str) -> Result<String, String> {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => get_token(credentials, profile),
    }
}
