//! Token storage.
//!
//! Reads/writes ~/.config/aidrecon/auth.json (0600 on Unix).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::ClientError;

/// Authentication credentials stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCredentials {
    /// Bearer token for the organisation store API
    pub token: String,
    /// API base the token was issued for
    pub api_base: String,
    /// Account name (for display)
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthCredentials {
    pub fn new(token: String, api_base: String) -> Self {
        Self {
            token,
            api_base,
            username: None,
        }
    }

    /// True when these credentials were issued for `api_base`.
    pub fn applies_to(&self, api_base: &str) -> bool {
        self.api_base.trim_end_matches('/') == api_base.trim_end_matches('/')
    }
}

/// Returns the path to the auth credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("aidrecon/auth.json"))
}

/// Load saved auth credentials from the default location.
/// Returns None if no credentials are saved or if the file is invalid.
pub fn load_auth() -> Option<AuthCredentials> {
    load_auth_from(&auth_file_path()?)
}

pub fn load_auth_from(path: &Path) -> Option<AuthCredentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save auth credentials to the default location.
pub fn save_auth(creds: &AuthCredentials) -> Result<(), ClientError> {
    let path = auth_file_path()
        .ok_or_else(|| ClientError::Io("could not determine config directory".into()))?;
    save_auth_to(&path, creds)
}

/// Creates the parent directory if needed. Sets 0600 permissions on Unix.
pub fn save_auth_to(path: &Path, creds: &AuthCredentials) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ClientError::Io(format!("failed to create config directory: {e}")))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| ClientError::Parse(format!("failed to serialize credentials: {e}")))?;

    std::fs::write(path, &contents)
        .map_err(|e| ClientError::Io(format!("failed to write auth file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)
            .map_err(|e| ClientError::Io(format!("failed to set file permissions: {e}")))?;
    }

    Ok(())
}

/// Delete saved auth credentials.
pub fn delete_auth() -> Result<(), ClientError> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| ClientError::Io(format!("failed to delete auth file: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields() {
        let json = r#"{"token":"tok","api_base":"https://store.example.org"}"#;
        let parsed: AuthCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "tok");
        assert!(parsed.username.is_none());
    }

    #[test]
    fn auth_file_path_is_namespaced() {
        let path = auth_file_path().unwrap();
        assert!(path.to_string_lossy().contains("aidrecon"));
        assert!(path.to_string_lossy().ends_with("auth.json"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth.json");

        let creds = AuthCredentials::new("tok123".into(), "https://store.test/".into());
        save_auth_to(&path, &creds).unwrap();
        assert_eq!(load_auth_from(&path), Some(creds.clone()));
        assert!(creds.applies_to("https://store.test"));
        assert!(!creds.applies_to("https://other.test"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_auth_from(&path), None);
    }
}
