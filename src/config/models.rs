use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "EQTUTOR_CONFIG";

/// Secondary environment variable consulted for the API key.
const FALLBACK_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Model used for structured problem and feedback generation
    pub text_model: String,
    /// Model used for illustration generation
    pub image_model: String,
    pub api_base: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        TutorConfig {
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key_env: "API_KEY".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl TutorConfig {
    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TutorConfig>(content)
    }

    /// Resolve the API key from the environment.
    /// An absent key is not an error here; the model call will fail instead.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(
            std::env::var(&self.api_key_env).ok(),
            std::env::var(FALLBACK_KEY_ENV).ok(),
        )
    }
}

/// First non-blank key wins
fn resolve_api_key(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .find(|key| !key.trim().is_empty())
}

fn get_config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/eqtutor");
            dir.push("eqtutor.toml");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("eqtutor");
            dir.push("eqtutor.toml");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".config/eqtutor");
            dir.push("eqtutor.toml");
            return dir;
        }
    }

    // Fallback
    PathBuf::from("eqtutor.toml")
}

fn load_config_internal() -> TutorConfig {
    let config_path = get_config_path();

    match fs::read_to_string(&config_path) {
        Ok(content) => match TutorConfig::from_toml_str(&content) {
            Ok(config) => {
                tracing::info!(path = %config_path.display(), "Loaded tutor config");
                return config;
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
            }
        },
        Err(_) => {
            tracing::info!(path = %config_path.display(), "No config file, using defaults");
        }
    }

    TutorConfig::default()
}

lazy_static! {
    static ref TUTOR_CONFIG: TutorConfig = load_config_internal();
}

/// Get the cached configuration (loaded once at startup)
pub fn get_config() -> &'static TutorConfig {
    &TUTOR_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TutorConfig::from_toml_str(r#"bind_addr = "0.0.0.0:8080""#).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.text_model, "gemini-3-flash-preview");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn test_full_toml() {
        let config = TutorConfig::from_toml_str(
            r#"
            text_model = "text-x"
            image_model = "image-y"
            api_base = "http://localhost:9999"
            api_key_env = "MY_KEY"
            bind_addr = "127.0.0.1:4000"
            request_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.text_model, "text-x");
        assert_eq!(config.api_base, "http://localhost:9999");
        assert_eq!(config.api_key_env, "MY_KEY");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_api_key_from_configured_env() {
        let config = TutorConfig {
            api_key_env: "EQTUTOR_TEST_CONFIG_PRIMARY_KEY".to_string(),
            ..TutorConfig::default()
        };
        std::env::set_var("EQTUTOR_TEST_CONFIG_PRIMARY_KEY", "primary-key");
        assert_eq!(config.api_key().as_deref(), Some("primary-key"));
    }

    #[test]
    fn test_resolve_api_key_prefers_primary() {
        let key = resolve_api_key(Some("a".to_string()), Some("b".to_string()));
        assert_eq!(key.as_deref(), Some("a"));
    }

    #[test]
    fn test_resolve_api_key_falls_back() {
        assert_eq!(
            resolve_api_key(None, Some("gemini".to_string())).as_deref(),
            Some("gemini")
        );
        // A blank primary does not shadow the fallback
        assert_eq!(
            resolve_api_key(Some("  ".to_string()), Some("gemini".to_string())).as_deref(),
            Some("gemini")
        );
    }

    #[test]
    fn test_blank_key_is_absent() {
        assert!(resolve_api_key(Some(String::new()), None).is_none());
        assert!(resolve_api_key(Some(" \t".to_string()), Some("".to_string())).is_none());
        assert!(resolve_api_key(None, None).is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(TutorConfig::from_toml_str("request_timeout_secs = \"soon\"").is_err());
    }
}
