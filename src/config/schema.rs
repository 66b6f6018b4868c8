/// Configuration schema and defaults for plotwise.
///
/// Defines the TOML-serializable configuration structure with the
/// sections `[backend]`, `[ui]` and `[export]`. Every field has a
/// built-in default; users only set the values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level plotwise configuration.
///
/// Maps directly to the `~/.plotwise/config.toml` and `.plotwise.toml`
/// file schemas. All sections and fields are optional; missing values
/// fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotwiseConfig {
    pub backend: BackendConfig,
    pub ui: UiConfig,
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Analysis backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the analysis API.
    /// Can also be set via `PLOTWISE_BACKEND_URL`.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [ui]
// ---------------------------------------------------------------------------

/// Embedded web UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Address the embedded web server binds to.
    pub listen_addr: String,
    /// Open the default browser once the server is listening.
    pub open_browser: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7878".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

/// Export defaults for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default file format: `"csv"` or `"json"`.
    pub format: String,
    /// Directory exported files are written into.
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "csv".to_string(),
            dir: ".".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl PlotwiseConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `plotwise config init` to create a starting config file
    /// with all settings documented.
    pub fn default_toml() -> String {
        r#"# plotwise Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PLOTWISE_*)
#   2. Project config (.plotwise.toml in current directory)
#   3. User global config (~/.plotwise/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://localhost:8000"    # Analysis API base URL

[ui]
listen_addr = "127.0.0.1:7878"        # Embedded web server address
open_browser = true                   # Open the browser on `plotwise serve`

[export]
format = "csv"                        # csv | json
dir = "."                             # Directory for exported files
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PlotwiseConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.ui.listen_addr, "127.0.0.1:7878");
        assert!(config.ui.open_browser);
        assert_eq!(config.export.format, "csv");
        assert_eq!(config.export.dir, ".");
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[backend]
base_url = "http://analysis.internal:8000"
"#;
        let config: PlotwiseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://analysis.internal:8000");
        // All other sections fall back to defaults
        assert_eq!(config.ui.listen_addr, "127.0.0.1:7878");
        assert_eq!(config.export.format, "csv");
    }

    #[test]
    fn deserialize_full_toml() {
        let toml_str = r#"
[backend]
base_url = "http://10.0.0.5:9000"

[ui]
listen_addr = "0.0.0.0:8080"
open_browser = false

[export]
format = "json"
dir = "/tmp/exports"
"#;
        let config: PlotwiseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.ui.listen_addr, "0.0.0.0:8080");
        assert!(!config.ui.open_browser);
        assert_eq!(config.export.format, "json");
        assert_eq!(config.export.dir, "/tmp/exports");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: PlotwiseConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert!(config.ui.open_browser);
    }

    #[test]
    fn default_toml_matches_built_in_defaults() {
        let parsed: PlotwiseConfig = toml::from_str(&PlotwiseConfig::default_toml()).unwrap();
        let defaults = PlotwiseConfig::default();
        assert_eq!(parsed.backend.base_url, defaults.backend.base_url);
        assert_eq!(parsed.ui.listen_addr, defaults.ui.listen_addr);
        assert_eq!(parsed.ui.open_browser, defaults.ui.open_browser);
        assert_eq!(parsed.export.format, defaults.export.format);
        assert_eq!(parsed.export.dir, defaults.export.dir);
    }
}
