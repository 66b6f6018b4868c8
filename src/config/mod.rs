/// Configuration system for plotwise.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** - hardcoded in [`schema::PlotwiseConfig::default()`]
/// 2. **User global config** - `~/.plotwise/config.toml`
/// 3. **Project local config** - `.plotwise.toml` in the current working directory
/// 4. **Environment variables** - `PLOTWISE_*` overrides (highest precedence)
///
/// Later layers override earlier ones at the field level: layers are
/// merged as TOML value trees before deserialization, so a file that
/// sets only `backend.base_url` leaves every other key from the layers
/// below it intact.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::ExportFormat;

pub use schema::PlotwiseConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved plotwise configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML →
/// env vars. Missing or malformed files are skipped silently; a type
/// mismatch anywhere in the merged tree falls back to built-in defaults.
pub fn load() -> PlotwiseConfig {
    let mut merged = default_value();

    // Layer 2: user global config (~/.plotwise/config.toml)
    if let Some(global) = read_toml_value(global_config_path()) {
        merge_value(&mut merged, global);
    }

    // Layer 3: project local config (.plotwise.toml)
    if let Some(project) = read_toml_value(project_config_path()) {
        merge_value(&mut merged, project);
    }

    let mut config: PlotwiseConfig = merged.try_into().unwrap_or_default();

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Serialize the built-in defaults to a TOML value tree.
fn default_value() -> toml::Value {
    toml::Value::try_from(PlotwiseConfig::default())
        .unwrap_or(toml::Value::Table(toml::value::Table::new()))
}

/// Read a TOML file into a raw value tree (if it exists and parses).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. Malformed files are silently ignored so a bad
/// config never takes the tool down with it.
fn read_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge an overlay value tree into the base, key by key.
///
/// Tables merge recursively; any other value in the overlay replaces
/// the base's value wholesale.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay) => *base_slot = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.plotwise/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".plotwise").join("config.toml"))
}

/// Path to the project local config: `.plotwise.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".plotwise.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PLOTWISE_BACKEND_URL` - analysis API base URL
/// - `PLOTWISE_LISTEN_ADDR` - embedded web server address
/// - `PLOTWISE_OPEN_BROWSER` - open the browser on serve (`1`/`true`/`yes`/`on`)
/// - `PLOTWISE_EXPORT_FORMAT` - default export format (`csv` | `json`)
/// - `PLOTWISE_EXPORT_DIR` - directory for exported files
fn apply_env_overrides(config: &mut PlotwiseConfig) {
    if let Ok(val) = std::env::var("PLOTWISE_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("PLOTWISE_LISTEN_ADDR")
        && !val.is_empty()
    {
        config.ui.listen_addr = val;
    }
    if let Ok(val) = std::env::var("PLOTWISE_OPEN_BROWSER") {
        config.ui.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PLOTWISE_EXPORT_FORMAT")
        && ExportFormat::parse(&val).is_ok()
    {
        config.export.format = val.to_ascii_lowercase();
    }
    if let Ok(val) = std::env::var("PLOTWISE_EXPORT_DIR")
        && !val.is_empty()
    {
        config.export.dir = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.plotwise/config.toml`.
///
/// Creates the `~/.plotwise/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.plotwise/ directory")?;
    }

    fs::write(&path, PlotwiseConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified
/// key, and writes the result back. Supports dotted keys like
/// `backend.base_url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&PlotwiseConfig::default())
            .context("failed to serialize default config")?
    };
    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML")?;

    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value is parsed to the type of the existing value, so
/// `config set ui.open_browser false` stores a boolean and not the
/// string `"false"`.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
