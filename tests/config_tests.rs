//! Environment override tests for the layered configuration.
//!
//! # Safety
//!
//! These phases use `std::env::set_var` / `remove_var`, which are
//! `unsafe` in Rust 2024 edition. Everything runs inside a single
//! `#[test]` so no other thread touches the variables concurrently.

use plotwise::config;

/// Helper: set an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn set_env(key: &str, val: &str) {
    unsafe { std::env::set_var(key, val) }
}

/// Helper: remove an env var (wraps the `unsafe` call).
///
/// # Safety
/// Must only be called from single-threaded test contexts.
unsafe fn remove_env(key: &str) {
    unsafe { std::env::remove_var(key) }
}

const VARS: [&str; 5] = [
    "PLOTWISE_BACKEND_URL",
    "PLOTWISE_LISTEN_ADDR",
    "PLOTWISE_OPEN_BROWSER",
    "PLOTWISE_EXPORT_FORMAT",
    "PLOTWISE_EXPORT_DIR",
];

#[test]
fn env_vars_override_every_other_layer() {
    // --- baseline: nothing set ---
    for var in VARS {
        unsafe { remove_env(var) };
    }
    let cfg = config::load();
    assert_eq!(cfg.backend.base_url, "http://localhost:8000");
    assert_eq!(cfg.ui.listen_addr, "127.0.0.1:7878");
    assert!(cfg.ui.open_browser);
    assert_eq!(cfg.export.format, "csv");
    assert_eq!(cfg.export.dir, ".");

    // --- every override applies ---
    unsafe { set_env("PLOTWISE_BACKEND_URL", "http://10.0.0.5:9000") };
    unsafe { set_env("PLOTWISE_LISTEN_ADDR", "0.0.0.0:9090") };
    unsafe { set_env("PLOTWISE_OPEN_BROWSER", "no") };
    unsafe { set_env("PLOTWISE_EXPORT_FORMAT", "JSON") };
    unsafe { set_env("PLOTWISE_EXPORT_DIR", "/tmp/exports") };

    let cfg = config::load();
    assert_eq!(cfg.backend.base_url, "http://10.0.0.5:9000");
    assert_eq!(cfg.ui.listen_addr, "0.0.0.0:9090");
    assert!(!cfg.ui.open_browser);
    assert_eq!(cfg.export.format, "json", "format is stored lowercased");
    assert_eq!(cfg.export.dir, "/tmp/exports");

    // --- truthy spellings for the browser flag ---
    unsafe { set_env("PLOTWISE_OPEN_BROWSER", "yes") };
    assert!(config::load().ui.open_browser);
    unsafe { set_env("PLOTWISE_OPEN_BROWSER", "0") };
    assert!(!config::load().ui.open_browser);

    // --- unknown export format is ignored ---
    unsafe { set_env("PLOTWISE_EXPORT_FORMAT", "parquet") };
    assert_eq!(config::load().export.format, "csv");

    // --- empty values are ignored ---
    unsafe { set_env("PLOTWISE_BACKEND_URL", "") };
    assert_eq!(config::load().backend.base_url, "http://localhost:8000");

    // --- cleanup restores defaults ---
    for var in VARS {
        unsafe { remove_env(var) };
    }
    let cfg = config::load();
    assert_eq!(cfg.backend.base_url, "http://localhost:8000");
    assert_eq!(cfg.export.format, "csv");
}
