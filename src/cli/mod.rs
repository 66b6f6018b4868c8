//! CLI command implementations for plotwise.
//!
//! Provides subcommand handlers for:
//! - `plotwise ask "query"` - run one query and print the analysis
//! - `plotwise localities` - list localities the backend knows about
//! - `plotwise export "query"` - run a query and save its table to a file
//! - `plotwise health` - check backend reachability and config files
//! - `plotwise config show|init|set|reset` - configuration management
//!
//! The web chat (`plotwise serve`) lives in [`crate::web`]; these
//! commands drive the same [`crate::session::Session`] from a terminal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::client::{Backend, BackendClient};
use crate::api::{ExportError, ExportFormat};
use crate::config::{self, PlotwiseConfig};
use crate::session::Session;
use crate::transform::{ChartSpec, TableSpec, build_chart, build_table};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// plotwise ask
// ---------------------------------------------------------------------------

/// Run a single query and print the reply, chart data, and table.
pub fn run_ask(cfg: &PlotwiseConfig, query: &str) -> Result<()> {
    let mut session = Session::connect(BackendClient::from_config(cfg));

    let id = match session.send(query) {
        Some(id) => id,
        None => anyhow::bail!("query must not be empty"),
    };
    let message = session
        .store()
        .message(id)
        .context("reply missing from transcript")?;

    println!("{}", "Plotwise Analysis".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!("{}", message.text);

    if let Some(analysis) = &message.analysis {
        if let Some(chart) = build_chart(analysis) {
            println!();
            print_chart(&chart);
        }
        if let Some(table) = build_table(&analysis.table) {
            println!();
            print_table(&table);
            println!();
            println!(
                "  {}",
                "Run `plotwise export` with the same query to save this table.".dimmed()
            );
        }
    }

    Ok(())
}

/// Print chart series as a year-by-year column table.
fn print_chart(spec: &ChartSpec) {
    println!("{}", spec.title.bold().cyan());

    print!("  {:<8}", spec.x_title);
    for series in &spec.series {
        print!(" {:>22}", truncate(&series.label, 22));
    }
    println!();
    println!("  {}", "-".repeat(8 + spec.series.len() * 23));

    for (i, label) in spec.labels.iter().enumerate() {
        let mut line = format!("  {:<8}", label);
        for series in &spec.series {
            let value = series.data.get(i).copied().flatten();
            line.push_str(&format!(" {:>22}", fmt_cell(value)));
        }
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Print a prepared table with widths fitted to its content.
fn print_table(spec: &TableSpec) {
    let mut widths: Vec<usize> = spec
        .columns
        .iter()
        .map(|c| c.title.chars().count())
        .collect();
    for row in &spec.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let header = spec
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c.title, width = w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  {}", header.bold());
    println!("  {}", "-".repeat(header.chars().count()));

    for (i, row) in spec.rows.iter().enumerate() {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ");
        if i % 2 == 0 {
            println!("  {line}");
        } else {
            println!("  {}", line.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// plotwise localities
// ---------------------------------------------------------------------------

/// List the localities the backend has data for.
pub fn run_localities(cfg: &PlotwiseConfig, format: OutputFormat) -> Result<()> {
    let client = BackendClient::from_config(cfg);
    let resp = client.localities()?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    println!("{}", "Available Localities".bold().cyan());
    println!("{}", "=".repeat(40));

    if resp.localities.is_empty() {
        println!("{}", "No localities reported by the backend.".yellow());
        return Ok(());
    }

    for (i, name) in resp.localities.iter().enumerate() {
        if i % 2 == 0 {
            println!("  {name}");
        } else {
            println!("  {}", name.dimmed());
        }
    }
    println!();
    println!("  {}", format!("{} total", resp.count).dimmed());

    Ok(())
}

// ---------------------------------------------------------------------------
// plotwise export
// ---------------------------------------------------------------------------

/// Run a query and write its table to a file in the chosen format.
pub fn run_export(
    cfg: &PlotwiseConfig,
    query: &str,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let format = match format {
        Some(s) => ExportFormat::parse(s)?,
        None => ExportFormat::parse(&cfg.export.format)?,
    };
    let dir = match output {
        Some(path) => path.to_path_buf(),
        None => expand_tilde(&cfg.export.dir),
    };

    let session = Session::connect(BackendClient::from_config(cfg));
    export_query(session, query, format, &dir)
}

/// Send the query and write the resulting table into `dir`.
fn export_query<B: Backend>(
    mut session: Session<B>,
    query: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<()> {
    let id = match session.send(query) {
        Some(id) => id,
        None => anyhow::bail!("query must not be empty"),
    };

    let rows = session
        .store()
        .message(id)
        .and_then(|m| m.analysis.as_ref())
        .map(|a| a.table.len())
        .unwrap_or(0);
    if rows == 0 {
        if let Some(message) = session.store().message(id) {
            println!("{}", message.text.yellow());
        }
        // Same wording on every surface, terminal included.
        return Err(ExportError::NoData.into());
    }

    let payload = session.export(id, format)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&payload.filename);
    std::fs::write(&path, &payload.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} Exported {} rows to {}",
        "✓".green().bold(),
        rows,
        path.display()
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// plotwise health
// ---------------------------------------------------------------------------

/// Check config files, backend reachability, and dataset status.
pub fn run_health(cfg: &PlotwiseConfig) -> Result<()> {
    println!("{}", "Plotwise Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // Config file status
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.plotwise/config.toml found"
        } else {
            "not found (run `plotwise config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".plotwise.toml found"
        } else {
            "none (optional)"
        },
    );

    // Backend
    let client = BackendClient::from_config(cfg);
    print_health_item("Backend URL", true, client.base_url());
    match client.health() {
        Ok(health) => {
            let ok = health.status == "healthy";
            print_health_item("Backend", ok, &format!("status: {}", health.status));
            print_health_item(
                "Dataset",
                health.data_loaded,
                &if health.data_loaded {
                    format!("{} rows loaded", health.rows)
                } else {
                    "not loaded".to_string()
                },
            );
        }
        Err(err) => {
            print_health_item("Backend", false, &format!("unreachable: {err}"));
        }
    }

    // Localities
    match client.localities() {
        Ok(resp) => print_health_item(
            "Localities",
            resp.count > 0,
            &format!("{} available", resp.count),
        ),
        Err(err) => print_health_item("Localities", false, &err.to_string()),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// plotwise config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Plotwise Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.plotwise/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.plotwise/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".plotwise.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".plotwise.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "PLOTWISE_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.plotwise/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point plotwise at your backend.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Render an optional chart value for a terminal cell.
fn fmt_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
