use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use plotwise::api::client::BackendClient;
use plotwise::session::Session;
use plotwise::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "plotwise")]
#[command(about = "Chat client for locality-level real estate analysis")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the embedded web chat
    Serve {
        /// Listen address, e.g. 127.0.0.1:7878 (default from config)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the browser automatically
        #[arg(long)]
        no_open: bool,
    },
    /// Run one query and print the analysis
    Ask {
        /// The query, e.g. "Analyze Wakad"
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
    },
    /// List localities the backend has data for
    Localities {
        /// Output format: table or json
        #[arg(long)]
        format: Option<String>,
    },
    /// Run a query and save its table to a file
    Export {
        /// The query to run
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
        /// Export format: csv or json (default from config)
        #[arg(long)]
        format: Option<String>,
        /// Directory to write the file into (default from config)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check backend reachability and config files
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective merged configuration
    Show,
    /// Write a default config file to ~/.plotwise/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `plotwise config set backend.base_url http://host:8000`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();

    match app.command {
        Commands::Serve { addr, no_open } => {
            let addr = addr.unwrap_or_else(|| cfg.ui.listen_addr.clone());
            let open = cfg.ui.open_browser && !no_open;
            let session = Session::connect(BackendClient::from_config(&cfg));
            web::serve(session, &addr, open)
        }
        Commands::Ask { query } => cli::run_ask(&cfg, &query.join(" ")),
        Commands::Localities { format } => {
            cli::run_localities(&cfg, cli::OutputFormat::from_str_opt(format.as_deref()))
        }
        Commands::Export {
            query,
            format,
            output,
        } => cli::run_export(&cfg, &query.join(" "), format.as_deref(), output.as_deref()),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
