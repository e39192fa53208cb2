mod commands;
mod config;
mod logging;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use reelops_storage::ScriptStatus;

use crate::config::ReelopsConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Operator tooling for the reelops short-video pipeline.
#[derive(Parser)]
#[command(name = "reelops", version, about = "Script review and video posting for reelops")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for the reelops crates
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// JSON file holding the script records
        #[arg(long)]
        data: Option<PathBuf>,
        /// Path to TLS certificate PEM file (requires --tls-key)
        #[arg(long)]
        tls_cert: Option<PathBuf>,
        /// Path to TLS private key PEM file (requires --tls-cert)
        #[arg(long)]
        tls_key: Option<PathBuf>,
    },

    /// List scripts, newest first
    List {
        /// JSON file holding the script records
        #[arg(long)]
        data: Option<PathBuf>,
        /// Only scripts with this status, e.g. "Pending Script"
        #[arg(long, value_parser = parse_status)]
        status: Option<ScriptStatus>,
        /// Page size (1-100)
        #[arg(long)]
        limit: Option<usize>,
        /// Records to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show one script
    Show {
        /// JSON file holding the script records
        #[arg(long)]
        data: Option<PathBuf>,
        /// Script id
        id: String,
    },

    /// Approve a pending script and trigger video rendering
    Approve {
        /// JSON file holding the script records
        #[arg(long)]
        data: Option<PathBuf>,
        /// Script id
        id: String,
        /// User requesting the approval
        #[arg(long)]
        actor: String,
    },

    /// Post a rendered video to the social platforms
    Post {
        /// JSON file holding the script records
        #[arg(long)]
        data: Option<PathBuf>,
        /// Script id
        id: String,
        /// User requesting the post
        #[arg(long)]
        actor: String,
    },
}

fn parse_status(s: &str) -> Result<ScriptStatus, String> {
    s.parse::<ScriptStatus>().map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    let config = match ReelopsConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&e.to_string(), cli.output);
            process::exit(1);
        }
    };
    // --data on the command line wins over REELOPS_DATA and the config file.
    let data_or = |flag: Option<PathBuf>| flag.or_else(|| config.data.clone());

    match cli.command {
        Commands::Serve {
            port,
            data,
            tls_cert,
            tls_key,
        } => {
            // Validate TLS flags: both must be provided or neither
            if tls_cert.is_some() != tls_key.is_some() {
                report_error("--tls-cert and --tls-key must both be provided", cli.output);
                process::exit(1);
            }
            let options = serve::ServeOptions {
                port: port.unwrap_or(config.server.port),
                data: data_or(data),
                tls_cert,
                tls_key,
            };
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    report_error(&format!("failed to start runtime: {}", e), cli.output);
                    process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(serve::start_server(&config, options)) {
                report_error(&format!("server error: {}", e), cli.output);
                process::exit(1);
            }
        }
        Commands::List {
            data,
            status,
            limit,
            offset,
        } => {
            commands::cmd_list(data_or(data), status, limit, offset, cli.output);
        }
        Commands::Show { data, id } => {
            commands::cmd_show(data_or(data), &id, cli.output);
        }
        Commands::Approve { data, id, actor } => {
            commands::cmd_approve(&config, data_or(data), &id, &actor, cli.output);
        }
        Commands::Post { data, id, actor } => {
            commands::cmd_post(&config, data_or(data), &id, &actor, cli.output);
        }
    }
}

/// Report an error on stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
