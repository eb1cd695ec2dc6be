mod commands;

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "site-kit")]
#[command(version, about = "Static content site toolkit: collections, breadcrumbs, build and preview", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
enum Command {
    /// Initialize a new site directory
    Init {
        /// Path to the site directory
        path: PathBuf,

        /// Site name written to site.toml
        #[arg(long)]
        name: Option<String>,
    },

    /// Validate site configuration and content collections
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Preview site locally with hot reload
    Preview {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Build the static site
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory (defaults to build.output from site.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the breadcrumb trail for a route
    Breadcrumbs {
        /// Path to site directory
        path: PathBuf,

        /// Route to resolve, e.g. /docs/guide/install
        route: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Issue all page lookups at once
        #[arg(long)]
        concurrent: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "warn",
        1 => "site_kit=debug,site_kit_core=debug,site_kit_content=debug,site_kit_generator=debug,site_kit_validator=debug",
        _ => "site_kit=trace,site_kit_core=trace,site_kit_content=trace,site_kit_generator=trace,site_kit_validator=trace,tower_http=debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Command::Init { path, name } => commands::init::run(path, name).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Breadcrumbs {
            path,
            route,
            json,
            concurrent,
        } => commands::breadcrumbs::run(path, route, json, concurrent).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "site-kit", &mut io::stdout());
            Ok(())
        }
    }
}
