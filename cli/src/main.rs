use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tuber_core::{agent, config, providers, tools};

mod server;

const DEFAULT_QUERY: &str = "Show top 3 US trending videos with metadata and thumbnails";

#[derive(Parser)]
#[command(name = "tuber")]
#[command(about = "tuber - ask questions about YouTube content", long_about = None)]
struct Cli {
    /// Tracing filter, e.g. "debug" or "tuber_core=trace" (overrides
    /// RUST_LOG and the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single query and exit
    Ask {
        #[arg(short, long, default_value = DEFAULT_QUERY)]
        query: String,
    },
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn init_logging(explicit: Option<&str>, config_level: &str) {
    let filter = match explicit {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wire config → provider → registry → loop, the whole session stack.
pub(crate) fn build_agent(config: &config::Config) -> Result<Arc<agent::AgentLoop>> {
    let provider = providers::create_provider(config)?;
    let registry = Arc::new(agent::ToolRegistry::new());
    tools::register_all(&registry, config)?;
    Ok(Arc::new(
        agent::AgentLoop::new(provider, registry).with_max_rounds(config.max_rounds),
    ))
}

async fn run_ask(config: &config::Config, query: &str) -> Result<()> {
    let agent = build_agent(config)?;
    let answer = agent.run(query).await?;
    println!("{answer}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::Config::load_or_init() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.log_level.as_deref(), &config.log_level);

    let command = cli.command.unwrap_or(Commands::Ask {
        query: DEFAULT_QUERY.to_string(),
    });

    let result = match command {
        Commands::Ask { query } => run_ask(&config, &query).await,
        Commands::Serve { host, port } => server::run_serve(&host, port, config.clone()).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
