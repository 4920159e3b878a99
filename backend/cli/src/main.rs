mod client;
mod config;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use signd_core::CommandContext;
use signd_gateway::ControlState;
use signd_infra::{CommandFile, MailboxEnclave, SharedCommand};

use client::ControlClient;
use config::Config;

#[derive(Parser)]
#[command(name = "signd")]
#[command(about = "signd: local control plane for a paired signing enclave")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control server
    ///
    /// No enclave transport is attached: `pair` returns a secret, but the
    /// pairing only completes once a transport delivers the enclave's identity.
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Start a new pairing and print the pairing secret
    Pair,
    /// Print the paired enclave identity
    Me,
    /// List the enclave's profiles
    List {
        #[arg(short, long)]
        email_filter: Option<String>,
    },
    /// Show whether the control server is running and paired
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init_logger(config.log_dir.as_deref(), &config.log_level);

    let cli = Cli::parse();
    let client = ControlClient::new(config.base_url());

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                bind_address: bind.unwrap_or(config.bind_address),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Pair => {
            let secret = client.pair().await?;
            println!("{}", serde_json::to_string_pretty(&secret)?);
        }
        Commands::Me => match client.me().await? {
            Some(me) => println!("{}", serde_json::to_string_pretty(&me)?),
            None => println!("not paired"),
        },
        Commands::List { email_filter } => match client.list(email_filter).await? {
            Some(list) => println!("{}", serde_json::to_string_pretty(&list)?),
            None => println!("no answer yet (or not paired), try again"),
        },
        Commands::Status => match client.me().await {
            Ok(Some(me)) => println!("signd is running, paired with {}", me.email),
            Ok(None) => println!("signd is running, not paired"),
            Err(_) => println!("signd is not running on {}", config.base_url()),
        },
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        call_timeout_secs = config.call_timeout_secs,
        "Starting signd control server"
    );

    let enclave = Arc::new(MailboxEnclave::new(config.workstation_name.clone()));
    let commands: Arc<dyn CommandContext> = match &config.last_command_file {
        Some(path) => {
            info!(path = %path.display(), "Reading last command from file");
            Arc::new(CommandFile::new(path))
        }
        None => {
            warn!("No home directory; sign requests get no default command");
            Arc::new(SharedCommand::default())
        }
    };

    let state = ControlState::new(enclave, commands).with_call_timeout(config.call_timeout());

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;

    signd_gateway::serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
