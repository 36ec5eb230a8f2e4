use anyhow::Result;
use clap::Parser;
use fnos_monitor::fnos::FnosClient;
use fnos_monitor::setup::{validate_input, SetupInput};
use fnos_monitor::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// fnOS host (overrides config)
    #[arg(long, env = "FNOS_HOST")]
    fnos_host: Option<String>,

    /// fnOS username (overrides config)
    #[arg(long, env = "FNOS_USERNAME")]
    fnos_username: Option<String>,

    /// fnOS password (overrides config)
    #[arg(long, env = "FNOS_PASSWORD", hide_env_values = true)]
    fnos_password: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FNOS_MONITOR_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "FNOS_MONITOR_ADDR")]
    addr: Option<String>,

    /// Only check that the device is reachable and the credentials work
    #[arg(long)]
    validate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fnOS Monitor v{}", env!("CARGO_PKG_VERSION"));

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(host) = args.fnos_host {
        config.fnos.host = host;
    }
    if let Some(username) = args.fnos_username {
        config.fnos.username = username;
    }
    if let Some(password) = args.fnos_password {
        config.fnos.password = secrecy::SecretString::new(password.into());
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    info!("Configuration loaded successfully");
    info!("fnOS host: {}", config.fnos.host);

    if args.validate_only {
        let input = SetupInput {
            host: config.fnos.host.clone(),
            username: config.fnos.username.clone(),
            password: config.fnos.password.clone(),
            name: config.fnos.name.clone(),
        };
        let client = FnosClient::new(config.fnos.use_tls, config.fnos.verify_ssl);
        match validate_input(client, &input).await {
            Ok(title) => {
                info!("Settings for '{}' are valid", title);
                return Ok(());
            }
            Err(e) => {
                error!("Validation failed ({}): {}", e.key(), e);
                std::process::exit(1);
            }
        }
    }

    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
