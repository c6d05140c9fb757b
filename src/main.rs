use std::fs;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use extgate::config::ServerConfig;
use extgate::server::{AppState, create_router};
use extgate::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "extgate")]
#[command(about = "Extension installation registry and proxy gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, env = "EXTGATE_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, env = "EXTGATE_PORT", default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, env = "EXTGATE_DATA_DIR", default_value = "./data")]
        data_dir: String,

        /// Base URL of the identity provider
        #[arg(long, env = "EXTGATE_IDENTITY_URL")]
        identity_url: String,

        /// API key for the identity provider
        #[arg(long, env = "EXTGATE_IDENTITY_API_KEY")]
        identity_api_key: String,

        /// Maximum page size for list endpoints
        #[arg(long, env = "EXTGATE_MAX_PAGE_SIZE", default_value = "100")]
        max_page_size: i64,

        /// Timeout in seconds for proxied calls to extension backends
        #[arg(long, env = "EXTGATE_PROXY_TIMEOUT_SECS", default_value = "60")]
        proxy_timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("extgate=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            identity_url,
            identity_api_key,
            max_page_size,
            proxy_timeout_secs,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                identity_url,
                identity_api_key,
                max_page_size,
                proxy_timeout: Duration::from_secs(proxy_timeout_secs),
            };

            fs::create_dir_all(&config.data_dir)?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;

            let state = Arc::new(AppState::new(Arc::new(store), &config)?);

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
