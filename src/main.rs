use std::fs;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rand::{Rng, distributions::Alphanumeric};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use journal::auth::{PasswordVault, TokenService};
use journal::config::{DatabaseLocation, ServerConfig};
use journal::server::{AppState, LinkBuilder, create_router};
use journal::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "A multi-user journaling server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, env = "JOURNAL_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, env = "JOURNAL_PORT", default_value_t = 5000)]
        port: u16,

        #[command(flatten)]
        database: DatabaseArgs,

        /// Key used to sign bearer tokens. Falls back to SECRET_KEY, then to a
        /// random key that only lives as long as the process.
        #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,

        /// Lifetime of issued tokens, in seconds
        #[arg(long, env = "JWT_ACCESS_TOKEN_EXPIRES", default_value_t = journal::config::DEFAULT_TOKEN_TTL_SECS)]
        token_ttl_secs: i64,

        /// Prefix for hypermedia links (e.g., "https://journal.example.com/api").
        /// Links stay relative when empty.
        #[arg(long, env = "JOURNAL_LINK_BASE", default_value = "")]
        link_base: String,
    },

    /// Create the database tables and exit
    InitDb {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    /// Store location, e.g. sqlite:///journal.db
    #[arg(long, env = "DATABASE_URI", default_value = journal::config::DEFAULT_DATABASE_URI)]
    database_uri: String,
}

fn resolve_secret(flag: Option<String>) -> String {
    if let Some(secret) = flag.filter(|s| !s.is_empty()) {
        return secret;
    }
    if let Ok(secret) = std::env::var("SECRET_KEY") {
        if !secret.is_empty() {
            return secret;
        }
    }

    warn!("No JWT_SECRET_KEY or SECRET_KEY set; tokens will not survive a restart");
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn open_store(database_uri: &str) -> anyhow::Result<SqliteStore> {
    let location = DatabaseLocation::parse(database_uri)?;

    if let DatabaseLocation::File(path) = &location {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }

    let store = SqliteStore::open(&location)?;
    store.initialize()?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("journal=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb { database } => {
            open_store(&database.database_uri)?;
            info!("Database initialized at {}", database.database_uri);
        }
        Commands::Serve {
            host,
            port,
            database,
            secret_key,
            token_ttl_secs,
            link_base,
        } => {
            let config = ServerConfig {
                host,
                port,
                database_uri: database.database_uri,
                secret_key: resolve_secret(secret_key),
                token_ttl_secs,
                link_base,
            };
            config.validate()?;

            let store = open_store(&config.database_uri)?;

            let state = Arc::new(AppState::new(
                Arc::new(store),
                PasswordVault::new(),
                TokenService::new(
                    config.secret_key.as_bytes(),
                    chrono::Duration::seconds(config.token_ttl_secs),
                ),
                LinkBuilder::new(config.link_base.clone()),
            ));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
