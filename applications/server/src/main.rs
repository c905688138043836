/// Roster Server - users service with REST and GraphQL APIs
use anyhow::Context;
use clap::{Parser, Subcommand};
use roster_core::PageRequest;
use roster_server::{
    config::{ServerConfig, StorageBackend},
    create_router, open_store,
    state::AppState,
};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Users service with REST and GraphQL APIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Insert synthetic users into the PostgreSQL database
    Seed {
        /// Configuration file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of users to insert
        #[arg(short, long, default_value_t = 1000)]
        count: usize,
        /// Rows per INSERT statement
        #[arg(short, long, default_value_t = roster_storage::seed::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Print the first users
    ListUsers {
        /// Configuration file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum number of users to print
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "roster_server=info,roster_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::Seed {
            config,
            count,
            batch_size,
        } => {
            seed(config, count, batch_size).await?;
        }
        Commands::ListUsers { config, limit } => {
            list_users(config, limit).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let config = ServerConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = load_config(config_path)?;

    tracing::info!("Starting Roster Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Storage backend: {:?}", config.storage.backend);

    let store = open_store(&config.storage).await?;
    let app_state = AppState::new(store, config.display_zone()?);

    // Build router
    let app = create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("invalid server.host {:?}", config.server.host))?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("GraphQL endpoint: http://{}/graphql", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn seed(
    config_path: Option<PathBuf>,
    count: usize,
    batch_size: usize,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    if config.storage.backend != StorageBackend::Postgres {
        anyhow::bail!("seeding requires storage.backend = \"postgres\"");
    }

    let storage = &config.storage;
    let pool =
        roster_storage::create_pool(&storage.database_url, &storage.schema, storage.max_connections)
            .await?;
    roster_storage::run_migrations(&pool, &storage.schema).await?;

    let started = std::time::Instant::now();
    let inserted = roster_storage::seed::seed_users(&pool, count, batch_size).await?;
    tracing::info!(
        inserted,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Seeding finished"
    );

    Ok(())
}

async fn list_users(config_path: Option<PathBuf>, limit: i64) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config.storage).await?;
    let display = config.display_zone()?;

    let total = store.count().await?;
    let page = store.list_page(PageRequest::new(None, Some(limit))).await?;

    println!("Users ({} of {}):", page.len(), total);
    for user in page.items {
        println!(
            "  {} - {} <{}> (created {})",
            user.id,
            user.name,
            user.email,
            display.format(user.created_at)
        );
    }

    Ok(())
}
