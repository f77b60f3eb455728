use clap::{Args, Parser, Subcommand};
use core_types::UserRole;
use database::connection::{connect, run_migrations};
use database::repository::{DbRepository, NewUser};
use std::net::SocketAddr;

mod telemetry;

/// The main entry point for the Pawhaven adoption platform backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if one exists.
    dotenvy::dotenv().ok();
    telemetry::init();

    // Parse command-line arguments and execute the appropriate command.
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Migrate => handle_migrate().await,
        Commands::CreateAdmin(args) => handle_create_admin(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// REST backend for the Pawhaven pet-adoption platform.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
    /// Create a back-office admin account (bootstraps the first login).
    CreateAdmin(CreateAdminArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct CreateAdminArgs {
    /// Display name of the admin.
    #[arg(long)]
    name: String,

    /// Login email; must be unique.
    #[arg(long)]
    email: String,

    /// Plaintext password; it is bcrypt-hashed before it reaches the database.
    #[arg(long)]
    password: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    address: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = configuration::load_config()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    web_server::run_server(addr, config).await
}

async fn handle_migrate() -> anyhow::Result<()> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    tracing::info!("Database migrations applied.");
    Ok(())
}

async fn handle_create_admin(args: CreateAdminArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;

    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let password_hash = web_server::auth::password::hash(&args.password, config.auth.bcrypt_cost)?;
    let user = db_repo
        .create_user(NewUser {
            name: args.name,
            email: args.email,
            password_hash,
            phone: args.phone,
            address: args.address,
            role: UserRole::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created.");
    Ok(())
}
