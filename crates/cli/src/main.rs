//! ARCVERSE CLI - operator tools for the backend, storefront and console.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account (signs in as an existing admin first)
//! ARCVERSE_NEW_ADMIN_PASSWORD=... arc-cli admin create -e ops@arcverse.store -n "Ops"
//!
//! # Create the categories and products listed in a YAML catalog
//! arc-cli seed catalog.yaml
//!
//! # Check that the backend, storefront and console are up
//! arc-cli ping
//! ```
//!
//! # Environment Variables
//!
//! - `ARCVERSE_API_URL` - Backend REST API base URL
//! - `ARCVERSE_ADMIN_EMAIL`, `ARCVERSE_ADMIN_PASSWORD` - Existing admin used
//!   for management calls
//! - `ARCVERSE_NEW_ADMIN_PASSWORD` - Password for `admin create`
//! - `STOREFRONT_BASE_URL`, `ADMIN_BASE_URL` - Checked by `ping` when set

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "arc-cli")]
#[command(author, version, about = "ARCVERSE operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Create categories and products from a YAML catalog
    Seed {
        /// Path to the catalog file
        file: String,
    },
    /// Check the backend, storefront and admin console
    Ping,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create { email, name } => {
                commands::admin::create_admin(&email, &name).await?;
            }
        },
        Commands::Seed { file } => {
            commands::seed::catalog(&file).await?;
        }
        Commands::Ping => commands::ping::all().await?,
    }
    Ok(())
}
