//! KnaveTone CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! knavetone-cli migrate
//!
//! # Seed the catalog with the starter guitar inventory
//! knavetone-cli seed
//!
//! # Grant or revoke the admin role by email
//! knavetone-cli admin grant -e owner@example.com
//! knavetone-cli admin revoke -e former@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the product catalog
//! - `admin grant` / `admin revoke` - Manage the admin role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "knavetone-cli")]
#[command(author, version, about = "KnaveTone store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with the starter guitar inventory
    Seed,
    /// Manage the admin role
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to an existing user
    Grant {
        /// User's email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role from a user
    Revoke {
        /// User's email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant { email } => {
                commands::admin::set_role(&email, true).await?;
            }
            AdminAction::Revoke { email } => {
                commands::admin::set_role(&email, false).await?;
            }
        },
    }
    Ok(())
}
