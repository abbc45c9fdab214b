//! Aurelia CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (shop schema)
//! aurelia-cli migrate
//!
//! # Create a back-office user
//! aurelia-cli admin create -e admin@example.com -p 's3cure-pass' -r super_admin
//!
//! # Change an existing user's role
//! aurelia-cli admin promote -e staff@example.com -r moderator
//!
//! # Seed the catalog with sample products
//! aurelia-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` / `admin promote` - Back-office user management
//! - `seed` - Seed the catalog with sample products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aurelia-cli")]
#[command(author, version, about = "Aurelia CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the catalog with sample products
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new back-office user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Role (`super_admin`, `admin`, `moderator`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
    /// Change an existing user's role
    Promote {
        /// Email address of the account
        #[arg(short, long)]
        email: String,

        /// New role (`super_admin`, `admin`, `moderator`, `user`)
        #[arg(short, long)]
        role: String,
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                role,
            } => {
                commands::admin::create_user(&email, &password, &role).await?;
            }
            AdminAction::Promote { email, role } => {
                commands::admin::promote_user(&email, &role).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
