//! Admin Console CLI - migrations, admin bootstrap and API front end.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ac-cli migrate
//!
//! # Create the first admin directly in the database
//! ac-cli admin create -f Ada -l Lovelace -e ada@example.com --admin
//!
//! # Talk to a running server
//! ac-cli register -f Grace -l Hopper -e grace@example.com
//! ac-cli login -e grace@example.com
//! ac-cli list
//! ac-cli me
//! ac-cli delete 3
//! ac-cli status
//! ac-cli logout
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create users (optionally admins) without the API
//! - `register`, `login`, `logout`, `list`, `delete`, `me`, `status` - API front end

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use admin_console_core::AdminUserId;

mod commands;

use commands::api::ApiAction;

#[derive(Parser)]
#[command(name = "ac-cli")]
#[command(author, version, about = "Admin console CLI tools")]
struct Cli {
    /// API base URL for the front-end commands
    #[arg(long, global = true, env = "ADMIN_API_URI")]
    api: Option<String>,

    /// Local store file for the admin flag and session
    #[arg(long, global = true, env = "AC_STORE_FILE")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users directly in the database
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Register a new account through the API
    Register {
        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Log in and remember the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Log out and forget the session
    Logout,
    /// List all accounts
    List,
    /// Delete an account (admins only)
    Delete {
        /// Account ID
        id: AdminUserId,
    },
    /// Show the logged-in account
    Me,
    /// Show the locally stored admin flag
    Status,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a user, optionally with admin rights
    Create {
        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long)]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let action = match cli.command {
        Commands::Migrate => {
            commands::migrate::run().await?;
            return Ok(());
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                first_name,
                last_name,
                email,
                admin,
            } => {
                commands::admin::create_user(&first_name, &last_name, &email, admin).await?;
                return Ok(());
            }
        },
        Commands::Register {
            first_name,
            last_name,
            email,
        } => ApiAction::Register {
            first_name,
            last_name,
            email,
        },
        Commands::Login { email } => ApiAction::Login { email },
        Commands::Logout => ApiAction::Logout,
        Commands::List => ApiAction::List,
        Commands::Delete { id } => ApiAction::Delete { id },
        Commands::Me => ApiAction::Me,
        Commands::Status => ApiAction::Status,
    };

    let api = cli
        .api
        .unwrap_or_else(admin_console_client::default_base_url);
    commands::api::run(&api, cli.store, action).await?;
    Ok(())
}
