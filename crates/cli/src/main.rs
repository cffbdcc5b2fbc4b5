//! Roster CLI - manage customer records and user accounts from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List customers, optionally filtered
//! roster records list --filter silva
//!
//! # Add, update and delete customers
//! roster records add -n "Maria Souza" -t 22233344455 -p "81 99999-0000"
//! roster records update row-3 --phone "81 98888-0000"
//! roster records delete row-3 --yes
//!
//! # Import a spreadsheet (.xlsx/.xls with Nome Completo, CPF, Numero)
//! roster import clientes.xlsx
//!
//! # Manage user accounts (admin only)
//! roster users create joana -r user
//! roster users delete joana --yes
//! ```
//!
//! # Environment Variables
//!
//! - `ROSTER_BACKEND_URL` - Base URL of the records/users backend
//! - `ROSTER_USERNAME` / `ROSTER_PASSWORD` - Credentials to log in with
//! - `ROSTER_UPDATE_STRATEGY` - `patch` or `replace` (default: patch)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about = "Roster customer admin tools")]
struct Cli {
    /// Username to log in with
    #[arg(long, env = "ROSTER_USERNAME", global = true)]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage customer records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },
    /// Import customers from a spreadsheet
    Import {
        /// Path to an .xlsx or .xls file
        file: PathBuf,
    },
    /// Manage user accounts (admin only)
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum RecordsAction {
    /// List customers
    List {
        /// Only show customers matching this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Add a customer
    Add {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// CPF
        #[arg(short, long, default_value = "")]
        tax_id: String,

        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Update a customer (key as shown by `list`, e.g. `row-3` or `id-12`)
    Update {
        key: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        tax_id: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Delete a customer
    Delete {
        key: String,

        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List accounts
    List,
    /// Create an account (password read from `ROSTER_NEW_PASSWORD`)
    Create {
        /// Username of the new account
        name: String,

        /// Role (`user` or `admin`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
    /// Change an account's role and/or password (`ROSTER_NEW_PASSWORD`)
    Update {
        /// Account ID or username
        user: String,

        #[arg(short, long)]
        role: Option<String>,

        /// Also set the password from `ROSTER_NEW_PASSWORD`
        #[arg(long)]
        password: bool,
    },
    /// Delete an account
    Delete {
        /// Account ID or username
        user: String,

        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Before parsing, so `.env` can supply ROSTER_USERNAME
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let mut ctx = commands::Context::login(cli.username).await?;

    let result = match cli.command {
        Commands::Records { action } => match action {
            RecordsAction::List { filter } => {
                commands::records::list(&mut ctx, filter.as_deref()).await
            }
            RecordsAction::Add {
                name,
                tax_id,
                phone,
            } => commands::records::add(&mut ctx, &name, &tax_id, &phone).await,
            RecordsAction::Update {
                key,
                name,
                tax_id,
                phone,
            } => commands::records::update(&mut ctx, &key, name, tax_id, phone).await,
            RecordsAction::Delete { key, yes } => {
                commands::records::delete(&mut ctx, &key, yes).await
            }
        },
        Commands::Import { file } => commands::import::run(&mut ctx, &file).await,
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list(&mut ctx).await,
            UsersAction::Create { name, role } => {
                commands::users::create(&mut ctx, &name, &role).await
            }
            UsersAction::Update {
                user,
                role,
                password,
            } => commands::users::update(&mut ctx, &user, role.as_deref(), password).await,
            UsersAction::Delete { user, yes } => {
                commands::users::delete(&mut ctx, &user, yes).await
            }
        },
    };

    ctx.logout().await;
    result
}
