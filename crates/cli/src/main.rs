//! Gatehouse CLI - database setup, user management and client login.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gatehouse-cli migrate
//!
//! # Seed the default admin, or users from a YAML file
//! gatehouse-cli seed
//! gatehouse-cli seed --file users.yaml
//!
//! # Create a user
//! gatehouse-cli user create -e customer1@gmail.com -p customer1 -r customer
//!
//! # Generate a JWT_SECRET
//! gatehouse-cli secret generate
//!
//! # Log in against a running server and ask where the session lands
//! gatehouse-cli login -e admin@gmail.com -p admin
//! gatehouse-cli landing
//! gatehouse-cli access --allow admin
//! gatehouse-cli logout
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gatehouse_core::Role;
use secrecy::ExposeSecret;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(author, version, about = "Gatehouse CLI tools")]
struct Cli {
    /// Server base URL for client commands
    #[arg(
        long,
        global = true,
        env = "GATEHOUSE_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    server: Url,

    /// Where client commands keep the session
    #[arg(
        long,
        global = true,
        env = "GATEHOUSE_SESSION_FILE",
        default_value = ".gatehouse/session.json"
    )]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed users (default admin, or a YAML file)
    Seed {
        /// YAML file with a `users` list
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage signing secrets
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show where the stored session lands
    Landing,
    /// Check the stored session against a set of allowed roles
    Access {
        /// Allowed role (`admin`, `customer`); repeatable
        #[arg(long = "allow", required = true)]
        allow: Vec<Role>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Plaintext password, hashed before storage
        #[arg(short, long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Postal address
        #[arg(short, long)]
        address: Option<String>,

        /// Role (`admin`, `customer`)
        #[arg(short, long, default_value = "customer")]
        role: Role,
    },
}

#[derive(Subcommand)]
enum SecretAction {
    /// Print a random secret suitable for `JWT_SECRET`
    Generate {
        /// Random bytes before encoding
        #[arg(short, long, default_value_t = commands::secret::DEFAULT_BYTES)]
        bytes: usize,
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
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                name,
                address,
                role,
            } => {
                commands::user::create(commands::user::UserSpec {
                    email,
                    password,
                    name,
                    address,
                    role,
                })
                .await?;
            }
        },
        Commands::Secret { action } => match action {
            SecretAction::Generate { bytes } => {
                let secret = commands::secret::generate(bytes)?;
                #[allow(clippy::print_stdout)]
                {
                    println!("JWT_SECRET={}", secret.expose_secret());
                }
            }
        },
        Commands::Login { email, password } => {
            commands::session::login(&cli.server, &cli.session_file, &email, &password).await?;
        }
        Commands::Logout => commands::session::logout(&cli.server, &cli.session_file)?,
        Commands::Landing => commands::session::landing(&cli.server, &cli.session_file)?,
        Commands::Access { allow } => {
            commands::session::access(&cli.server, &cli.session_file, &allow)?;
        }
    }
    Ok(())
}
