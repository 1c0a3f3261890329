//! `freelance`: command-line front end for the session core.
//!
//! Every command bootstraps the persisted session first, then runs one
//! operation and prints its result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use freelance_client::services::portfolio::load_portfolio;
use freelance_client::state::portfolio::PortfolioState;
use freelance_client::{
    ApiError, ClientConfig, ConfigError, FileTokenStore, ProfileUpdate, RegisterRequest, SessionError, SessionManager,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    Portfolio(String),
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "freelance", about = "Freelance Manager session client")]
struct Cli {
    /// API root, e.g. http://localhost:5001/api
    #[arg(long, env = "FREELANCE_BASE_URL")]
    base_url: Option<String>,

    /// Where the bearer token is persisted between runs.
    #[arg(long, env = "FREELANCE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in, replacing any existing session.
    Login {
        username: String,
        #[arg(long, env = "FREELANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in as it.
    Register(RegisterArgs),
    /// Log out and forget the persisted token.
    Logout,
    /// Print the current user.
    Whoami,
    /// Update profile fields of the current user.
    Profile(ProfileArgs),
    /// Change the current user's password.
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Load a public portfolio with its stats.
    Portfolio { username: String },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "FREELANCE_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    specialization: String,
    #[arg(long)]
    hourly_rate: Option<f64>,
}

impl From<RegisterArgs> for RegisterRequest {
    fn from(args: RegisterArgs) -> Self {
        Self {
            username: args.username,
            email: args.email,
            password: args.password,
            name: args.name,
            specialization: args.specialization,
            hourly_rate: args.hourly_rate,
        }
    }
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    specialization: Option<String>,
    #[arg(long)]
    hourly_rate: Option<f64>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            bio: args.bio,
            specialization: args.specialization,
            hourly_rate: args.hourly_rate,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(token_file) = cli.token_file {
        config = config.with_token_path(token_file);
    }

    let store = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let manager = SessionManager::new(&config, store)?;
    manager.bootstrap().await;

    match cli.command {
        Command::Login { username, password } => print_json(&manager.login(&username, &password).await?),
        Command::Register(args) => print_json(&manager.register(&args.into()).await?),
        Command::Logout => {
            manager.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => match manager.current_user() {
            Some(user) => print_json(&user),
            None => {
                println!("not logged in");
                Ok(())
            }
        },
        Command::Profile(args) => {
            let update = ProfileUpdate::from(args);
            if update.is_empty() {
                return Err(CliError::EmptyUpdate);
            }
            print_json(&manager.update_profile(&update).await?)
        }
        Command::Password { current, new } => {
            manager.change_password(&current, &new).await?;
            println!("password updated");
            Ok(())
        }
        Command::Portfolio { username } => {
            let mut state = PortfolioState::new();
            load_portfolio(manager.api(), &username, &mut state).await;
            if let Some(message) = state.error {
                return Err(CliError::Portfolio(message));
            }
            print_json(&state)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
