//! # rowkeep — command-line entry point
//!
//! Composition root that wires the `MySQL` adapter into the repository engine
//! and runs one account command.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, then env vars)
//! - Initialize tracing from the configured filter
//! - Build the backend, the lazily-connected `Connection` and the repository
//! - Run the requested command through `UserService`
//! - Always shut the connection down, whether the command failed or not
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod cli;
mod config;

use std::io::Write;

use anyhow::Context as _;
use clap::Parser as _;
use rowkeep_app::connection::Connection;
use rowkeep_app::ports::UserRepository;
use rowkeep_app::repository::Repository;
use rowkeep_app::services::UserService;
use rowkeep_domain::entity::Entity as _;
use rowkeep_domain::user::User;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, UserCommand};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if cli.verbose {
        config.diagnostics.verbose = true;
    }

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter `{}`", config.logging.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Storage
    let backend = config.database.build();
    let connection = Connection::new(backend, config.diagnostics());
    let repository = Repository::new(connection);

    // Services
    let mut service = UserService::new(repository);

    let mut stdout = std::io::stdout().lock();
    let result = run(&mut service, cli.command, &mut stdout).await;
    service.repository_mut().shutdown().await;
    result
}

async fn run<R: UserRepository>(
    service: &mut UserService<R>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Command::User(command) = command;
    match command {
        UserCommand::List => {
            let selection = service.list_users().await?;
            if !selection.skipped.is_empty() {
                tracing::warn!(skipped = selection.skipped.len(), "some rows could not be read");
            }
            for user in &selection.entities {
                writeln!(out, "{}", render_user(user))?;
            }
        }
        UserCommand::Show { id } => {
            let user = service.get_user(id).await?;
            writeln!(out, "{}", render_user(&user))?;
        }
        UserCommand::Add {
            username,
            email,
            password_hash,
        } => {
            let user = service.register(&username, &email, &password_hash).await?;
            writeln!(out, "{}", render_user(&user))?;
        }
        UserCommand::SetEmail { id, email } => {
            let user = service.change_email(id, &email).await?;
            writeln!(out, "{}", render_user(&user))?;
        }
        UserCommand::Delete { id } => {
            service.delete_user(id).await?;
            writeln!(out, "deleted {id}")?;
        }
        UserCommand::Exists { username } => {
            let exists = service.username_exists(&username).await?;
            writeln!(out, "{exists}")?;
        }
    }
    Ok(())
}

fn render_user(user: &User) -> String {
    format!("{}\t{}\t{}", user.id(), user.username, user.email)
}
