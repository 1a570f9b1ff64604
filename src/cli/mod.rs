pub mod server;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config::{AppConfig, Environment};
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::Store;
use crate::services::UserService;

#[derive(Parser)]
#[command(name = "cat-api-rust")]
#[command(about = "Cat API - cats, their owners and where they were seen")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides CAT_API_PORT")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store even if DATABASE_URL is set")]
        memory: bool,
    },

    #[command(about = "Create or update the Postgres schema")]
    Migrate,

    #[command(about = "Grant the admin role to an existing user")]
    Promote {
        #[arg(help = "Email of the user to promote")]
        email: String,
    },
}

pub async fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => {
            let mut config = config.clone();
            if let Some(port) = port {
                config.server.port = port;
            }
            check_security(&config)?;

            let store = open_store(&config, memory).await?;
            server::serve(store, &config).await
        }
        Commands::Migrate => {
            let store = connect_postgres(config).await?;
            store.migrate().await?;
            store.close().await;
            println!("Migrations applied");
            Ok(())
        }
        Commands::Promote { email } => {
            let store = connect_postgres(config).await?;
            let users = UserService::new(Arc::new(store), config.security.password_rounds);
            let user = users
                .promote(&email)
                .await
                .with_context(|| format!("failed to promote {}", email))?;
            println!("{} ({}) is now an admin", user.email, user.id);
            Ok(())
        }
    }
}

fn check_security(config: &AppConfig) -> Result<()> {
    if config.security.jwt_secret.trim().is_empty() {
        if config.environment == Environment::Production {
            bail!("SECURITY_JWT_SECRET must be set in production");
        }
        bail!("JWT secret is empty; set SECURITY_JWT_SECRET or JWT_SECRET");
    }
    Ok(())
}

async fn connect_postgres(config: &AppConfig) -> Result<PgStore> {
    PgStore::connect(&config.database)
        .await
        .context("failed to connect to Postgres (is DATABASE_URL set?)")
}

async fn open_store(config: &AppConfig, memory: bool) -> Result<Arc<dyn Store>> {
    if !memory && config.database.url.is_none() && config.environment == Environment::Production {
        bail!("DATABASE_URL must be set in production (pass --memory to run without a database)");
    }
    if memory || config.database.url.is_none() {
        tracing::warn!("Using the in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = connect_postgres(config).await?;
    if config.database.run_migrations {
        store.migrate().await?;
    }
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["cat-api-rust"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["cat-api-rust", "serve", "--port", "4000", "--memory"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port, memory }) => {
                assert_eq!(port, Some(4000));
                assert!(memory);
            }
            _ => panic!("expected serve"),
        }
    }

    fn production_config() -> AppConfig {
        let mut config = AppConfig::production();
        config.security.jwt_secret = "prod-secret".to_string();
        config.database.url = None;
        config
    }

    #[tokio::test]
    async fn production_without_database_url_refuses_to_start() {
        let result = open_store(&production_config(), false).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn explicit_memory_flag_is_honoured_in_production() {
        assert!(open_store(&production_config(), true).await.is_ok());
    }

    #[tokio::test]
    async fn development_falls_back_to_memory() {
        let mut config = AppConfig::development();
        config.database.url = None;
        assert!(open_store(&config, false).await.is_ok());
    }

    #[test]
    fn promote_needs_an_email() {
        assert!(Cli::try_parse_from(["cat-api-rust", "promote"]).is_err());
    }
}
