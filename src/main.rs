//! docdesk - administrative control plane for a multi-tenant document wiki
//!
//! Runs the admin API, applies migrations, creates the first administrator
//! and mints session tokens for scripted access.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docdesk_api::{ApiServer, ApiServerConfig};
use docdesk_auth::token::MAX_TOKEN_SIZE;
use docdesk_auth::{JwtValidator, SessionClaims, TokenAlphabet};
use docdesk_control::{ControlConfig, ControlPlane};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// docdesk - member, book and ownership administration
#[derive(Parser, Debug)]
#[command(name = "docdesk")]
#[command(about = "docdesk - administrative control plane for a document wiki")]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Database URL (sqlite://docdesk.db?mode=rwc or postgres://...)
    #[arg(
        long,
        global = true,
        env = "DOCDESK_DATABASE_URL",
        default_value = "sqlite://docdesk.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run migrations and serve the admin API
    Serve(ServeArgs),

    /// Apply pending database migrations
    Migrate,

    /// Create the first super-administrator of an empty installation
    BootstrapAdmin {
        #[arg(long)]
        account: String,

        #[arg(long, env = "DOCDESK_ADMIN_PASSWORD")]
        password: String,

        #[arg(long)]
        email: String,
    },

    /// Print a session token for a member (for scripts and API clients)
    SessionToken {
        #[arg(long)]
        member_id: i32,

        #[arg(long, env = "DOCDESK_JWT_SECRET")]
        jwt_secret: String,

        /// Validity in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind the admin API
    #[arg(long, env = "DOCDESK_BIND_ADDR", default_value = "127.0.0.1:8181")]
    bind_addr: SocketAddr,

    /// Secret used to sign and validate session tokens
    #[arg(long, env = "DOCDESK_JWT_SECRET")]
    jwt_secret: String,

    /// Public base URL used in reader access links
    #[arg(long, env = "DOCDESK_BASE_URL", default_value = "http://127.0.0.1:8181")]
    base_url: String,

    /// Access token length when the TOKEN_SIZE site option is unset
    #[arg(long, default_value = "32")]
    token_size: usize,

    /// Access token alphabet (numeric, lower, upper, all)
    #[arg(long, default_value = "all")]
    token_alphabet: TokenAlphabet,

    /// Storage timeout per operation, in milliseconds
    #[arg(long, default_value = "5000")]
    storage_timeout_ms: u64,

    /// Validity of session tokens issued at login, in hours
    #[arg(long, default_value = "24")]
    session_hours: i64,

    /// Clear a book's access token when it is made public
    #[arg(long)]
    revoke_token_on_public: bool,

    /// Allow cross-origin requests from localhost (development)
    #[arg(long)]
    enable_cors: bool,
}

impl ServeArgs {
    fn control_config(&self) -> Result<ControlConfig> {
        if !(1..=MAX_TOKEN_SIZE).contains(&self.token_size) {
            bail!("--token-size must be between 1 and {}", MAX_TOKEN_SIZE);
        }

        Ok(ControlConfig {
            base_url: self.base_url.clone(),
            token_size: self.token_size,
            token_alphabet: self.token_alphabet,
            storage_timeout: Duration::from_millis(self.storage_timeout_ms),
            revoke_token_on_public: self.revoke_token_on_public,
            ..ControlConfig::default()
        })
    }
}

/// RUST_LOG wins; otherwise the --log-level value
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

async fn open_database(database_url: &str) -> Result<sea_orm::DatabaseConnection> {
    let db = docdesk_db::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    docdesk_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Serve(args) => {
            let config = args.control_config()?;
            let db = open_database(&cli.database_url).await?;
            let plane = ControlPlane::new(db, config);

            let server = ApiServer::new(
                ApiServerConfig {
                    bind_addr: args.bind_addr,
                    enable_cors: args.enable_cors,
                    jwt_secret: args.jwt_secret,
                    session_ttl: chrono::Duration::hours(args.session_hours),
                },
                plane,
            );
            server.start().await?;
        }
        Commands::Migrate => {
            open_database(&cli.database_url).await?;
            info!("Database is up to date");
        }
        Commands::BootstrapAdmin {
            account,
            password,
            email,
        } => {
            let db = open_database(&cli.database_url).await?;
            let plane = ControlPlane::new(db, ControlConfig::default());

            match plane
                .identity
                .bootstrap_administrator(&account, &password, &email)
                .await
                .context("Failed to create administrator")?
            {
                Some(member) => {
                    info!(member_id = member.member_id, account = %member.account, "Administrator created");
                    println!("{}", member.member_id);
                }
                None => bail!("Members already exist; bootstrap only runs on an empty installation"),
            }
        }
        Commands::SessionToken {
            member_id,
            jwt_secret,
            hours,
        } => {
            let claims = SessionClaims::new(member_id, chrono::Duration::hours(hours));
            let token = JwtValidator::encode(jwt_secret.as_bytes(), &claims)
                .context("Failed to encode session token")?;
            println!("{}", token);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::try_parse_from([
            "docdesk",
            "serve",
            "--jwt-secret",
            "s3cret",
            "--token-size",
            "40",
            "--token-alphabet",
            "numeric",
            "--revoke-token-on-public",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let config = args.control_config().unwrap();
        assert_eq!(config.token_size, 40);
        assert_eq!(config.token_alphabet, TokenAlphabet::Numeric);
        assert!(config.revoke_token_on_public);
        assert_eq!(config.document_route, "/docs");
    }

    #[test]
    fn test_zero_token_size_rejected() {
        let cli = Cli::try_parse_from([
            "docdesk",
            "serve",
            "--jwt-secret",
            "s3cret",
            "--token-size",
            "0",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.control_config().is_err());
    }

    #[test]
    fn test_oversized_token_size_rejected() {
        let cli = Cli::try_parse_from([
            "docdesk",
            "serve",
            "--jwt-secret",
            "s3cret",
            "--token-size",
            "501",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.control_config().is_err());
    }
}
