pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::JwtAuthenticator;
use crate::config::config;
use crate::database::PgStore;

#[derive(Parser)]
#[command(name = "menuctl")]
#[command(about = "Operator tooling for the Menu API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Issue a bearer token signed with JWT_SECRET")]
    Token {
        #[arg(long, default_value = "admin", help = "Subject recorded in the token")]
        subject: String,

        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Apply database migrations")]
    Migrate {
        #[arg(long, env = "DATABASE_URL", help = "Postgres connection string")]
        database_url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { subject, hours } => {
            let security = &config().security;
            let auth = JwtAuthenticator::new(
                security.jwt_secret.clone(),
                hours.unwrap_or(security.jwt_expiry_hours),
            )?;
            let token = auth.issue_token(&subject)?;

            match output_format {
                OutputFormat::Json => utils::output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "subject": subject, "token": token })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        Commands::Migrate { database_url } => {
            let store = PgStore::connect(&database_url, &config().database).await?;
            store.migrate().await?;
            store.close().await;
            utils::output_success(&output_format, "Migrations applied", None)
        }
    }
}
