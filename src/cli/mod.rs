pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cafm")]
#[command(about = "CAFM admin CLI - tenant bootstrap and operations tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Company (tenant) management")]
    Company {
        #[command(subcommand)]
        cmd: commands::company::CompanyCommands,
    },

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Load seed data from a YAML fixture file")]
    Fixture {
        #[command(subcommand)]
        cmd: commands::fixture::FixtureCommands,
    },

    #[command(about = "Check database connectivity")]
    Health,
}

#[derive(Debug, Clone, Copy)]
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
        Commands::Company { cmd } => commands::company::handle(cmd, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Fixture { cmd } => commands::fixture::handle(cmd, output_format).await,
        Commands::Health => commands::health(output_format).await,
    }
}
