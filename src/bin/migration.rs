//! Applies, reverts or reports the embedded schema migrations.
//!
//! Run with: cargo run --bin migration -- up

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use coffee_grinder::{
    config,
    db::{self, DbConfig},
    migrator::Migrator,
};

#[derive(Debug, Parser)]
#[command(name = "migration", about = "Coffee Grinder schema migrations")]
struct Cli {
    /// Overrides the configured database URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Revert applied migrations, one step by default
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// List migrations and whether they are applied
    Status,
    /// Drop every table and apply all migrations again
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config().context("loading configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let mut db_config = DbConfig::from(&cfg);
    if let Some(url) = cli.database_url {
        db_config.url = url;
    }
    let pool = db::establish_connection_with_config(&db_config)
        .await
        .context("connecting to the database")?;

    match cli.command {
        Command::Up { steps } => {
            Migrator::up(&pool, steps).await?;
            info!("Migrations applied");
        }
        Command::Down { steps } => {
            Migrator::down(&pool, Some(steps)).await?;
            info!(steps, "Migrations reverted");
        }
        Command::Status => Migrator::status(&pool).await?,
        Command::Fresh => {
            Migrator::fresh(&pool).await?;
            info!("Schema recreated");
        }
    }

    db::close_pool(pool).await?;
    Ok(())
}
