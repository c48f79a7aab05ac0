use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "pennywise_admin")]
#[command(about = "Admin utilities for Pennywise (schema and ledger maintenance)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pennywise.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Migrate(Migrate),
    Balances(Balances),
}

#[derive(Args, Debug)]
struct Migrate {
    #[command(subcommand)]
    command: MigrateCommand,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply every pending migration.
    Up,
    /// Roll back the last applied migration.
    Down,
    /// Drop all tables and reapply every migration.
    Fresh,
    /// Print applied and pending migrations.
    Status,
}

#[derive(Args, Debug)]
struct Balances {
    #[command(subcommand)]
    command: BalancesCommand,
}

#[derive(Subcommand, Debug)]
enum BalancesCommand {
    /// Report accounts whose stored balance differs from the ledger.
    Check(UserArgs),
    /// Rewrite stored balances from the ledger.
    Recompute(UserArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[arg(long)]
    user_id: i32,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn run_migration(
    database_url: &str,
    command: MigrateCommand,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    match command {
        MigrateCommand::Up => migration::Migrator::up(&db, None).await?,
        MigrateCommand::Down => migration::Migrator::down(&db, Some(1)).await?,
        MigrateCommand::Fresh => migration::Migrator::fresh(&db).await?,
        MigrateCommand::Status => migration::Migrator::status(&db).await?,
    }
    db.close().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Migrate(Migrate { command }) => {
            run_migration(&cli.database_url, command).await?;
            println!("migration done");
            return Ok(());
        }
        Command::Balances(Balances { command }) => command,
    };

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match command {
        BalancesCommand::Check(args) => {
            let mismatches = engine.verify_balances(args.user_id).await?;
            if mismatches.is_empty() {
                println!("all balances match the ledger");
            }
            for mismatch in &mismatches {
                println!(
                    "account {}: stored {} ledger {}",
                    mismatch.account_id, mismatch.stored, mismatch.ledger
                );
            }
            engine.shutdown().await?;
            if !mismatches.is_empty() {
                std::process::exit(1);
            }
        }
        BalancesCommand::Recompute(args) => {
            let fixed = engine.recompute_balances(args.user_id).await?;
            for mismatch in &fixed {
                println!(
                    "account {}: {} -> {}",
                    mismatch.account_id, mismatch.stored, mismatch.ledger
                );
            }
            println!("recomputed {} account(s)", fixed.len());
            engine.shutdown().await?;
        }
    }

    Ok(())
}
