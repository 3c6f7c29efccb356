use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Applies or inspects the Tallybook schema.
#[derive(Debug, Parser)]
#[command(name = "migration", disable_version_flag = true)]
struct Cli {
    /// Database to migrate.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tallybook.db?mode=rwc"
    )]
    database_url: String,
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Action {
    /// Apply every pending migration (default).
    Up,
    /// Roll back the last applied migration.
    Down,
    /// Drop all tables and reapply every migration.
    Fresh,
    /// List applied and pending migrations.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.action.unwrap_or(Action::Up) {
        Action::Up => migration::Migrator::up(&db, None).await?,
        Action::Down => migration::Migrator::down(&db, Some(1)).await?,
        Action::Fresh => migration::Migrator::fresh(&db).await?,
        Action::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_is_the_default_action() {
        let cli = Cli::try_parse_from(["migration", "--database-url", "sqlite::memory:"]).unwrap();
        assert_eq!(cli.action, None);
        assert_eq!(cli.database_url, "sqlite::memory:");
    }

    #[test]
    fn parses_actions() {
        let cli = Cli::try_parse_from(["migration", "--database-url", "x", "fresh"]).unwrap();
        assert_eq!(cli.action, Some(Action::Fresh));
        assert!(Cli::try_parse_from(["migration", "sideways"]).is_err());
    }
}
