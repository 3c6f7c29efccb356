use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tallybook={level},server={level},store={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("database ready");

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(db, listener).await?;

    Ok(())
}

/// Connects, retrying `connect_retries` times with a fixed delay.
async fn connect(
    config: &settings::Database,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = ConnectOptions::new(config.connection_url()?);
    options.sqlx_logging(config.sqlx_logging);
    if let Some(max) = config.max_connections {
        options.max_connections(max);
    }

    let mut attempt = 0;
    loop {
        match sea_orm::Database::connect(options.clone()).await {
            Ok(db) => return Ok(db),
            Err(err) if attempt < config.connect_retries => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    retries = config.connect_retries,
                    "database connection failed: {err}, retrying in {}s",
                    config.retry_delay_secs
                );
                tokio::time::sleep(Duration::from_secs(config.retry_delay_secs)).await;
            }
            Err(err) => {
                tracing::error!("failed to initialize database: {err}");
                return Err(err.into());
            }
        }
    }
}
