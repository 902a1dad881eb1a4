//! Database bootstrap.
//!
//! Makes sure the target PostgreSQL database exists before the pool and the
//! migrations are set up. SQLite creates its file on connect, so nothing is
//! done for it.

use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase, DbErr};

use common::DatabaseConfig;

/// Database every PostgreSQL server ships with, used to issue `CREATE DATABASE`
const MAINTENANCE_DATABASE: &str = "postgres";

/// Ensure the database named in `config.url` exists, creating it if needed.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<(), DbErr> {
    if !config.url.starts_with("postgres") {
        tracing::debug!("Skipping database bootstrap for non-PostgreSQL URL");
        return Ok(());
    }

    match SeaDatabase::connect(single_connection(&config.url)).await {
        Ok(connection) => {
            connection.close().await?;
            tracing::info!("Database connection test successful");
            return Ok(());
        }
        Err(e) => {
            tracing::warn!("Database connection failed ({}), attempting to create database", e);
        }
    }

    let (admin_url, name) = maintenance_url(&config.url)
        .ok_or_else(|| DbErr::Custom("Database URL does not name a database".to_string()))?;

    let admin = SeaDatabase::connect(single_connection(&admin_url)).await?;
    let statement = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));

    let result = match admin.execute_unprepared(&statement).await {
        Ok(_) => {
            tracing::info!("Database '{}' created successfully", name);
            Ok(())
        }
        Err(e) if e.to_string().contains("already exists") => {
            tracing::info!("Database '{}' already exists, continuing", name);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to create database '{}': {}", name, e);
            Err(e)
        }
    };

    admin.close().await?;
    result
}

fn single_connection(url: &str) -> ConnectOptions {
    let mut options = ConnectOptions::new(url.to_string());
    options.max_connections(1).sqlx_logging(false);
    options
}

/// Split a PostgreSQL URL into the URL of the maintenance database on the
/// same server and the name of the target database.
///
/// Query parameters are carried over to the maintenance URL.
fn maintenance_url(url: &str) -> Option<(String, String)> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, format!("?{}", query)),
        None => (url, String::new()),
    };

    let (server, name) = base.rsplit_once('/')?;
    if name.is_empty() || server.ends_with('/') {
        return None;
    }

    Some((
        format!("{}/{}{}", server, MAINTENANCE_DATABASE, query),
        name.to_string(),
    ))
}
