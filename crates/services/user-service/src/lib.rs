//! User Service Library
//!
//! Layered user management over a relational database: a console front end
//! calls the [`service::UserService`], which validates input and delegates to
//! the [`repository::UserRepository`], which runs every write in its own
//! transaction.

pub mod config;
pub mod console;
pub mod infra;
pub mod repository;
pub mod service;

use std::io;
use std::sync::Arc;

use tracing::info;

use crate::config::UserServiceConfig;
use crate::console::Console;
use crate::infra::{bootstrap, Database, UnitOfWork};
use crate::repository::UserStore;
use crate::service::UserManager;

/// Run the interactive console until the user exits.
///
/// Creates the database if needed, applies pending migrations, then wires
/// storage, service and console together over stdin and stdout. The pool is
/// closed on every exit path once it has been opened.
pub async fn run_console(
    config: UserServiceConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::ensure_database(&config.database).await?;

    let db = Database::connect(&config.database).await?;
    if let Err(e) = db.ping().await {
        db.close().await?;
        return Err(e.into());
    }
    info!("Database ready: {:?}", config.database);

    let uow = UnitOfWork::new(db.get_connection());
    let user_repo = Arc::new(UserStore::new(uow));
    let user_service = Arc::new(UserManager::new(user_repo));

    let stdin = io::BufReader::new(io::stdin());
    let mut console = Console::new(user_service, stdin, io::stdout()).with_json(json);
    let result = console.run().await;

    db.close().await?;
    Ok(result?)
}

/// Create the configured database if it does not exist yet.
pub async fn init_database(config: UserServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::ensure_database(&config.database).await?;
    info!("Database is available");
    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: UserServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    let result = match action {
        MigrateAction::Up => db.run_migrations().await.map(|_| {
            info!("Migrations applied successfully");
        }),
        MigrateAction::Down => db.rollback_migration().await.map(|_| {
            info!("Rolled back last migration");
        }),
        MigrateAction::Status => db.migration_status().await.map(|status| {
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }),
        MigrateAction::Fresh => db.fresh_migrations().await.map(|_| {
            info!("Database reset and migrations applied");
        }),
    };

    db.close().await?;
    Ok(result?)
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
