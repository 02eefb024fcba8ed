use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use crate::utils::config::DbConfig;

pub type Db = SqlitePool;

pub mod session;
pub mod submission;

/// Create a new db connection pool, initializing and running migrations if necessary.
pub async fn init(db_config: &DbConfig) -> anyhow::Result<Db> {
    let url = format!("sqlite://{}", db_config.file.display());
    if !Sqlite::database_exists(&url).await? {
        Sqlite::create_database(&url).await?;
    }
    let db = SqlitePool::connect(&url).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    Ok(db)
}

/// In-memory database for tests. A single connection keeps every query on
/// the same `:memory:` instance.
#[cfg(test)]
pub async fn test_db() -> Db {
    let db = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&db).await.unwrap();
    db
}
