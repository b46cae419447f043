use snafu::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{path::PathBuf, str::FromStr};

#[derive(snafu::Snafu, Debug)]
pub enum ConnectionError {
    #[snafu(display("Can't create parent directory for sqlite database in {}: {}", parent.display(), source))]
    CreateParent {
        parent: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Can't open sqlite database {}: {}", path, source))]
    Connect { path: String, source: sqlx::Error },

    #[snafu(display("Could not create schema: {}", source))]
    CreateSchema { source: sqlx::Error },
}

pub async fn open(path: &str, max_connections: u32) -> Result<sqlx::SqlitePool, ConnectionError> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|_| CreateParentSnafu {
                parent: parent.to_owned(),
            })?;
    }

    let url = format!("sqlite://{}", path);
    let options = SqliteConnectOptions::from_str(&url)
        .with_context(|_| ConnectSnafu {
            path: path.to_owned(),
        })?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|_| ConnectSnafu {
            path: path.to_owned(),
        })?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// A single connection, every connection to `:memory:` is its own database.
#[cfg(test)]
pub async fn open_in_memory() -> Result<sqlx::SqlitePool, ConnectionError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .with_context(|_| ConnectSnafu {
            path: ":memory:".to_owned(),
        })?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|_| ConnectSnafu {
            path: ":memory:".to_owned(),
        })?;

    create_schema(&pool).await?;
    Ok(pool)
}

async fn create_schema(pool: &sqlx::SqlitePool) -> Result<(), ConnectionError> {
    for statement in sql_file!("schema")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context(CreateSchemaSnafu)?;
    }

    Ok(())
}
