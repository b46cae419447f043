use super::{Error, UserAccount, UserId};
use crate::password::{self, Credential};
use sqlx::SqlitePool;

impl From<sqlx::Error> for Error {
    fn from(other: sqlx::Error) -> Error {
        match other {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::EmailExists
            }
            sqlx::Error::RowNotFound => Error::UserDoesNotExist,
            _ => Error::Generic(other.into()),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(other: tokio::task::JoinError) -> Error {
        Error::Generic(other.into())
    }
}

pub struct SqliteStorage(SqlitePool);

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self(pool)
    }

    async fn credential_for(&self, id: UserId) -> Result<Credential, Error> {
        let (stored,): (String,) = sqlx::query_as("SELECT credential FROM users WHERE id = ?")
            .bind(id.0)
            .fetch_one(&self.0)
            .await?;
        Ok(Credential::parse(stored)?)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    credential: String,
}

/// Runs the credential check off the async executor, it's 100k hash rounds.
async fn verify(stored: String, pass: &str) -> Result<bool, Error> {
    let pass = pass.to_owned();
    Ok(tokio::task::spawn_blocking(move || password::verify(&pass, &stored)).await??)
}

async fn derive(pass: &str) -> Result<Credential, Error> {
    let pass = pass.to_owned();
    Ok(tokio::task::spawn_blocking(move || password::hash(&pass)).await??)
}

#[async_trait::async_trait]
impl super::UserStorage for SqliteStorage {
    async fn register(&self, info: &crate::forms::Register) -> Result<UserId, Error> {
        let credential = derive(&info.password).await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users(name, email, credential) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&info.name)
        .bind(info.email.trim())
        .bind(credential.as_str())
        .fetch_one(&self.0)
        .await?;

        tracing::info!(user_id = id, "registered new user");
        Ok(UserId(id))
    }

    async fn check_credentials(&self, email: &str, pass: &str) -> Result<UserAccount, Error> {
        let row: UserRow =
            sqlx::query_as("SELECT id, name, email, credential FROM users WHERE email = ?")
                .bind(email.trim())
                .fetch_optional(&self.0)
                .await?
                .ok_or(Error::UserDoesNotExist)?;

        let valid = verify(row.credential, pass).await.map_err(|e| {
            if let Error::CorruptCredential(_) = e {
                tracing::error!(user_id = row.id, "{}", e);
            }
            e
        })?;

        if valid {
            Ok(UserAccount {
                id: UserId(row.id),
                name: row.name,
                email: row.email,
            })
        } else {
            Err(Error::InvalidPassword)
        }
    }

    async fn fetch_account(&self, id: UserId) -> Result<UserAccount, Error> {
        let (name, email): (String, String) =
            sqlx::query_as("SELECT name, email FROM users WHERE id = ?")
                .bind(id.0)
                .fetch_one(&self.0)
                .await?;

        Ok(UserAccount { id, name, email })
    }

    async fn change_password(&self, id: UserId, old: &str, new: &str) -> Result<(), Error> {
        let current = self.credential_for(id).await?;
        if !verify(current.into_string(), old).await? {
            return Err(Error::InvalidPassword);
        }

        let replacement = derive(new).await?;
        sqlx::query("UPDATE users SET credential = ? WHERE id = ?")
            .bind(replacement.as_str())
            .bind(id.0)
            .execute(&self.0)
            .await?;

        tracing::info!(user_id = id.0, "password changed");
        Ok(())
    }
}
