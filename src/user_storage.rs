pub mod sqlite;
pub use sqlite::SqliteStorage;

use crate::password::{InvalidCredentialFormat, RandomSourceError};

#[async_trait::async_trait]
pub trait UserStorage: Sync + Send {
    async fn register(&self, info: &crate::forms::Register) -> Result<UserId, Error>;

    async fn check_credentials(&self, email: &str, pass: &str) -> Result<UserAccount, Error>;

    async fn fetch_account(&self, id: UserId) -> Result<UserAccount, Error>;

    async fn change_password(&self, id: UserId, old: &str, new: &str) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("User does not exist")]
    UserDoesNotExist,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Email is already registered")]
    EmailExists,

    #[error("Stored credential is corrupt: {0}")]
    CorruptCredential(#[from] InvalidCredentialFormat),

    #[error("{0}")]
    RandomSource(#[from] RandomSourceError),

    #[error("{0}")]
    Generic(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether the error is the user's fault, as opposed to the server's.
    pub fn is_rejected_login(&self) -> bool {
        matches!(self, Error::UserDoesNotExist | Error::InvalidPassword)
    }
}

impl warp::reject::Reject for Error {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct UserId(pub i64);

#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
