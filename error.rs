use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File Not Readable: {0}")]
    FileNotReadable(String),

    #[error("Persistence Error: {0}")]
    Persistence(String),

    #[error("Nothing to export: the catalog is empty")]
    NothingToExport,

    #[error("Path Error: {0}")]
    Path(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Register(#[from] RegisterError),
}

/// Login failures. Recoverable: the user retries with other credentials.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,
}

/// Registration validation failures, checked in this order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("all fields are required")]
    MissingField,

    #[error("username must be at least 3 characters")]
    UsernameTooShort,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("username already exists")]
    UsernameTaken,
}
