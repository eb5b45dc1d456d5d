use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    NotFound,
    InvalidInput,
    Collision,
    Corrupted,
    Locked,
}

#[derive(Debug, ThisError)]
#[error("{kind:?}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn invalid_input(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::InvalidInput, context.into())
    }

    pub fn not_found(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::NotFound, context.into())
    }

    pub fn corrupted(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Corrupted, context.into())
    }

    /// Message shown to whoever submitted the request.
    pub fn status(&self) -> String {
        match self.kind {
            ErrorKind::InvalidInput | ErrorKind::NotFound | ErrorKind::Collision => {
                self.context.clone()
            }
            _ => format!("Unable to save comic: {}", self.context),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidInput)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<redb::Error> for Error {
    fn from(err: redb::Error) -> Self {
        let kind = match &err {
            redb::Error::DatabaseAlreadyOpen => ErrorKind::Locked,
            redb::Error::Corrupted(_) => ErrorKind::Corrupted,
            _ => ErrorKind::Io,
        };
        Error {
            kind,
            context: format!("Storage error: {}", err),
        }
    }
}

macro_rules! from_redb {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Error {
                fn from(err: $source) -> Self {
                    redb::Error::from(err).into()
                }
            }
        )*
    };
}

from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    redb::CompactionError
);

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: format!("JSON error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
