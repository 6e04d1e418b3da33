use thiserror::Error;

/// Storage error taxonomy.
///
/// The first three variants are sentinels callers match on; everything else
/// is carried in [`Error::Database`] together with the operation that failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("{op}: {source}")]
    Database {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("migration failed: {0:#}")]
    Migration(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists)
    }
}

/// Translates a backing store's native failure shapes into the sentinel
/// kinds, so entity modules never inspect driver-specific error codes.
pub(crate) trait ConflictAdapter {
    fn is_unique_violation(&self, err: &sqlx::Error) -> bool;
    fn is_no_rows(&self, err: &sqlx::Error) -> bool;
}

/// Adapter for sqlx's SQLite driver.
pub(crate) struct SqliteConflicts;

impl ConflictAdapter for SqliteConflicts {
    fn is_unique_violation(&self, err: &sqlx::Error) -> bool {
        match err {
            sqlx::Error::Database(db) => {
                matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
            }
            _ => false,
        }
    }

    fn is_no_rows(&self, err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::RowNotFound)
    }
}

/// Maps a write failure: unique-constraint conflicts become
/// [`Error::AlreadyExists`], everything else is wrapped with the operation
/// name.
pub(crate) fn map_create_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| {
        if SqliteConflicts.is_unique_violation(&err) {
            Error::AlreadyExists
        } else {
            Error::Database { op, source: err }
        }
    }
}

/// Maps a read failure: zero rows become [`Error::NotFound`], everything
/// else is wrapped with the operation name.
pub(crate) fn map_get_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| {
        if SqliteConflicts.is_no_rows(&err) {
            Error::NotFound
        } else {
            Error::Database { op, source: err }
        }
    }
}

/// Maps any other failure, keeping its kind, with the operation name.
pub(crate) fn map_db_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| Error::Database { op, source: err }
}

/// A stored value that does not map back onto the domain model (e.g. an
/// unknown category string). Treated as a database-level failure.
pub(crate) fn decode_err(op: &'static str, message: String) -> Error {
    Error::Database {
        op,
        source: sqlx::Error::Decode(message.into()),
    }
}
