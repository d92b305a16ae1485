use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while discovering, applying, or rolling back migrations.
///
/// Each variant corresponds to one failure class the engine distinguishes
/// when deciding whether to abort a batch or continue.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A script file or directory could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database could not be reached
    #[error("failed to connect to {url}: {source}")]
    Connection {
        /// Password-masked connection URL for display
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// A script's SQL failed inside its transaction
    #[error("error executing {script}: {source}")]
    Execution {
        script: String,
        #[source]
        source: sqlx::Error,
    },

    /// A version was recorded twice in the ledger
    #[error("migration {version} is already recorded as applied")]
    LedgerConflict { version: String },

    /// Rollback was requested for a migration with no down section
    #[error("no DOWN migration found in {script}")]
    MissingDownScript { script: String },

    /// A migration file has nothing before the DOWN delimiter
    #[error("migration {script} has an empty UP section")]
    EmptyUpSection { script: String },
}

pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    /// Classify a sqlx error raised by a ledger insert.
    ///
    /// A unique violation on the version column means the same migration was
    /// recorded twice; everything else is an execution failure. Only the
    /// ledger's own INSERT goes through this — a unique violation raised by
    /// a script body is that script failing and stays an `Execution` error.
    pub fn from_sqlx(script: &str, err: sqlx::Error) -> Self {
        let unique_violation = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());

        if unique_violation {
            MigrateError::LedgerConflict {
                version: script.to_string(),
            }
        } else {
            MigrateError::Execution {
                script: script.to_string(),
                source: err,
            }
        }
    }
}
