use thiserror::Error;

/// All possible errors in the table client
#[derive(Error, Debug)]
pub enum CrudError {
    /// Table or column metadata is missing or ambiguous
    #[error("Schema error: {0}")]
    Schema(String),

    /// A statement could not be built or was malformed
    #[error("Query error: {0}")]
    Query(String),

    /// The database refused a write; the transaction was rolled back
    #[error("Write failed on '{table}': {source}")]
    Write {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("No row in '{table}' with {column} = {key}")]
    NotFound {
        table: String,
        column: String,
        key: String,
    },

    #[error("No row selected")]
    NoSelection,

    #[error("Value required for column '{0}'")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database not found. Run `tablecrud init` first or pass --db.")]
    NotInitialized,

    #[error("Database already exists")]
    AlreadyInitialized,
}

impl CrudError {
    pub(crate) fn unknown_table(table: &str) -> Self {
        CrudError::Schema(format!("unknown table '{table}'"))
    }

    /// Short category name, used in status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            CrudError::Schema(_) => "schema",
            CrudError::Query(_) => "query",
            CrudError::Write { .. } => "write",
            CrudError::NotFound { .. } => "not-found",
            CrudError::NoSelection => "selection",
            CrudError::Validation(_) => "validation",
            CrudError::Db(_) => "database",
            CrudError::Io(_) => "io",
            CrudError::Json(_) => "json",
            CrudError::NotInitialized | CrudError::AlreadyInitialized => "setup",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CrudError>;
