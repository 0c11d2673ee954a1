use miette::Diagnostic;
use thiserror::Error;

use crate::core::BlockReason;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    #[diagnostic(code(sqlguard::database))]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(sqlguard::json))]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(sqlguard::io))]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    #[diagnostic(code(sqlguard::server))]
    Server(String),

    #[error("SQL input too large: {len} bytes (max {max})")]
    #[diagnostic(
        code(sqlguard::input_too_large),
        help("treat oversized input as blocked, or raise --max-input-len")
    )]
    InputTooLarge { len: usize, max: usize },

    #[error("Blocked: {0}")]
    #[diagnostic(code(sqlguard::blocked))]
    Blocked(BlockReason),

    #[error("Writes are disabled in read-only mode")]
    #[diagnostic(code(sqlguard::writes_disabled), help("run with --mode no-ddl or --mode read-write"))]
    WritesDisabled,
}

impl Error {
    // callers must not run the statement when this is true
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Blocked(_) | Self::InputTooLarge { .. } | Self::WritesDisabled
        )
    }
}
