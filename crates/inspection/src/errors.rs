use uuid::Uuid;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no mesh loaded")]
    NoMesh,

    #[error("hole not found: {id}")]
    HoleNotFound { id: Uuid },

    #[error("face footprint not found: {id}")]
    FootprintNotFound { id: Uuid },
}

/// Errors while producing or reading an export record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("no mesh loaded")]
    NoMesh,

    #[error("failed to serialize export record: {0}")]
    Serialize(String),

    #[error("failed to parse export record: {0}")]
    Parse(String),
}
