use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("record is corrupted: {0}")]
    Corruption(String),

    #[error("database schema version {stored} is newer than supported version {supported}")]
    VersionTooNew { stored: u32, supported: u32 },
}
