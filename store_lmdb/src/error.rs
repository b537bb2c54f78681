use lattice_blocks::BlockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored block is corrupted: {0}")]
    Block(#[from] BlockError),
}

impl From<LmdbError> for lattice_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Block(inner) => lattice_store::StoreError::Corruption(inner.to_string()),
            other => lattice_store::StoreError::Backend(other.to_string()),
        }
    }
}
