use thiserror::Error;

use crate::columns::Field;

pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised while reading a license register.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read register: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed register: {0}")]
    Csv(#[from] csv::Error),

    #[error("register has no {0} column")]
    MissingColumn(Field),
}
