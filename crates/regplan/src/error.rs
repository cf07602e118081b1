use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableError>;

/// Errors raised while loading or validating regulatory tables.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read tables file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed tables document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown interference table key '{0}'")]
    UnknownTableKey(String),

    #[error("unknown bandwidth '{0}' (expected 6.25, 12.5 or 25)")]
    UnknownBandwidth(String),

    #[error("unknown network mode '{0}'")]
    UnknownMode(String),

    #[error("inverted range {start}..{end} MHz in {section}")]
    InvertedRange {
        section: &'static str,
        start: f64,
        end: f64,
    },

    #[error("table {key} is not valid in the {matrix} matrix")]
    MisplacedTable { matrix: &'static str, key: String },

    #[error("embedded tables are invalid: {0}")]
    Embedded(String),

    #[error("negative separation distance {0} km")]
    NegativeDistance(f64),
}
