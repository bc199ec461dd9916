//! Error types for dagload

use thiserror::Error;

/// Result type alias for dagload operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// Main error type for dagload
///
/// Everything except [`LoadError::Store`] is a configuration or graph error:
/// it is raised before the first batch is written and aborts the run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No stream or file input defined. Define either a --file and/or a --stream input.")]
    NoInput,

    #[error("Unknown model: '{0}' is not known to the metadata provider")]
    UnknownModel(String),

    #[error("Unsupported format '{found}' for {source_name}. Supported formats: {supported}")]
    UnsupportedFormat {
        source_name: String,
        found: String,
        supported: String,
    },

    #[error("Unsupported subfield notation in column '{column}' of {model}: only '/id' and '/.id' suffixes on a top-level field can be resolved")]
    UnsupportedSubfield { model: String, column: String },

    #[error("Duplicate index value '{value}' in dataset {model}")]
    DuplicateIndex { model: String, value: String },

    #[error("Model {model} is provided by more than one input: {first} and {second}")]
    DuplicateModel { model: String, first: String, second: String },

    #[error("Dataset {0} has no columns")]
    MissingIndex(String),

    #[error("Invalid batch size {0}: must be greater than 0")]
    InvalidBatchSize(usize),

    #[error("Cyclic parent hierarchy in dataset {model}: rows {rows:?} reference each other")]
    HierarchyCycle { model: String, rows: Vec<String> },

    #[error("Cyclic references between datasets: {models:?}. No safe loading order exists.")]
    ReferenceCycle { models: Vec<String> },

    #[error("Parse error in {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoadError {
    /// Create a parse error for the given input
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
