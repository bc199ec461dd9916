//! Error types for the dagload CLI
//!
//! Every variant renders as a message a user can act on; `main` prints it
//! after `Error:` and exits with status 1.

use dagload_common::LoadError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Any failure raised by the loader itself (inputs, graph, log)
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Input names a model the target database does not have
    #[error("'{input}' does not name a known model: '{model}'. For csv and json inputs the file name (before the extension) or the stream's model argument must be the model, e.g. res.partner.csv.")]
    InvalidModel { input: String, model: String },

    /// The server answered the RPC call with an error
    #[error("Server error: {0}")]
    Rpc(String),

    /// Login was refused
    #[error("Authentication failed for user '{user}' on database '{db}'. Check --user/--password or DAGLOAD_USER/DAGLOAD_PASSWORD.")]
    Authentication { user: String, db: String },

    /// HTTP request failed
    #[error("Network request failed: {0}. Check that the server is running and --url is correct.")]
    Http(#[from] reqwest::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Delimited text could not be parsed
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}. Inputs must be an array of records.")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your command-line flags or environment variables.")]
    Config(String),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a server error
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn invalid_model(input: impl Into<String>, model: impl Into<String>) -> Self {
        Self::InvalidModel {
            input: input.into(),
            model: model.into(),
        }
    }
}

/// Convert for the loader's store and provider traits
impl From<CliError> for LoadError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Load(inner) => inner,
            other => LoadError::store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_errors_pass_through() {
        let err = CliError::from(LoadError::NoInput);
        assert_eq!(
            err.to_string(),
            "No stream or file input defined. Define either a --file and/or a --stream input."
        );
        assert!(matches!(LoadError::from(err), LoadError::NoInput));
    }

    #[test]
    fn test_other_errors_become_store_errors() {
        let err = LoadError::from(CliError::rpc("Access Denied"));
        assert!(matches!(err, LoadError::Store(ref m) if m == "Server error: Access Denied"));
    }

    #[test]
    fn test_invalid_model_message() {
        let msg = CliError::invalid_model("partners.csv", "partners").to_string();
        assert!(msg.contains("'partners'"));
        assert!(msg.contains("res.partner.csv"));
    }
}
