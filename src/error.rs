use thiserror::Error;

/// Errors raised at the edges of the sniffer.
///
/// Detection itself never fails: malformed input only lowers the confidence.
/// Only reading a sample, validating options and joining the tasks of the
/// concurrent decider can go wrong.
#[derive(Error, Debug)]
pub enum SniffError {
    /// The sample could not be read from its source
    #[error("Failed to read sample: {0}")]
    Io(#[from] std::io::Error),

    /// An option has a value the sniffer cannot work with
    #[error("Invalid option {name}: {reason}")]
    InvalidOption { name: String, reason: String },

    /// A match-maker task panicked or was cancelled
    #[error("Location task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SniffError {
    pub fn invalid_option(name: &str, reason: impl Into<String>) -> Self {
        SniffError::InvalidOption {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
