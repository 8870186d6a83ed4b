//! Dispatcher errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// A worker sent something that is not a protocol message.
    #[error("invalid worker message: {0}")]
    Decode(#[source] serde_json::Error),

    /// An outbound message could not be encoded and was dropped.
    #[error("could not encode {command} message: {source}")]
    Encode {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown worker {0}")]
    UnknownWorker(String),

    #[error("no worker hosts game {0}")]
    UnknownGame(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(RouterError::UnknownWorker("w1".into()).to_string(), "unknown worker w1");
        assert_eq!(RouterError::UnknownGame("g1".into()).to_string(), "no worker hosts game g1");
    }
}
