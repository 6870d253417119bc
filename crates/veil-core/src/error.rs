use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeilError {
    #[error("malformed span: {detail}")]
    InvalidSpan { detail: String },

    #[error("span {start}..{end} out of bounds for text of {len} bytes")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },

    #[error("consistency import rejected: session salt does not match")]
    SaltMismatch,

    #[error("consistency import rejected: {0}")]
    ImportRejected(String),

    #[error("consistency export failed: {0}")]
    ExportFailed(String),

    #[error("pipeline failed: all {filters} filters errored, original text returned")]
    PipelineFailed { filters: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VeilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VeilError>();
    }

    #[test]
    fn test_out_of_bounds_message_names_offsets() {
        let err = VeilError::SpanOutOfBounds {
            start: 3,
            end: 40,
            len: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("3..40"));
        assert!(msg.contains("10"));
    }
}
