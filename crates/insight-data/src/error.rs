//! Error types for insight-data

/// Result type for insight-data operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, converting or mapping values
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value cannot be expressed in the exchange format
    #[error("Failed to encode value: {message}")]
    Encode { message: String },

    /// The exchange text is malformed or does not fit the target type
    #[error("Failed to decode {target}: {message}")]
    Decode { target: String, message: String },

    /// A table cell or record field does not fit its declared column type
    #[error("Mapping failed at row {row}, column '{column}': {message}")]
    Mapping {
        row: usize,
        column: String,
        message: String,
    },

    /// The static field schema of a record type is inconsistent
    #[error("Invalid record schema: {message}")]
    Schema { message: String },

    /// Base64 input could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub(crate) fn decode<T: ?Sized>(source: impl std::fmt::Display) -> Self {
        Self::Decode {
            target: std::any::type_name::<T>().to_string(),
            message: source.to_string(),
        }
    }

    pub(crate) fn mapping(
        row: usize,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Mapping {
            row,
            column: column.into(),
            message: message.into(),
        }
    }
}
