//! Error types for the interop layer.

use std::io;

use esent_native::JetErr;
use thiserror::Error;

/// Result type for interop operations.
pub type InteropResult<T> = Result<T, InteropError>;

/// Errors raised by the interop layer.
#[derive(Debug, Error)]
pub enum InteropError {
    /// The engine returned a negative status.
    #[error("{description} ({code})")]
    Engine {
        /// The engine status code.
        code: JetErr,
        /// Text obtained from the engine for the code.
        description: String,
    },

    /// An operation was attempted on an object that has been disposed.
    #[error("cannot access a disposed {object}")]
    ObjectDisposed {
        /// Kind of object.
        object: &'static str,
    },

    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A text encoding other than ASCII or UTF-16 was requested.
    #[error("unsupported encoding: code page {code_page}")]
    InvalidEncoding {
        /// The rejected code page.
        code_page: u32,
    },

    /// A fixed-size column held data of the wrong width.
    #[error("column data is {actual} bytes, expected {expected}")]
    DataSizeMismatch {
        /// Width of the requested type.
        expected: usize,
        /// Width reported by the engine.
        actual: usize,
    },

    /// A column grew between sizing the buffer and fetching into it.
    #[error("column changed concurrently: fetched into {expected} bytes but {actual} are needed")]
    ColumnChangedConcurrently {
        /// Size of the buffer used for the fetch.
        expected: usize,
        /// Size reported by the fetch.
        actual: usize,
    },

    /// A row of an engine metadata table lacked a required value.
    #[error("metadata row has no {field}")]
    MissingMetadata {
        /// Name of the missing field.
        field: &'static str,
    },

    /// An error substituted by an error hook.
    #[error(transparent)]
    Translated(Box<dyn std::error::Error + Send + Sync>),
}

impl InteropError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an object disposed error.
    pub fn object_disposed(object: &'static str) -> Self {
        Self::ObjectDisposed { object }
    }

    /// Creates a data size mismatch error.
    pub fn data_size_mismatch(expected: usize, actual: usize) -> Self {
        Self::DataSizeMismatch { expected, actual }
    }

    /// Returns the engine code if this is an engine error.
    #[must_use]
    pub fn code(&self) -> Option<JetErr> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this is the engine error `code`.
    #[must_use]
    pub fn is(&self, code: JetErr) -> bool {
        self.code() == Some(code)
    }
}

impl From<InteropError> for io::Error {
    fn from(error: InteropError) -> Self {
        let kind = match &error {
            InteropError::InvalidArgument { .. } => io::ErrorKind::InvalidInput,
            InteropError::ObjectDisposed { .. } => io::ErrorKind::NotConnected,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esent_native::err;

    #[test]
    fn engine_error_display_includes_code() {
        let error = InteropError::Engine {
            code: err::RECORD_NOT_FOUND,
            description: "JET_errRecordNotFound, The key was not found".into(),
        };
        assert_eq!(
            error.to_string(),
            "JET_errRecordNotFound, The key was not found (-1601)"
        );
        assert!(error.is(err::RECORD_NOT_FOUND));
    }

    #[test]
    fn local_errors_have_no_code() {
        assert_eq!(InteropError::object_disposed("table").code(), None);
        assert_eq!(
            InteropError::invalid_argument("negative offset").to_string(),
            "invalid argument: negative offset"
        );
    }

    #[test]
    fn io_conversion_keeps_kind() {
        let error: io::Error = InteropError::invalid_argument("bad").into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
