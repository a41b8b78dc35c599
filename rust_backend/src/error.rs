//! Error taxonomy and translation of the engine's return-code convention.

use serde::{Deserialize, Serialize};

use crate::engine::ErrorBuffer;

/// Result type for every boundary operation
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

pub const MISSING_ARGUMENTS: &str = "missing required argument(s)";
pub const WRONG_ARGUMENT_TYPE: &str = "wrong argument type";
pub const HOUSES_FAILED: &str = "house computation failed";
pub const ENGINE_CLOSED: &str = "engine closed";

/// Failure category visible to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The caller supplied too few arguments or a value of the wrong type.
    Validation,
    /// The computation could not be performed.
    Engine,
}

/// Errors surfaced by the boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Engine(String),
}

impl BridgeError {
    pub fn missing_arguments() -> Self {
        Self::Validation(MISSING_ARGUMENTS.to_string())
    }

    pub fn wrong_type() -> Self {
        Self::Validation(WRONG_ARGUMENT_TYPE.to_string())
    }

    pub fn closed() -> Self {
        Self::Engine(ENGINE_CLOSED.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Engine(_) => ErrorKind::Engine,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::Engine(msg) => msg,
        }
    }
}

/// Translate an engine return code and its message buffer.
///
/// A negative code always becomes [`BridgeError::Engine`]; when the buffer is
/// empty the message is `fallback`, or a generic one naming the code. A
/// non-negative code is passed through and any text left in the buffer is
/// logged as a warning.
pub fn check_return_code(
    code: i32,
    serr: &ErrorBuffer,
    fallback: Option<&str>,
) -> BridgeResult<i32> {
    if code < 0 {
        let message = serr
            .message()
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_else(|| format!("engine call failed with return code {}", code));
        return Err(BridgeError::Engine(message));
    }

    if let Some(warning) = serr.message() {
        log::warn!("engine warning: {}", warning);
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_code_uses_buffer_message() {
        let mut serr = ErrorBuffer::new();
        serr.write("illegal planet number 99.");
        let err = check_return_code(-1, &serr, None).unwrap_err();
        assert_eq!(err, BridgeError::Engine("illegal planet number 99.".into()));
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn test_negative_code_with_empty_buffer_is_never_silent() {
        let serr = ErrorBuffer::new();
        let err = check_return_code(-1, &serr, None).unwrap_err();
        assert!(!err.message().is_empty());
        assert!(err.message().contains("-1"));

        let err = check_return_code(-1, &serr, Some(HOUSES_FAILED)).unwrap_err();
        assert_eq!(err.message(), HOUSES_FAILED);
    }

    #[test]
    fn test_non_negative_code_passes_through() {
        let mut serr = ErrorBuffer::new();
        serr.write("fallback to analytical ephemeris");
        assert_eq!(check_return_code(260, &serr, None).unwrap(), 260);
        assert_eq!(check_return_code(0, &ErrorBuffer::new(), None).unwrap(), 0);
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(BridgeError::wrong_type().kind(), ErrorKind::Validation);
        assert_eq!(BridgeError::missing_arguments().message(), MISSING_ARGUMENTS);
        assert_eq!(BridgeError::closed().kind(), ErrorKind::Engine);
        assert_eq!(BridgeError::closed().to_string(), ENGINE_CLOSED);
    }
}
