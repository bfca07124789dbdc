//! Codec error type.

use std::sync::Arc;
use std::{fmt, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("the type '{type_name}' cannot be de/serialized: {reason}")]
    UnsupportedType {
        type_name: &'static str,
        reason: &'static str,
    },
    #[error("expected {expected} at byte {offset}")]
    MalformedToken { expected: String, offset: usize },
    #[error("'{type_name}' has no member named '{member}'")]
    UnknownMember {
        type_name: &'static str,
        member: Arc<str>,
    },
    #[error("invalid number at byte {offset}: {reason}")]
    InvalidNumber { offset: usize, reason: String },
    #[error("cannot parse {text:?} as '{type_name}': {reason}")]
    InvalidText {
        type_name: &'static str,
        text: Arc<str>,
        reason: String,
    },
    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("no variant of '{type_name}' matches the value")]
    NoMatchingVariant { type_name: &'static str },
    #[error("value is not a '{expected}'")]
    TypeMismatch { expected: &'static str },
    #[error("sink error")]
    Format(#[from] fmt::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    pub(crate) fn malformed(expected: impl Into<String>, offset: usize) -> Self {
        CodecError::MalformedToken {
            expected: expected.into(),
            offset,
        }
    }

    pub(crate) fn unsupported<T>(reason: &'static str) -> Self {
        CodecError::UnsupportedType {
            type_name: std::any::type_name::<T>(),
            reason,
        }
    }
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_offsets() {
        let err = CodecError::malformed("':'", 12);
        assert_eq!(err.to_string(), "expected ':' at byte 12");
        let err = CodecError::unsupported::<std::time::Instant>("no shape matched");
        assert!(err
            .to_string()
            .ends_with("Instant' cannot be de/serialized: no shape matched"));
    }
}
