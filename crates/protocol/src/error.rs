//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding a sync buffer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Invalid sync record tag: {0:#04x}")]
    InvalidRecordTag(u8),

    #[error("Sync frame holds {count} records, limit is {limit}")]
    TooManyRecords { count: usize, limit: usize },

    #[error("String is not valid UTF-8")]
    InvalidUtf8,

    #[error("Frame of {size} bytes exceeds limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },
}

/// Errors that can occur while parsing a phone control message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("Empty control message")]
    Empty,

    #[error("'{tag}' message is missing argument `{name}`")]
    MissingArgument { tag: char, name: &'static str },

    #[error("'{tag}' message has malformed `{name}`: {value:?}")]
    InvalidNumber {
        tag: char,
        name: &'static str,
        value: String,
    },
}
