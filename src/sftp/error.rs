use std::fmt;

use super::open_flags::OpenFlags;

/// Low-level failure while reading a field off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    ShortRead {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    InvalidUtf8 {
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SftpError {
    /// An attribute block ended before a field its flags word promised,
    /// or carried a string that was not UTF-8.
    MalformedAttributes(WireError),
    MalformedPacket(WireError),
    UnexpectedPacket(u8),
    /// Truncate or exclusive-create was requested without create.
    InvalidOpenFlags(OpenFlags),
    TimestampOutOfRange {
        field: &'static str,
        seconds: i64,
    },
    FieldTooLong {
        field: &'static str,
        len: usize,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::ShortRead {
                field,
                needed,
                remaining,
            } => write!(
                f,
                "{} needs {} bytes but only {} remain",
                field, needed, remaining
            ),
            WireError::InvalidUtf8 { field } => write!(f, "{} is not valid UTF-8", field),
        }
    }
}

impl fmt::Display for SftpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SftpError::MalformedAttributes(e) => write!(f, "malformed attributes: {}", e),
            SftpError::MalformedPacket(e) => write!(f, "malformed packet: {}", e),
            SftpError::UnexpectedPacket(t) => write!(f, "unexpected packet type {}", t),
            SftpError::InvalidOpenFlags(flags) => write!(
                f,
                "open flags {:?} set truncate or exclusive without create",
                flags
            ),
            SftpError::TimestampOutOfRange { field, seconds } => write!(
                f,
                "{} of {}s does not fit in an unsigned 32-bit timestamp",
                field, seconds
            ),
            SftpError::FieldTooLong { field, len } => {
                write!(f, "{} of length {} exceeds the 32-bit length prefix", field, len)
            }
        }
    }
}

impl std::error::Error for WireError {}

impl std::error::Error for SftpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SftpError::MalformedAttributes(e) | SftpError::MalformedPacket(e) => Some(e),
            _ => None,
        }
    }
}
