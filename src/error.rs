use std::fmt;

use roadalign_alignment::AlignmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// CLI usage error (missing args, invalid flags, stations off the alignment).
    Usage = 1,
    /// Input error (missing file, invalid YAML/JSON, geometry that cannot be built).
    Input = 2,
    /// Processing error (a query failed on a valid alignment).
    Processing = 3,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Usage,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }

    /// Classify an error raised by a query on an already built alignment.
    pub fn from_query(err: AlignmentError) -> Self {
        match err {
            AlignmentError::InvalidArgument { .. } | AlignmentError::StationOutOfRange { .. } => {
                Self::usage(err.to_string())
            }
            _ => Self::processing(err.to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
