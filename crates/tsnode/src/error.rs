//! error types shared by the tokenizer, the dispensers and the option parser
use crate::caddyfile::Source;

/// Position of a token in its source document
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Location {
    pub source: Source,
    pub line: usize,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "Caddyfile:{}", self.line),
        }
    }
}

/// Anything that aborts loading a configuration
///
/// There is no partial success: the first error ends the load.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("{location}: syntax error: {message}")]
    Syntax { location: Location, message: String },

    #[error("{location}: wrong argument count or unexpected line ending after '{token}'")]
    ArgMissing { location: Location, token: String },

    #[error("{location}: invalid value '{token}'")]
    InvalidValue {
        location: Location,
        token: String,
        #[source]
        source: ValueError,
    },

    #[error("{location}: {message}")]
    Unrecognized { location: Location, message: String },
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::ArgMissing { location, .. }
            | ParseError::InvalidValue { location, .. }
            | ParseError::Unrecognized { location, .. } => location,
        }
    }
}

/// Conversion failure of an option argument
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected a boolean (1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False)")]
    Bool,
    #[error("a port number must not carry a sign")]
    Signed,
    #[error(transparent)]
    Port(#[from] std::num::ParseIntError),
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse Caddyfile")]
    ParseFailed(#[from] ParseError),
}
