//! Caddyfile tokens and the two token sources the option parser runs on
//!
//! - [Dispenser]: a cursor over a flat token list. Global options are parsed with it.
//! - [Helper]: wraps a [Dispenser] together with the site it was found in. Site directives are
//!   parsed with it.
//!
//! Both implement [crate::options::TokenSource].
mod dispenser;
mod document;
mod helper;
mod lexer;

pub use dispenser::Dispenser;
pub use document::{parse_document, ServerBlock};
pub use helper::Helper;
pub use lexer::tokenize;

use crate::error::Location;

/// Path of the document a token was read from (`None` for stdin or inline text)
pub type Source = Option<std::sync::Arc<std::path::Path>>;

/// A directive name, its arguments and an optional nested block, including both braces
pub type Segment = Vec<Token>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub source: Source,
    pub line: usize,
    pub text: String,
    /// quoted tokens are never block delimiters
    pub quoted: bool,
}

impl Token {
    pub fn is_open_brace(&self) -> bool {
        !self.quoted && self.text == "{"
    }

    pub fn is_close_brace(&self) -> bool {
        !self.quoted && self.text == "}"
    }

    pub fn location(&self) -> Location {
        Location::new(self.source.clone(), self.line)
    }

    /// true if `next` does not continue this token's line
    fn is_followed_on_new_line(&self, next: &Token) -> bool {
        self.source != next.source || self.line_end() < next.line
    }

    /// quoted tokens may span lines
    fn line_end(&self) -> usize {
        self.line + self.text.matches('\n').count()
    }
}
