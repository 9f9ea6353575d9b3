use super::{Segment, Source, Token};
use crate::error::{Location, ParseError, ValueError};
use crate::options::TokenSource;

/// Cursor over a list of tokens
///
/// The cursor starts *before* the first token. [Dispenser::next] has to be called once before
/// [Dispenser::val] returns anything.
#[derive(Debug, Clone, Default)]
pub struct Dispenser {
    tokens: Vec<Token>,
    /// number of consumed tokens; the current token is `tokens[position - 1]`
    position: usize,
    nesting: usize,
}

impl Dispenser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            nesting: 0,
        }
    }

    /// Tokenize `input` and wrap the tokens
    pub fn parse(input: &str, source: Source) -> Result<Self, ParseError> {
        Ok(Self::new(super::tokenize(input, source)?))
    }

    /// Advance to the next token, no matter where it is
    pub fn next(&mut self) -> bool {
        if self.position < self.tokens.len() {
            self.position += 1;
            return true;
        }
        false
    }

    /// Step back one token
    pub fn prev(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            return true;
        }
        false
    }

    /// Advance to the next token if it is on the same line as the current one
    ///
    /// An opening brace is not an argument: the cursor stays put.
    pub fn next_arg(&mut self) -> bool {
        if !self.next_on_same_line() {
            return false;
        }
        if self.current().is_some_and(Token::is_open_brace) {
            self.prev();
            return false;
        }
        true
    }

    /// Advance to the next line inside a block
    ///
    /// Called in a loop: the first call (when `nesting == initial_nesting`) expects the block's
    /// opening brace on the current line and moves onto the first token inside it. Later calls
    /// move token by token until the matching closing brace is consumed.
    ///
    /// ```text
    /// while d.next_block(0) {
    ///     match d.val() { ... }
    /// }
    /// ```
    pub fn next_block(&mut self, initial_nesting: usize) -> bool {
        if self.nesting > initial_nesting {
            if !self.next() {
                return false;
            }
            if self.current().is_some_and(Token::is_close_brace) {
                self.nesting -= 1;
            } else if self.current().is_some_and(Token::is_open_brace) {
                self.nesting += 1;
            }
            return self.nesting > initial_nesting;
        }

        if !self.next_on_same_line() {
            return false;
        }
        if !self.current().is_some_and(Token::is_open_brace) {
            self.prev();
            return false;
        }
        if !self.next() || self.current().is_some_and(Token::is_close_brace) {
            // `{}` or `{` at the end of input
            return false;
        }
        self.nesting += 1;
        true
    }

    /// Text of the current token (empty before the first [Dispenser::next])
    pub fn val(&self) -> &str {
        self.current().map(|token| token.text.as_str()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<&Token> {
        self.position.checked_sub(1).and_then(|index| self.tokens.get(index))
    }

    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Collect the current token, its arguments and its block (braces included)
    ///
    /// The cursor is left on the closing brace, so the enclosing loop consumes it with its next
    /// call to [Dispenser::next] or [Dispenser::next_block].
    pub fn next_segment(&mut self) -> Segment {
        let mut segment: Segment = self.current().cloned().into_iter().collect();
        while self.next_arg() {
            segment.extend(self.current().cloned());
        }

        let mut opened_block = false;
        let nesting = self.nesting;
        while self.next_block(nesting) {
            if !opened_block {
                // next_block stepped over the opening brace
                if let Some(open) = self.position.checked_sub(2).and_then(|i| self.tokens.get(i)) {
                    segment.push(open.clone());
                }
                opened_block = true;
            }
            segment.extend(self.current().cloned());
        }
        if opened_block {
            segment.extend(self.current().cloned());
        }

        segment
    }

    /// Like [Dispenser::next_segment], wrapped in a fresh dispenser
    pub fn new_from_next_segment(&mut self) -> Dispenser {
        Dispenser::new(self.next_segment())
    }

    /// true if the next token is an opening brace on the current line
    pub fn opens_block(&self) -> bool {
        match (self.current(), self.peek()) {
            (Some(current), Some(next)) => {
                next.is_open_brace() && !current.is_followed_on_new_line(next)
            }
            _ => false,
        }
    }

    pub fn location(&self) -> Location {
        self.current()
            .or_else(|| self.tokens.first())
            .map(Token::location)
            .unwrap_or_else(|| Location::new(None, 0))
    }

    pub fn arg_err(&self) -> ParseError {
        ParseError::ArgMissing {
            location: self.location(),
            token: self.val().to_string(),
        }
    }

    pub fn wrap_err(&self, source: ValueError) -> ParseError {
        ParseError::InvalidValue {
            location: self.location(),
            token: self.val().to_string(),
            source,
        }
    }

    pub fn errf(&self, message: std::fmt::Arguments<'_>) -> ParseError {
        ParseError::Unrecognized {
            location: self.location(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next_on_same_line(&mut self) -> bool {
        if self.position == 0 {
            return self.next();
        }
        let same_line = matches!(
            (self.current(), self.peek()),
            (Some(current), Some(next)) if !current.is_followed_on_new_line(next)
        );
        same_line && self.next()
    }
}

impl TokenSource for Dispenser {
    fn next_block(&mut self, initial_nesting: usize) -> bool {
        Dispenser::next_block(self, initial_nesting)
    }

    fn next_arg(&mut self) -> bool {
        Dispenser::next_arg(self)
    }

    fn val(&self) -> &str {
        Dispenser::val(self)
    }

    fn arg_err(&self) -> ParseError {
        Dispenser::arg_err(self)
    }

    fn wrap_err(&self, source: ValueError) -> ParseError {
        Dispenser::wrap_err(self, source)
    }

    fn errf(&self, message: std::fmt::Arguments<'_>) -> ParseError {
        Dispenser::errf(self, message)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dispenser(input: &str) -> Dispenser {
        Dispenser::parse(input, None).expect("must tokenize")
    }

    fn texts(segment: &Segment) -> Vec<&str> {
        segment.iter().map(|token| token.text.as_str()).collect()
    }

    #[test]
    fn next_arg_stays_on_line() {
        let mut d = dispenser("tags a b\nhostname h1");
        assert!(d.next());
        assert!(d.next_arg());
        assert_eq!(d.val(), "a");
        assert!(d.next_arg());
        assert_eq!(d.val(), "b");
        assert!(!d.next_arg());
        assert_eq!(d.val(), "b");
        assert!(d.next());
        assert_eq!(d.val(), "hostname");
    }

    #[test]
    fn next_arg_does_not_consume_brace() {
        let mut d = dispenser("node1 {\n}");
        assert!(d.next());
        assert!(!d.next_arg());
        assert_eq!(d.val(), "node1");
        assert!(d.opens_block());
    }

    #[test]
    fn next_block_walks_lines() {
        let mut d = dispenser("tailscale {\n  webui\n  tags a b\n}\nafter");
        assert!(d.next());

        let mut keywords = vec![];
        while d.next_block(0) {
            keywords.push(d.val().to_string());
            while d.next_arg() {}
        }

        assert_eq!(keywords, vec!["webui", "tags"]);
        assert_eq!(d.nesting(), 0);
        assert!(d.next());
        assert_eq!(d.val(), "after");
    }

    #[test]
    fn next_block_empty() {
        let mut d = dispenser("tailscale {\n}");
        assert!(d.next());
        assert!(!d.next_block(0));
        assert_eq!(d.nesting(), 0);
    }

    #[test]
    fn next_block_requires_brace_on_same_line() {
        let mut d = dispenser("tailscale\n{\n}");
        assert!(d.next());
        assert!(!d.next_block(0));
        assert_eq!(d.val(), "tailscale");
    }

    #[test]
    fn segment_includes_block() {
        let mut d = dispenser("tailscale {\n  node1 {\n    hostname h1\n  }\n  webui\n}");
        assert!(d.next());
        assert!(d.next_block(0));
        assert_eq!(d.val(), "node1");

        let segment = d.next_segment();
        assert_eq!(texts(&segment), vec!["node1", "{", "hostname", "h1", "}"]);

        assert!(d.next_block(0));
        assert_eq!(d.val(), "webui");
        assert!(!d.next_block(0));
    }

    #[test]
    fn segment_without_block() {
        let mut d = dispenser("tags a b\nnext");
        assert!(d.next());
        let segment = d.next_segment();
        assert_eq!(texts(&segment), vec!["tags", "a", "b"]);
        assert!(d.next());
        assert_eq!(d.val(), "next");
    }

    #[test]
    fn errors_point_at_current_token() {
        let mut d = dispenser("\n\nport x");
        assert!(d.next());
        assert!(d.next_arg());
        let err = d.errf(format_args!("unrecognized subdirective: {}", d.val()));
        assert_eq!(err.to_string(), "Caddyfile:3: unrecognized subdirective: x");
    }
}
