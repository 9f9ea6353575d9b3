use super::{Dispenser, Token};
use crate::error::{ParseError, ValueError};
use crate::options::TokenSource;

/// Token source for a directive inside a site block
///
/// Wraps the directive's own [Dispenser] and remembers the addresses of the site it belongs to.
#[derive(Debug)]
pub struct Helper<'b> {
    dispenser: Dispenser,
    site_keys: &'b [Token],
}

impl<'b> Helper<'b> {
    pub fn new(dispenser: Dispenser, site_keys: &'b [Token]) -> Self {
        Self {
            dispenser,
            site_keys,
        }
    }

    /// Addresses of the enclosing site block (`example.com`, `:8080`, ...)
    pub fn site_addresses(&self) -> impl Iterator<Item = &'b str> {
        let keys: &'b [Token] = self.site_keys;
        keys.iter().map(|key| key.text.as_str())
    }

    pub fn next(&mut self) -> bool {
        self.dispenser.next()
    }
}

impl TokenSource for Helper<'_> {
    fn next_block(&mut self, initial_nesting: usize) -> bool {
        self.dispenser.next_block(initial_nesting)
    }

    fn next_arg(&mut self) -> bool {
        self.dispenser.next_arg()
    }

    fn val(&self) -> &str {
        self.dispenser.val()
    }

    fn arg_err(&self) -> ParseError {
        self.dispenser.arg_err()
    }

    fn wrap_err(&self, source: ValueError) -> ParseError {
        self.dispenser.wrap_err(source)
    }

    fn errf(&self, message: std::fmt::Arguments<'_>) -> ParseError {
        self.dispenser.errf(message)
    }
}
