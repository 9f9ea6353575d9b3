use super::{Source, Token};
use crate::error::{Location, ParseError};

/// Split a Caddyfile into tokens
///
/// - tokens are separated by whitespace
/// - `#` at the start of a token comments out the rest of the line
/// - `"..."` quotes may span lines, `\"` escapes a quote
/// - `` `...` `` quotes are taken verbatim
pub fn tokenize(input: &str, source: Source) -> Result<Vec<Token>, ParseError> {
    let mut tokens = vec![];
    let mut line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '#' => {
                while chars.next_if(|next| *next != '\n').is_some() {}
            }
            '"' | '`' => {
                let start = line;
                let mut text = String::new();
                let mut closed = false;

                while let Some(next) = chars.next() {
                    match next {
                        '\\' if c == '"' && matches!(chars.peek(), Some('"' | '\\')) => {
                            text.extend(chars.next());
                        }
                        next if next == c => {
                            closed = true;
                            break;
                        }
                        '\n' => {
                            line += 1;
                            text.push(next);
                        }
                        next => text.push(next),
                    }
                }

                if !closed {
                    return Err(ParseError::Syntax {
                        location: Location::new(source, start),
                        message: format!("unterminated quote {c}"),
                    });
                }

                tokens.push(Token {
                    source: source.clone(),
                    line: start,
                    text,
                    quoted: true,
                });
            }
            c => {
                let mut text = String::from(c);
                while let Some(next) = chars.next_if(|next| !next.is_whitespace()) {
                    text.push(next);
                }

                tokens.push(Token {
                    source: source.clone(),
                    line,
                    text,
                    quoted: false,
                });
            }
        }
    }

    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}
