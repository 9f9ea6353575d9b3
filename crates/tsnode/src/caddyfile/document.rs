//! split a token stream into server blocks
use super::{Dispenser, Segment, Token};
use crate::error::ParseError;

/// One `keys... { directives }` block of a Caddyfile
///
/// A block without keys is the global options block.
#[derive(Debug, Clone, Default)]
pub struct ServerBlock {
    pub keys: Vec<Token>,
    pub segments: Vec<Segment>,
}

impl ServerBlock {
    pub fn is_global_options(&self) -> bool {
        self.keys.is_empty()
    }

    /// Segments whose first token is `name`
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments
            .iter()
            .filter(move |segment| segment.first().is_some_and(|token| token.text == name))
    }
}

pub fn parse_document(tokens: Vec<Token>) -> Result<Vec<ServerBlock>, ParseError> {
    let mut d = Dispenser::new(tokens);
    let mut blocks: Vec<ServerBlock> = vec![];

    while d.next() {
        let mut block = ServerBlock::default();

        if !d.current().is_some_and(Token::is_open_brace) {
            block.keys.extend(d.current().cloned());
            while d.next_arg() {
                block.keys.extend(d.current().cloned());
            }
            if !d.opens_block() {
                return Err(syntax(&d, "expected '{' on the same line to open the server block"));
            }
            d.next();
        }

        if block.is_global_options() && !blocks.is_empty() {
            return Err(syntax(&d, "the global options block must be the first block"));
        }

        let opening = d.location();
        loop {
            if !d.next() {
                return Err(ParseError::Syntax {
                    location: opening,
                    message: "unclosed block, missing '}'".to_string(),
                });
            }

            match d.current() {
                Some(token) if token.is_close_brace() => break,
                Some(token) if token.is_open_brace() => {
                    return Err(syntax(&d, "unexpected '{'"));
                }
                _ => {}
            }

            let segment = d.next_segment();
            if d.nesting() > 0 {
                return Err(ParseError::Syntax {
                    location: opening,
                    message: "unclosed block, missing '}'".to_string(),
                });
            }
            block.segments.push(segment);
        }

        tracing::trace!(
            keys = ?block.keys.iter().map(|key| key.text.as_str()).collect::<Vec<_>>(),
            segments = block.segments.len(),
            "server block"
        );
        blocks.push(block);
    }

    Ok(blocks)
}

fn syntax(d: &Dispenser, message: &str) -> ParseError {
    ParseError::Syntax {
        location: d.location(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::caddyfile::tokenize;
    use pretty_assertions::assert_eq;

    fn blocks(input: &str) -> Result<Vec<ServerBlock>, ParseError> {
        parse_document(tokenize(input, None).expect("must tokenize"))
    }

    #[test]
    fn global_and_site_blocks() {
        let blocks = blocks(
            r#"
            {
                tailscale {
                    webui
                }
                debug
            }

            example.com www.example.com {
                tailscale node1
                respond "hello"
            }
            "#,
        )
        .unwrap();

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_global_options());
        assert_eq!(blocks[0].segments.len(), 2);
        assert_eq!(blocks[0].segments[0].len(), 4);

        let keys: Vec<_> = blocks[1].keys.iter().map(|key| key.text.as_str()).collect();
        assert_eq!(keys, vec!["example.com", "www.example.com"]);
        assert_eq!(blocks[1].segments_named("tailscale").count(), 1);
    }

    #[test]
    fn late_global_block() {
        let err = blocks("example.com {\n}\n{\n}").unwrap_err();
        assert!(err.to_string().contains("must be the first block"));
    }

    #[test]
    fn unclosed_block() {
        let err = blocks("example.com {\n  tailscale {\n    webui\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn missing_brace() {
        let err = blocks("example.com\nrespond ok").unwrap_err();
        assert!(err.to_string().contains("expected '{'"));
    }
}
