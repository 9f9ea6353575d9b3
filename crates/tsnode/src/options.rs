//! the option grammar
//!
//! The same `keyword argument...` lines configure the app defaults, named node blocks and site
//! directives:
//!
//! ```text
//! auth_key    <key>
//! control_url <url>
//! ephemeral   [<bool>]
//! hostname    <name>        (nodes only)
//! port        <0-65535>     (nodes only)
//! state_dir   <path>
//! webui       [<bool>]
//! tags        [<tag>...]
//! ```
//!
//! The grammar is written once against [TokenSource] and writes into any [OptionTarget].
use crate::error::{ParseError, ValueError};

/// What the option grammar needs from a token stream
///
/// Implemented by [crate::caddyfile::Dispenser] (global options) and
/// [crate::caddyfile::Helper] (site directives).
pub trait TokenSource {
    /// Advance to the next line of the block, see [crate::caddyfile::Dispenser::next_block]
    fn next_block(&mut self, initial_nesting: usize) -> bool;
    /// Advance to the next argument on the current line
    fn next_arg(&mut self) -> bool;
    fn val(&self) -> &str;
    fn arg_err(&self) -> ParseError;
    fn wrap_err(&self, source: ValueError) -> ParseError;
    fn errf(&self, message: std::fmt::Arguments<'_>) -> ParseError;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    AuthKey,
    ControlUrl,
    Ephemeral,
    Hostname,
    Port,
    StateDir,
    WebUi,
    Tags,
}

impl Keyword {
    pub const ALL: [Keyword; 8] = [
        Keyword::AuthKey,
        Keyword::ControlUrl,
        Keyword::Ephemeral,
        Keyword::Hostname,
        Keyword::Port,
        Keyword::StateDir,
        Keyword::WebUi,
        Keyword::Tags,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::AuthKey => "auth_key",
            Keyword::ControlUrl => "control_url",
            Keyword::Ephemeral => "ephemeral",
            Keyword::Hostname => "hostname",
            Keyword::Port => "port",
            Keyword::StateDir => "state_dir",
            Keyword::WebUi => "webui",
            Keyword::Tags => "tags",
        }
    }

    /// Case-sensitive lookup
    pub fn recognize(token: &str) -> Option<Keyword> {
        Self::ALL.into_iter().find(|keyword| keyword.as_str() == token)
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed option line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    AuthKey(String),
    ControlUrl(String),
    Ephemeral(bool),
    Hostname(String),
    Port(u16),
    StateDir(String),
    WebUi(bool),
    /// appended to already present tags
    Tags(Vec<String>),
}

/// A record the option grammar writes into
pub trait OptionTarget {
    /// Whether `keyword` belongs to this record's vocabulary
    fn accepts(&self, keyword: Keyword) -> bool;

    /// Only called with settings of accepted keywords
    fn apply(&mut self, setting: Setting);
}

/// Keyword lookup restricted to the target's vocabulary
pub fn recognize<T: OptionTarget + ?Sized>(token: &str, target: &T) -> Option<Keyword> {
    Keyword::recognize(token).filter(|keyword| target.accepts(*keyword))
}

/// Parse every line of the block the token source is positioned in front of
pub fn parse_options<S, T>(source: &mut S, target: &mut T) -> Result<(), ParseError>
where
    S: TokenSource + ?Sized,
    T: OptionTarget + ?Sized,
{
    while source.next_block(0) {
        let Some(keyword) = recognize(source.val(), &*target) else {
            return Err(unrecognized(source));
        };

        let setting = parse_setting(source, keyword)?;
        target.apply(setting);
    }
    Ok(())
}

pub fn unrecognized<S: TokenSource + ?Sized>(source: &S) -> ParseError {
    source.errf(format_args!("unrecognized subdirective: {}", source.val()))
}

/// Consume the arguments of `keyword` from the current line
pub fn parse_setting<S>(source: &mut S, keyword: Keyword) -> Result<Setting, ParseError>
where
    S: TokenSource + ?Sized,
{
    tracing::trace!(%keyword, "option");

    let setting = match keyword {
        Keyword::AuthKey => Setting::AuthKey(single_arg(source)?),
        Keyword::ControlUrl => Setting::ControlUrl(single_arg(source)?),
        Keyword::Ephemeral => Setting::Ephemeral(optional_bool(source)?),
        Keyword::Hostname => Setting::Hostname(single_arg(source)?),
        Keyword::Port => {
            if !source.next_arg() {
                return Err(source.arg_err());
            }
            Setting::Port(parse_port(source.val()).map_err(|err| source.wrap_err(err))?)
        }
        Keyword::StateDir => Setting::StateDir(single_arg(source)?),
        Keyword::WebUi => Setting::WebUi(optional_bool(source)?),
        Keyword::Tags => {
            let mut tags = vec![];
            while source.next_arg() {
                tags.push(source.val().to_string());
            }
            Setting::Tags(tags)
        }
    };

    Ok(setting)
}

fn single_arg<S: TokenSource + ?Sized>(source: &mut S) -> Result<String, ParseError> {
    if !source.next_arg() {
        return Err(source.arg_err());
    }
    Ok(source.val().to_string())
}

/// A bare flag means `true`
fn optional_bool<S: TokenSource + ?Sized>(source: &mut S) -> Result<bool, ParseError> {
    if !source.next_arg() {
        return Ok(true);
    }
    parse_bool(source.val()).map_err(|err| source.wrap_err(err))
}

pub fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::Bool),
    }
}

/// Unsigned base-10, no sign, at most 65535
pub fn parse_port(value: &str) -> Result<u16, ValueError> {
    if value.starts_with(&['+', '-'][..]) {
        return Err(ValueError::Signed);
    }
    Ok(value.parse::<u16>()?)
}
