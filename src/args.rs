//! Declarative argument specifications.
//!
//! Every command declares the arguments it accepts as a list of
//! [`ArgumentSpec`]s. An input argument follows a small grammar:
//!
//! ```text
//! arg        := named | positional
//! named      := '-' token ['='] value      e.g. -iid=12, -iid12, -iid
//! positional := any text not starting with '-'
//! ```
//!
//! A named argument binds to the spec whose token it spells out exactly
//! (`-token` or `-token=...`). Failing that, the concatenated form binds to the
//! longest token the argument starts with, so `-usernamebob` goes to `username`
//! even when `user` is declared too. A positional argument binds to the spec
//! declaring its index in the argument list.

use std::collections::HashSet;

use thiserror::Error;

/// Leading character of a named (token-shaped) argument.
pub const ARG_PREFIX: char = '-';

/// One input argument, classified by the grammar above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgToken<'a> {
    /// Token-shaped input; holds everything after the prefix.
    Named(&'a str),
    /// Bare value.
    Positional(&'a str),
}

impl<'a> ArgToken<'a> {
    pub fn parse(input: &'a str) -> Self {
        match input.strip_prefix(ARG_PREFIX) {
            Some(rest) => ArgToken::Named(rest),
            None => ArgToken::Positional(input),
        }
    }
}

/// How a named input met a spec's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMatch<'a> {
    /// `-token` or `-token=value`.
    Exact(&'a str),
    /// `-token<value>`, the value glued to the token.
    Concatenated(&'a str),
}

impl<'a> TokenMatch<'a> {
    pub fn value(self) -> &'a str {
        match self {
            TokenMatch::Exact(value) | TokenMatch::Concatenated(value) => value,
        }
    }
}

/// Describes one argument a command accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    token: &'static str,
    display_name: &'static str,
    required: bool,
    position: Option<usize>,
    description: &'static str,
}

impl ArgumentSpec {
    pub fn new(token: &'static str, description: &'static str) -> Self {
        Self {
            token,
            display_name: token,
            required: false,
            position: None,
            description,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Allow the argument to be passed bare at `position` in the argument list.
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Name used when the bound value is serialized into a query string.
    pub fn display_as(mut self, name: &'static str) -> Self {
        self.display_name = name;
        self
    }

    pub fn token(&self) -> &'static str {
        self.token
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Try to bind `input`, found at `position` in the argument list.
    ///
    /// Returns the extracted value when the input matches this spec, either by
    /// token or, for bare inputs only, by position.
    pub fn fetch<'a>(&self, input: &'a str, position: usize) -> Option<&'a str> {
        match ArgToken::parse(input) {
            ArgToken::Named(rest) => self.match_token(rest).map(TokenMatch::value),
            ArgToken::Positional(value) if self.position == Some(position) => Some(value),
            ArgToken::Positional(_) => None,
        }
    }

    /// Match the part of a named input after the prefix against this token.
    pub fn match_token<'a>(&self, rest: &'a str) -> Option<TokenMatch<'a>> {
        let remainder = rest.strip_prefix(self.token)?;
        if remainder.is_empty() {
            return Some(TokenMatch::Exact(remainder));
        }
        Some(match remainder.strip_prefix('=') {
            Some(value) => TokenMatch::Exact(value),
            None => TokenMatch::Concatenated(remainder),
        })
    }

    /// `display_name=value`, with the value URL-encoded.
    pub fn serialize(&self, value: &str) -> String {
        format!("{}={}", self.display_name, urlencoding::encode(value))
    }

    /// Help fragment, e.g. `-iid [Req] [P0] (issue iid)`.
    pub fn help(&self) -> String {
        let mut help = format!("{ARG_PREFIX}{}", self.token);
        if self.required {
            help.push_str(" [Req]");
        }
        if let Some(position) = self.position {
            help.push_str(&format!(" [P{position}]"));
        }
        help.push_str(&format!(" ({})", self.description));
        help
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecError {
    #[error("argument token must not be empty")]
    EmptyToken,

    #[error("argument -{0} is declared twice")]
    DuplicateToken(&'static str),

    #[error("arguments -{first} and -{second} both claim position {position}")]
    DuplicatePosition {
        position: usize,
        first: &'static str,
        second: &'static str,
    },
}

/// Check that tokens and positions are unique within a spec list.
pub fn validate_specs(specs: &[ArgumentSpec]) -> Result<(), SpecError> {
    let mut tokens = HashSet::new();
    for spec in specs {
        if spec.token.is_empty() {
            return Err(SpecError::EmptyToken);
        }
        if !tokens.insert(spec.token) {
            return Err(SpecError::DuplicateToken(spec.token));
        }
    }

    for (index, spec) in specs.iter().enumerate() {
        for other in &specs[index + 1..] {
            if let Some(position) = spec.position.filter(|p| other.position == Some(*p)) {
                return Err(SpecError::DuplicatePosition {
                    position,
                    first: spec.token,
                    second: other.token,
                });
            }
        }
    }

    Ok(())
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("argument -{0} is not bound")]
pub struct UnboundArgument(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundArg {
    spec: ArgumentSpec,
    value: String,
}

/// Values bound for one invocation, in spec declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    args: Vec<BoundArg>,
}

impl Bindings {
    /// Build from one optional value per spec, aligned with `specs`.
    pub(crate) fn from_slots(specs: &[ArgumentSpec], slots: Vec<Option<String>>) -> Self {
        let args = specs
            .iter()
            .zip(slots)
            .filter_map(|(spec, slot)| {
                slot.map(|value| BoundArg {
                    spec: spec.clone(),
                    value,
                })
            })
            .collect();
        Self { args }
    }

    fn find(&self, token: &str) -> Option<&BoundArg> {
        self.args.iter().find(|arg| arg.spec.token == token)
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.find(token).map(|arg| arg.value.as_str())
    }

    pub fn require(&self, token: &'static str) -> Result<&str, UnboundArgument> {
        self.get(token).ok_or(UnboundArgument(token))
    }

    /// `display_name=value` for a bound argument, empty string otherwise.
    pub fn serialize(&self, token: &str) -> String {
        self.find(token)
            .map(|arg| arg.spec.serialize(&arg.value))
            .unwrap_or_default()
    }

    /// All bound arguments joined into a query string.
    pub fn query(&self) -> String {
        self.args
            .iter()
            .map(|arg| arg.spec.serialize(&arg.value))
            .collect::<Vec<_>>()
            .join("&")
    }
}
