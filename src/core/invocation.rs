//! Invocation matching
//!
//! An invocation is the whole text of one inline code span shaped like
//! `name{arg, arg, ...}`. Anything else is not an invocation.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `name{args}` anchored at both ends. `[^}]` also matches newlines.
    static ref INVOCATION_RE: Regex =
        Regex::new(r"^([A-Za-z0-9_]+)\{([^}]*)\}$").expect("invocation pattern compiles");
    /// Argument separator: a comma followed by at least one whitespace character
    static ref ARG_SEPARATOR_RE: Regex =
        Regex::new(r",\s+").expect("separator pattern compiles");
}

/// A parsed invocation: macro name plus raw, unprocessed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub raw_args: Vec<String>,
}

impl Invocation {
    /// Arguments in call order, unprocessed.
    pub fn args(&self) -> &[String] {
        &self.raw_args
    }
}

/// Split the text between the braces into arguments.
///
/// An empty argument list still yields one empty argument.
pub fn split_args(inner: &str) -> Vec<String> {
    if inner.is_empty() {
        return vec![String::new()];
    }
    ARG_SEPARATOR_RE.split(inner).map(str::to_string).collect()
}

/// Match a candidate span against the invocation shape.
///
/// Returns `None` when the text is not an invocation. Whether the name is a
/// known macro is not checked here.
pub fn match_invocation(text: &str) -> Option<Invocation> {
    let caps = INVOCATION_RE.captures(text)?;
    let name = caps.get(1)?.as_str();
    let inner = caps.get(2)?.as_str();
    Some(Invocation {
        name: name.to_string(),
        raw_args: split_args(inner),
    })
}
