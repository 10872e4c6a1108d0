//! Macro definitions and template parsing
//!
//! A definition pairs a name with a template body. The template may contain
//! positional placeholders written as `$` followed by decimal digits (`$0`,
//! `$1`, ...). The arity of a definition is derived from the highest
//! placeholder index and is never set by hand.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// `$` followed by one or more decimal digits
    pub static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\$([0-9]+)").expect("placeholder pattern compiles");
}

/// Result of parsing a template body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    /// `1 + highest placeholder index`, or 0 without placeholders
    pub arity: usize,
    /// The template text, unchanged
    pub template: String,
}

/// Iterate over the placeholder indices of a template, in order of appearance.
///
/// Indices too large for `usize` are skipped.
pub fn placeholder_indices(text: &str) -> impl Iterator<Item = usize> + '_ {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
}

/// Compute the arity of a template body.
///
/// Gaps are allowed: `"$0 $2"` has arity 3.
pub fn template_arity(text: &str) -> usize {
    placeholder_indices(text)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Parse an author-supplied template into its arity and stored text.
pub fn parse_template(text: &str) -> TemplateInfo {
    TemplateInfo {
        arity: template_arity(text),
        template: text.to_string(),
    }
}

/// A named, parameterized text template.
///
/// Serialized with the keys `name`, `replacement` and `args`. On load the
/// stored `args` value is ignored and recomputed from `replacement`, so a
/// hand-edited settings file can never break the arity invariant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "StoredDefinition")]
pub struct MacroDefinition {
    pub name: String,
    #[serde(rename = "args")]
    arity: usize,
    #[serde(rename = "replacement")]
    template: String,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            name: name.into(),
            arity: template_arity(&template),
            template,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace the template body and recompute the arity.
    pub fn set_template(&mut self, text: &str) {
        let TemplateInfo { arity, template } = parse_template(text);
        self.arity = arity;
        self.template = template;
    }
}

/// On-disk shape of a definition. Every field is optional; the stored
/// `args` count and any unknown keys are dropped.
#[derive(Deserialize)]
struct StoredDefinition {
    #[serde(default)]
    name: String,
    #[serde(default)]
    replacement: String,
}

impl From<StoredDefinition> for MacroDefinition {
    fn from(stored: StoredDefinition) -> Self {
        MacroDefinition::new(stored.name, stored.replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_placeholders() {
        let info = parse_template("plain text");
        assert_eq!(info.arity, 0);
        assert_eq!(info.template, "plain text");
    }

    #[test]
    fn test_highest_index_sets_arity() {
        assert_eq!(template_arity("$0 and $1"), 2);
        assert_eq!(template_arity("$1 before $0"), 2);
        assert_eq!(template_arity("$0-$0-$0"), 1);
    }

    #[test]
    fn test_gaps_are_accepted() {
        assert_eq!(template_arity("$0 $2"), 3);
        assert_eq!(template_arity("$5"), 6);
    }

    #[test]
    fn test_multi_digit_and_leading_zero() {
        assert_eq!(template_arity("$10"), 11);
        assert_eq!(template_arity("$01"), 2);
    }

    #[test]
    fn test_dollar_without_digits_is_text() {
        assert_eq!(template_arity("costs $ 5 or $x"), 0);
    }

    #[test]
    fn test_oversized_index_is_ignored() {
        assert_eq!(template_arity("$99999999999999999999999 $1"), 2);
    }

    #[test]
    fn test_set_template_recomputes_arity() {
        let mut def = MacroDefinition::new("greet", "Hi $0");
        assert_eq!(def.arity(), 1);

        def.set_template("Hi $0 and $1");
        assert_eq!(def.arity(), 2);
        assert_eq!(def.template(), "Hi $0 and $1");

        def.set_template("Hi");
        assert_eq!(def.arity(), 0);
    }

    #[test]
    fn test_serialized_keys() {
        let def = MacroDefinition::new("greet", "Hi $0");
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "greet", "args": 1, "replacement": "Hi $0"})
        );
    }

    #[test]
    fn test_stale_args_recomputed_on_load() {
        let def: MacroDefinition =
            serde_json::from_str(r#"{"name": "x", "replacement": "$0 $3", "args": 9}"#).unwrap();
        assert_eq!(def.arity(), 4);
    }

    #[test]
    fn test_missing_fields_default() {
        let def: MacroDefinition = serde_json::from_str(r#"{"name": "bare"}"#).unwrap();
        assert_eq!(def.name, "bare");
        assert_eq!(def.template(), "");
        assert_eq!(def.arity(), 0);
    }
}
