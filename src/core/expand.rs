//! Macro expansion
//!
//! Substitution walks the template once, placeholder by placeholder, so the
//! text of an argument is never scanned for placeholders itself.

use std::collections::BTreeSet;

use super::definition::{MacroDefinition, PLACEHOLDER_RE};
use super::invocation::match_invocation;
use super::table::MacroTable;
use crate::utils::error::{ExpansionOutput, ExpansionWarning};

/// Text substituted for a placeholder whose argument was not supplied
pub const UNDEFINED_ARG: &str = "undefined";

/// Substitute `args` into the template of `def`.
///
/// Placeholder `$i` is replaced with `args[i]` for every `i < def.arity()`.
/// Missing arguments render as [`UNDEFINED_ARG`]; extra arguments are ignored.
pub fn expand<S: AsRef<str>>(def: &MacroDefinition, args: &[S]) -> String {
    substitute(def, args, &mut BTreeSet::new())
}

/// Like [`expand`], with one warning per placeholder index that had no argument.
pub fn expand_with_report<S: AsRef<str>>(def: &MacroDefinition, args: &[S]) -> ExpansionOutput {
    let mut missing = BTreeSet::new();
    let content = substitute(def, args, &mut missing);
    let warnings = missing
        .into_iter()
        .map(|index| ExpansionWarning::missing_argument(&def.name, index, args.len()))
        .collect();
    ExpansionOutput::with_warnings(content, warnings)
}

fn substitute<S: AsRef<str>>(
    def: &MacroDefinition,
    args: &[S],
    missing: &mut BTreeSet<usize>,
) -> String {
    let template = def.template();
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(index) = caps[1].parse::<usize>().ok().filter(|i| *i < def.arity()) else {
            continue;
        };

        out.push_str(&template[last..whole.start()]);
        match args.get(index) {
            Some(arg) => out.push_str(arg.as_ref()),
            None => {
                out.push_str(UNDEFINED_ARG);
                missing.insert(index);
            }
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);

    if !missing.is_empty() {
        tracing::debug!(
            name = %def.name,
            arity = def.arity(),
            given = args.len(),
            "expanded with missing arguments"
        );
    }
    out
}

/// Expand a span if it is an invocation of a known macro.
///
/// `None` means the span should be left as it is.
pub fn try_expand(span: &str, table: &MacroTable) -> Option<String> {
    let invocation = match_invocation(span)?;
    let def = table.lookup(&invocation.name)?;
    Some(expand(def, invocation.args()))
}

/// Like [`try_expand`], keeping the warnings of the expansion.
pub fn try_expand_with_report(span: &str, table: &MacroTable) -> Option<ExpansionOutput> {
    let invocation = match_invocation(span)?;
    let def = table.lookup(&invocation.name)?;
    Some(expand_with_report(def, invocation.args()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::parse_template;

    fn def(template: &str) -> MacroDefinition {
        MacroDefinition::new("m", template)
    }

    #[test]
    fn test_positional_substitution() {
        assert_eq!(expand(&def("$0 and $1"), &["a", "b"]), "a and b");
    }

    #[test]
    fn test_parsed_template_expands() {
        let info = parse_template("$0 and $1");
        let mut d = MacroDefinition::default();
        d.set_template(&info.template);
        assert_eq!(expand(&d, &["a", "b"]), "a and b");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        assert_eq!(expand(&def("$0-$0"), &["x"]), "x-x");
    }

    #[test]
    fn test_no_placeholders_ignores_args() {
        let d = def("static text");
        assert_eq!(expand::<&str>(&d, &[]), "static text");
        assert_eq!(expand(&d, &["a", "b", "c"]), "static text");
    }

    #[test]
    fn test_missing_args_render_undefined() {
        assert_eq!(expand(&def("$0 and $1"), &["a"]), "a and undefined");
        assert_eq!(expand::<&str>(&def("[$0]"), &[]), "[undefined]");
    }

    #[test]
    fn test_extra_args_ignored() {
        assert_eq!(expand(&def("<$0>"), &["a", "b"]), "<a>");
    }

    #[test]
    fn test_gap_index_still_substituted() {
        assert_eq!(expand(&def("$0 $2"), &["a", "b", "c"]), "a c");
        assert_eq!(expand(&def("$0 $2"), &["a"]), "a undefined");
    }

    #[test]
    fn test_multi_digit_placeholder() {
        let args: Vec<String> = (0..11).map(|i| format!("a{}", i)).collect();
        assert_eq!(expand(&def("$1|$10"), &args), "a1|a10");
    }

    #[test]
    fn test_substituted_text_is_not_rescanned() {
        assert_eq!(expand(&def("$0 $1"), &["$1", "b"]), "$1 b");
    }

    #[test]
    fn test_dollar_text_untouched() {
        assert_eq!(expand(&def("costs $ $0"), &["5"]), "costs $ 5");
    }

    #[test]
    fn test_report_lists_each_missing_index_once() {
        let output = expand_with_report(&def("$0 $1 $1 $2"), &["a"]);
        assert_eq!(output.content, "a undefined undefined undefined");
        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings[0].message.contains("$1"));
        assert!(output.warnings[1].message.contains("$2"));
    }

    #[test]
    fn test_report_clean_when_all_args_present() {
        let output = expand_with_report(&def("$0"), &["a"]);
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_try_expand() {
        let table = MacroTable::build(&[MacroDefinition::new("greet", "Hello $0 and $1!")]);
        assert_eq!(
            try_expand("greet{Alice, Bob}", &table).as_deref(),
            Some("Hello Alice and Bob!")
        );
        assert_eq!(try_expand("greet", &table), None);
        assert_eq!(try_expand("other{x}", &table), None);
    }

    #[test]
    fn test_try_expand_empty_braces() {
        let table = MacroTable::build(&[
            MacroDefinition::new("hr", "---"),
            MacroDefinition::new("echo", "[$0]"),
        ]);
        assert_eq!(try_expand("hr{}", &table).as_deref(), Some("---"));
        assert_eq!(try_expand("echo{}", &table).as_deref(), Some("[]"));
    }

    #[test]
    fn test_try_expand_with_report() {
        let table = MacroTable::build(&[MacroDefinition::new("pair", "($0, $1)")]);
        let output = try_expand_with_report("pair{x}", &table).unwrap();
        assert_eq!(output.content, "(x, undefined)");
        assert!(output.has_warnings());
        assert!(try_expand_with_report("nope{x}", &table).is_none());
    }
}
