//! Simple Macros - named, parameterized text templates
//!
//! A macro is a name plus a template with positional placeholders (`$0`,
//! `$1`, ...). Documents invoke macros from inline code spans written as
//! `name{arg, arg}`, and each invocation is replaced with the template
//! after argument substitution.
//!
//! # Example
//!
//! ```
//! use simple_macros::{try_expand, MacroDefinition, MacroTable};
//!
//! let table = MacroTable::build(&[MacroDefinition::new("greet", "Hello $0 and $1!")]);
//! assert_eq!(
//!     try_expand("greet{Alice, Bob}", &table).as_deref(),
//!     Some("Hello Alice and Bob!")
//! );
//! assert_eq!(try_expand("not a macro", &table), None);
//! ```
//!
//! Definitions are edited through a [`MacroSession`], which owns the ordered
//! list and rebuilds the shared [`TableHandle`] after every change.

pub mod core;
pub mod document;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::core::{
    expand, expand_with_report, match_invocation, parse_template, template_arity, try_expand,
    try_expand_with_report, Invocation, MacroDefinition, MacroTable, TableHandle, TemplateInfo,
    UNDEFINED_ARG,
};
pub use document::{expand_code_spans, find_code_spans, CodeSpan, DocumentOutput};
pub use session::MacroSession;
pub use settings::{Settings, SettingsFormat};
pub use utils::error::{
    ExpansionOutput, ExpansionWarning, SettingsError, SettingsResult, WarningKind,
};
