//! Macro engine core
//!
//! - `definition`: macro records and template parsing
//! - `invocation`: recognizing `name{arg, ...}` spans
//! - `table`: name-keyed snapshots and the shared handle that swaps them
//! - `expand`: argument substitution and the `try_expand` entry point

pub mod definition;
pub mod expand;
pub mod invocation;
pub mod table;

pub use definition::{
    parse_template, placeholder_indices, template_arity, MacroDefinition, TemplateInfo,
};
pub use expand::{expand, expand_with_report, try_expand, try_expand_with_report, UNDEFINED_ARG};
pub use invocation::{match_invocation, split_args, Invocation};
pub use table::{MacroTable, TableHandle};
