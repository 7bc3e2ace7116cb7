//! Variable resolution: `{{name}}` placeholders, built-in dynamic variables,
//! and whole-request substitution.

pub mod builtins;
pub mod substitution;

pub use builtins::builtin_variables;
pub use substitution::{
    contains_variables, extract_variable_names, resolve_text, ResolvedRequest, VariableResolver,
};
