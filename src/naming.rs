//! Names of variables synthesized by the query model.
//!
//! Internal variables share the reserved `?@` prefix. `@` cannot appear in a
//! SPARQL `VARNAME`, so no user-written variable can ever collide with them.

use crate::ast::Variable;

/// Prefix shared by every synthesized variable.
pub const RESERVED_PREFIX: &str = "?@";

/// Prefix of variables created for internal BINDs and aliases.
pub const INTERNAL_VARIABLE_PREFIX: &str = "?@internal_";

/// Prefix of variables standing in for blank nodes of the query body.
pub const INTERNAL_BLANK_NODE_PREFIX: &str = "?@bnode_";

/// Returns the internal variable with the given sequence number.
///
/// Distinct indices always produce distinct variables.
pub fn internal_variable(index: u64) -> Variable {
    Variable::new(format!("{INTERNAL_VARIABLE_PREFIX}{index}"))
}

/// Maps a blank node label (`_:b0` or `b0`) to the variable that replaces it
/// inside the query body.
pub fn blank_node_to_internal_variable(label: &str) -> Variable {
    let label = label.strip_prefix("_:").unwrap_or(label);
    Variable::new(format!("{INTERNAL_BLANK_NODE_PREFIX}{label}"))
}

/// Returns true for names in the reserved namespace.
pub fn is_internal_name(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}
