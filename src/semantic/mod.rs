//! Semantic validation and rewriting of solution modifiers.
//!
//! This module attaches GROUP BY, HAVING, ORDER BY and LIMIT/OFFSET to a
//! [`Query`](crate::Query) whose body and header are complete:
//! - Variable visibility: a variable used by a modifier must be bound by the
//!   body (or by an alias that is in scope at that point)
//! - Grouping: in a grouped query, only grouped variables may be read outside
//!   of aggregates
//! - Rewriting: expressions in GROUP BY and ORDER BY are materialized as
//!   internal BINDs so later stages only deal with plain variables
//!
//! # Example
//!
//! ```
//! use sparql_model::ast::{
//!     AggregateFunction, Expression, GroupKey, OrderKey, SolutionModifiers, Variable,
//! };
//! use sparql_model::{Query, ValidationConfig};
//!
//! let mut query = Query::new("SELECT ?s WHERE { ?s ?p ?o } GROUP BY ?s ORDER BY DESC(COUNT(?o))");
//! query.register_variables(["?s", "?p", "?o"].map(Variable::new));
//! query.select_clause_mut().unwrap().add_variable(Variable::new("?s"));
//!
//! let modifiers = SolutionModifiers::new()
//!     .with_group_by(vec![GroupKey::Variable(Variable::new("?s"))])
//!     .with_order_by(vec![OrderKey::expression(
//!         Expression::aggregate(AggregateFunction::Count, Expression::variable("?o")),
//!         true,
//!     )]);
//!
//! query
//!     .add_solution_modifiers(modifiers, &ValidationConfig::strict())
//!     .expect("valid modifiers");
//! assert_eq!(query.group_by_variables(), &[Variable::new("?s")]);
//! assert_eq!(query.num_internal_variables(), 1);
//! ```

mod modifiers;
mod visibility;

/// Configuration for semantic validation.
///
/// Passed explicitly to every check that depends on it, so two queries built
/// side by side may use different policies.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Treat the use of an unbound variable as an error instead of recording
    /// a warning on the query.
    pub strict_mode: bool,
}

impl ValidationConfig {
    /// Creates the default (lenient) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unbound variables are hard errors.
    pub fn strict() -> Self {
        Self { strict_mode: true }
    }

    /// Unbound variables are recorded as warnings.
    pub fn lenient() -> Self {
        Self { strict_mode: false }
    }

    /// Sets strict mode.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }
}
