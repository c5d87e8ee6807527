//! Semantic model of parsed SPARQL queries.
//!
//! A grammar layer builds a [`Query`] step by step: it fills the graph
//! pattern body, registers the variables the body binds, sets the header
//! clause and finally hands over the solution modifiers. The model checks
//! GROUP BY, HAVING, ORDER BY and SELECT aliases against the body and
//! rewrites expression keys into internal BINDs.
//!
//! # Example
//!
//! ```
//! use sparql_model::ast::{HeaderClause, OrderKey, SelectClause, SolutionModifiers, Variable};
//! use sparql_model::{Query, ValidationConfig};
//!
//! let mut query = Query::new("SELECT ?x WHERE { ?x ?p ?o } ORDER BY ?unbound");
//! query.register_variables(["?x", "?p", "?o"].map(Variable::new));
//! query
//!     .set_header_clause(HeaderClause::Select(SelectClause::with_variables(vec![
//!         Variable::new("?x"),
//!     ])))
//!     .unwrap();
//!
//! let modifiers = SolutionModifiers::new()
//!     .with_order_by(vec![OrderKey::ascending(Variable::new("?unbound"))]);
//! query
//!     .add_solution_modifiers(modifiers, &ValidationConfig::lenient())
//!     .unwrap();
//!
//! assert_eq!(query.warnings().len(), 1);
//! assert!(query.warnings()[0].contains("?unbound"));
//! ```

pub mod ast;
pub mod diag;
pub mod error;
pub mod naming;
pub mod query;
pub mod semantic;

pub use diag::{Diag, DiagSeverity, SourceFile};
pub use error::{InvalidQueryError, InvalidQueryKind, Result};
pub use query::Query;
pub use semantic::ValidationConfig;
