//! Common test utilities
//!
//! Shared builders and assertions for the integration tests.
//!
//! # Query Builders
//! - [`select_query`] - SELECT query whose body binds the given variables
//! - [`with_alias`] - Append a user alias to the SELECT clause
//!
//! # Assertion Helpers
//! - [`assert_fails_with`] - Assert an error kind and message fragment
//! - [`format_warnings`] - Format recorded warnings for assertion messages

#![allow(dead_code)]

use sparql_model::ast::{
    Aggregate, AggregateFunction, Alias, Expression, GraphPatternOperation, HeaderClause, Iri,
    SelectClause, TriplePattern, Variable,
};
use sparql_model::{InvalidQueryKind, Query, Result};

// ============================================================================
// Query Builders
// ============================================================================

pub fn var(name: &str) -> Variable {
    Variable::new(name)
}

/// `COUNT(?name)`
pub fn count(name: &str) -> Expression {
    Expression::aggregate(AggregateFunction::Count, Expression::variable(name))
}

/// `COUNT(*)`
pub fn count_star() -> Expression {
    Expression::Aggregate(Aggregate::count_star(false))
}

/// Builds a query whose body is one triple block over `body` and whose
/// header selects `selected`.
///
/// The first three body variables are used as subject, predicate and
/// object of the triple; every body variable is registered as visible.
pub fn select_query(body: &[&str], selected: &[&str]) -> Query {
    let mut query = Query::new("");
    if body.len() >= 3 {
        query.add_pattern(GraphPatternOperation::Triples(vec![TriplePattern::new(
            var(body[0]),
            var(body[1]),
            var(body[2]),
        )]));
    } else if let [subject, rest @ ..] = body {
        let object = rest.first().copied().unwrap_or(*subject);
        query.add_pattern(GraphPatternOperation::Triples(vec![TriplePattern::new(
            var(subject),
            Iri::new("http://example.org/p"),
            var(object),
        )]));
    }
    query.register_variables(body.iter().map(|name| var(name)));
    query
        .set_header_clause(HeaderClause::Select(SelectClause::with_variables(
            selected.iter().map(|name| var(name)).collect(),
        )))
        .expect("fresh query accepts a header clause");
    query
}

/// Appends `(expression AS ?target)` to the SELECT clause.
pub fn with_alias(mut query: Query, expression: Expression, target: &str) -> Query {
    query
        .select_clause_mut()
        .expect("query has a SELECT clause")
        .add_alias(Alias::new(expression, var(target)));
    query
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Format recorded warnings for display in assertion messages.
pub fn format_warnings(query: &Query) -> String {
    query.warnings().join("\n")
}

/// Assert that `result` failed with `kind` and a message containing `fragment`.
///
/// # Panics
/// Panics if the result is `Ok` or the error does not match.
pub fn assert_fails_with<T: std::fmt::Debug>(
    result: Result<T>,
    kind: InvalidQueryKind,
    fragment: &str,
) {
    match result {
        Ok(value) => panic!("Expected {kind:?} error containing '{fragment}', got Ok({value:?})"),
        Err(err) => {
            assert_eq!(err.kind(), kind, "Unexpected error kind: {}", err.message());
            assert!(
                err.message().contains(fragment),
                "Error message should contain '{fragment}'. Message: {}",
                err.message()
            );
        }
    }
}
