//! End-to-end construction scenarios
//!
//! Each test builds a query the way the grammar layer does (body, header,
//! modifiers) and checks the final state of the model.

mod common;

use common::{assert_fails_with, count, format_warnings, select_query, var};
use sparql_model::ast::{GraphPatternOperation, LimitOffset, OrderKey, SolutionModifiers, GroupKey};
use sparql_model::{InvalidQueryKind, ValidationConfig};

#[test]
fn group_by_with_aggregate_order_key() {
    let mut query = select_query(&["?s", "?p", "?o"], &[]);
    let modifiers = SolutionModifiers::new()
        .with_group_by(vec![GroupKey::Variable(var("?s"))])
        .with_order_by(vec![OrderKey::expression(count("?o"), true)]);

    query
        .add_solution_modifiers(modifiers, &ValidationConfig::strict())
        .expect("grouped query with aggregate ORDER BY is valid");

    assert_eq!(query.group_by_variables(), &[var("?s")]);
    assert!(query.warnings().is_empty(), "Warnings: {}", format_warnings(&query));
    assert_eq!(query.num_internal_variables(), 1);

    let binds: Vec<_> = query
        .children()
        .iter()
        .filter_map(|op| match op {
            GraphPatternOperation::Bind(bind) => Some(bind),
            _ => None,
        })
        .collect();
    assert_eq!(binds.len(), 1, "exactly one internal BIND expected");
    assert_eq!(binds[0].expression, count("?o"));
    assert!(binds[0].target.is_internal());
    assert!(!binds[0].visible);

    assert_eq!(query.order_by().len(), 1);
    assert_eq!(query.order_by()[0].variable, binds[0].target);
    assert!(query.order_by()[0].descending);
    assert!(query.is_internal_sort());
}

#[test]
fn order_by_unbound_variable_fails_in_strict_mode() {
    let mut query = select_query(&["?s"], &["?s"]);
    let modifiers =
        SolutionModifiers::new().with_order_by(vec![OrderKey::ascending(var("?unbound"))]);

    let result = query.add_solution_modifiers(modifiers, &ValidationConfig::strict());
    assert_fails_with(result, InvalidQueryKind::Visibility, "?unbound");

    let mut query = select_query(&["?s"], &["?s"]);
    let err = query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![OrderKey::ascending(var("?unbound"))]),
            &ValidationConfig::strict(),
        )
        .unwrap_err();
    assert!(err.message().contains("ORDER BY"), "Message: {}", err.message());
}

#[test]
fn order_by_unbound_variable_warns_in_lenient_mode() {
    let mut query = select_query(&["?s"], &["?s"]);
    let modifiers = SolutionModifiers::new()
        .with_order_by(vec![OrderKey::ascending(var("?unbound"))])
        .with_limit_offset(LimitOffset::new(Some(10), 0));

    query
        .add_solution_modifiers(modifiers, &ValidationConfig::lenient())
        .expect("lenient mode only warns");

    assert_eq!(query.warnings().len(), 1, "Warnings: {}", format_warnings(&query));
    assert!(query.warnings()[0].contains("?unbound"));
    assert_eq!(query.order_by().len(), 1);
    assert_eq!(query.order_by()[0].variable, var("?unbound"));
    assert!(!query.is_internal_sort());
    assert_eq!(query.limit_offset(), LimitOffset::new(Some(10), 0));
}

#[test]
fn diagnostics_render_recorded_warnings() {
    let mut query = select_query(&["?s"], &["?s"]);
    query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![OrderKey::descending(var("?missing"))]),
            &ValidationConfig::default(),
        )
        .unwrap();

    let reports = sparql_model::diag::convert_diagnostics_to_reports(
        &query.diagnostics(),
        &query.source_file(),
    );
    assert_eq!(reports.len(), 1);
    assert!(reports[0].to_string().contains("?missing"));
}
