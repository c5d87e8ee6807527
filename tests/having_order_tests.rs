//! HAVING and ORDER BY validation and rewriting

mod common;

use common::{assert_fails_with, count, format_warnings, select_query, var, with_alias};
use sparql_model::ast::{
    BinaryOperator, Expression, GraphPatternOperation, GroupKey, Literal, OrderKey,
    SolutionModifiers,
};
use sparql_model::{InvalidQueryKind, ValidationConfig};

fn greater_than(left: Expression, right: i64) -> Expression {
    Expression::binary(
        BinaryOperator::Greater,
        left,
        Expression::Literal(Literal::Numeric(right.to_string().into())),
    )
}

fn bind_count(query: &sparql_model::Query) -> usize {
    query
        .children()
        .iter()
        .filter(|op| matches!(op, GraphPatternOperation::Bind(_)))
        .count()
}

// ==================== HAVING ====================

#[test]
fn having_requires_grouping() {
    for config in [ValidationConfig::strict(), ValidationConfig::lenient()] {
        let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
        let result = query.add_solution_modifiers(
            SolutionModifiers::new().with_having(vec![greater_than(count("?y"), 1)]),
            &config,
        );
        assert_fails_with(result, InvalidQueryKind::Structural, "HAVING");
    }
}

#[test]
fn having_is_stored_for_grouped_query() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let filter = greater_than(count("?y"), 2);
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_group_by(vec![GroupKey::Variable(var("?x"))])
                .with_having(vec![filter.clone()]),
            &ValidationConfig::strict(),
        )
        .unwrap();
    assert_eq!(query.having_clauses(), &[filter]);
    assert_eq!(bind_count(&query), 0, "HAVING is never rewritten");
}

#[test]
fn having_may_read_alias_target() {
    let query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let mut query = with_alias(query, count("?y"), "?n");
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_group_by(vec![GroupKey::Variable(var("?x"))])
                .with_having(vec![greater_than(Expression::variable("?n"), 5)]),
            &ValidationConfig::strict(),
        )
        .unwrap();
    assert_eq!(query.having_clauses().len(), 1);
}

#[test]
fn having_with_ungrouped_variable_is_rejected() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let result = query.add_solution_modifiers(
        SolutionModifiers::new()
            .with_group_by(vec![GroupKey::Variable(var("?x"))])
            .with_having(vec![greater_than(Expression::variable("?y"), 5)]),
        &ValidationConfig::lenient(),
    );
    assert_fails_with(
        result,
        InvalidQueryKind::Grouping,
        "Variable ?y is used in the HAVING clause",
    );
}

#[test]
fn having_with_unbound_variable_warns_in_lenient_mode() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_group_by(vec![GroupKey::Variable(var("?x"))])
                .with_having(vec![greater_than(count("?ghost"), 0)]),
            &ValidationConfig::lenient(),
        )
        .unwrap();
    assert_eq!(query.warnings().len(), 1, "Warnings: {}", format_warnings(&query));
    assert!(query.warnings()[0].contains("HAVING"));
}

// ==================== ORDER BY ====================

#[test]
fn order_by_alias_target_without_grouping() {
    let query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let mut query = with_alias(
        query,
        Expression::binary(
            BinaryOperator::Add,
            Expression::variable("?y"),
            Expression::variable("?y"),
        ),
        "?double",
    );
    query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![OrderKey::descending(var("?double"))]),
            &ValidationConfig::strict(),
        )
        .unwrap();
    assert_eq!(query.order_by()[0].to_string(), "DESC(?double)");
}

#[test]
fn order_by_bare_variable_expression_is_not_rewritten() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_order_by(vec![OrderKey::expression(Expression::variable("?y"), false)]),
            &ValidationConfig::strict(),
        )
        .unwrap();
    assert_eq!(query.order_by()[0].variable, var("?y"));
    assert!(!query.is_internal_sort());
    assert_eq!(query.num_internal_variables(), 0);
}

#[test]
fn order_by_expression_becomes_hidden_bind() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let expression = Expression::binary(
        BinaryOperator::Subtract,
        Expression::variable("?y"),
        Expression::variable("?x"),
    );
    query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![
                OrderKey::ascending(var("?x")),
                OrderKey::expression(expression, true),
            ]),
            &ValidationConfig::strict(),
        )
        .unwrap();

    assert!(query.is_internal_sort());
    let keys = query.order_by();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].variable, var("?x"));
    assert!(keys[1].variable.is_internal());
    assert!(keys[1].descending);
    assert_eq!(query.selected_variables(), vec![var("?x")]);
    assert!(query.aliases().is_empty(), "ORDER BY binds are not aliases");
}

#[test]
fn order_by_expression_over_alias_is_computed_at_projection() {
    let query = select_query(&["?s", "?p", "?o"], &["?s"]);
    let mut query = with_alias(query, Expression::variable("?o"), "?y");
    let key = Expression::binary(
        BinaryOperator::Add,
        Expression::variable("?y"),
        Expression::Literal(Literal::Numeric("1".into())),
    );
    query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![OrderKey::expression(key.clone(), false)]),
            &ValidationConfig::strict(),
        )
        .unwrap();

    assert_eq!(bind_count(&query), 0, "no body BIND may read ?y");
    let sort_alias = query.aliases().last().expect("internal alias for the sort key");
    assert!(sort_alias.is_internal());
    assert_eq!(sort_alias.expression, key);
    assert_eq!(query.order_by()[0].variable, sort_alias.target);
    assert!(!query.is_visible(&sort_alias.target));
    assert!(query.is_internal_sort());
    assert_eq!(query.selected_variables(), vec![var("?s"), var("?y")]);
}

#[test]
fn grouped_order_by_expression_over_aggregate_alias() {
    let query = select_query(&["?s", "?p", "?o"], &["?s"]);
    let mut query = with_alias(query, count("?o"), "?n");
    let key = Expression::binary(
        BinaryOperator::Multiply,
        Expression::variable("?n"),
        Expression::variable("?n"),
    );
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_group_by(vec![GroupKey::Variable(var("?s"))])
                .with_order_by(vec![OrderKey::expression(key.clone(), true)]),
            &ValidationConfig::strict(),
        )
        .unwrap();

    assert_eq!(bind_count(&query), 0);
    let sort_alias = query.aliases().last().expect("internal alias for the sort key");
    assert!(sort_alias.is_internal());
    assert_eq!(sort_alias.expression, key);
    assert_eq!(query.order_by()[0].variable, sort_alias.target);
    assert!(query.order_by()[0].descending);
}

#[test]
fn grouped_order_by_on_ungrouped_variable_depends_on_policy() {
    let modifiers = || {
        SolutionModifiers::new()
            .with_group_by(vec![GroupKey::Variable(var("?x"))])
            .with_order_by(vec![OrderKey::ascending(var("?y"))])
    };

    let mut strict = select_query(&["?x", "?p", "?y"], &["?x"]);
    let result = strict.add_solution_modifiers(modifiers(), &ValidationConfig::strict());
    assert_fails_with(
        result,
        InvalidQueryKind::Visibility,
        "neither grouped nor created as an alias",
    );

    let mut lenient = select_query(&["?x", "?p", "?y"], &["?x"]);
    lenient
        .add_solution_modifiers(modifiers(), &ValidationConfig::lenient())
        .unwrap();
    assert_eq!(lenient.warnings().len(), 1, "Warnings: {}", format_warnings(&lenient));
    assert!(lenient.warnings()[0].contains("?y"));
}

#[test]
fn grouped_order_by_accepts_grouped_and_aliased_variables() {
    let query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let mut query = with_alias(query, count("?y"), "?n");
    query
        .add_solution_modifiers(
            SolutionModifiers::new()
                .with_group_by(vec![GroupKey::Variable(var("?x"))])
                .with_order_by(vec![
                    OrderKey::ascending(var("?x")),
                    OrderKey::descending(var("?n")),
                ]),
            &ValidationConfig::strict(),
        )
        .unwrap();
    assert_eq!(query.order_by().len(), 2);
    assert!(query.warnings().is_empty());
}

#[test]
fn grouped_order_by_expression_must_aggregate() {
    let mut query = select_query(&["?x", "?p", "?y"], &["?x"]);
    let result = query.add_solution_modifiers(
        SolutionModifiers::new()
            .with_group_by(vec![GroupKey::Variable(var("?x"))])
            .with_order_by(vec![OrderKey::expression(
                Expression::binary(
                    BinaryOperator::Add,
                    Expression::variable("?y"),
                    Expression::variable("?x"),
                ),
                false,
            )]),
        &ValidationConfig::lenient(),
    );
    assert_fails_with(result, InvalidQueryKind::Grouping, "ORDER BY expression");
}

#[test]
fn implicit_grouping_note_on_order_by_warning() {
    let query = select_query(&["?x", "?p", "?y"], &[]);
    let mut query = with_alias(query, count("?y"), "?n");
    query
        .add_solution_modifiers(
            SolutionModifiers::new().with_order_by(vec![OrderKey::ascending(var("?x"))]),
            &ValidationConfig::lenient(),
        )
        .unwrap();
    assert_eq!(query.warnings().len(), 1);
    assert!(
        query.warnings()[0].contains("implicit"),
        "Warnings: {}",
        format_warnings(&query)
    );
}
