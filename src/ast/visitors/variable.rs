//! Variable collection visitor.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use crate::ast::Expression;
use crate::ast::expression::Aggregate;
use crate::ast::pattern::GraphPatternOperation;
use crate::ast::term::Term;
use crate::ast::term::Variable;
use crate::ast::visit::{Visit, walk_aggregate, walk_expression, walk_operation};

/// Collects variable definitions and references from expressions and graph
/// patterns.
///
/// *References* are variables read by expressions. *Unaggregated references*
/// are the subset read outside of any aggregate. *Definitions* are variables
/// bound by patterns, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct VariableCollector {
    references: BTreeSet<Variable>,
    unaggregated: BTreeSet<Variable>,
    definitions: Vec<Variable>,
    aggregate_depth: usize,
}

impl VariableCollector {
    /// Creates a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects variable references from a single expression.
    pub fn collect_references_from_expression(expression: &Expression) -> BTreeSet<Variable> {
        let mut collector = Self::new();
        let _ = collector.visit_expression(expression);
        collector.references
    }

    /// Collects the variables an expression reads outside of aggregates.
    pub fn collect_unaggregated_references(expression: &Expression) -> BTreeSet<Variable> {
        let mut collector = Self::new();
        let _ = collector.visit_expression(expression);
        collector.unaggregated
    }

    /// Collects the variables a pattern operation binds, in order.
    pub fn collect_definitions_from_operation(operation: &GraphPatternOperation) -> Vec<Variable> {
        let mut collector = Self::new();
        let _ = collector.visit_operation(operation);
        collector.definitions
    }

    /// Returns collected variable references.
    pub fn references(&self) -> &BTreeSet<Variable> {
        &self.references
    }

    /// Returns references that occurred outside of aggregates.
    pub fn unaggregated_references(&self) -> &BTreeSet<Variable> {
        &self.unaggregated
    }

    /// Returns collected variable definitions.
    pub fn definitions(&self) -> &[Variable] {
        &self.definitions
    }

    fn define(&mut self, variable: &Variable) {
        if !self.definitions.contains(variable) {
            self.definitions.push(variable.clone());
        }
    }

    fn reference(&mut self, variable: &Variable) {
        self.references.insert(variable.clone());
        if self.aggregate_depth == 0 {
            self.unaggregated.insert(variable.clone());
        }
    }
}

impl Visit for VariableCollector {
    type Break = ();

    fn visit_expression(&mut self, expression: &Expression) -> ControlFlow<Self::Break> {
        if let Expression::Variable(variable) = expression {
            self.reference(variable);
        }

        walk_expression(self, expression)
    }

    fn visit_aggregate(&mut self, aggregate: &Aggregate) -> ControlFlow<Self::Break> {
        self.aggregate_depth += 1;
        let flow = walk_aggregate(self, aggregate);
        self.aggregate_depth -= 1;
        flow
    }

    fn visit_operation(&mut self, operation: &GraphPatternOperation) -> ControlFlow<Self::Break> {
        match operation {
            // MINUS removes solutions, it never binds.
            GraphPatternOperation::Minus(_) | GraphPatternOperation::Filter(_) => {
                ControlFlow::Continue(())
            }
            GraphPatternOperation::Bind(bind) => {
                self.define(&bind.target);
                ControlFlow::Continue(())
            }
            GraphPatternOperation::Values(values) => {
                for variable in &values.variables {
                    self.define(variable);
                }
                ControlFlow::Continue(())
            }
            // Only the projection of a sub-select is visible outside of it.
            GraphPatternOperation::Subquery(query) => {
                for variable in query.selected_variables() {
                    self.define(&variable);
                }
                ControlFlow::Continue(())
            }
            _ => walk_operation(self, operation),
        }
    }

    fn visit_term(&mut self, term: &Term) -> ControlFlow<Self::Break> {
        if let Term::Variable(variable) = term {
            self.define(variable);
        }
        ControlFlow::Continue(())
    }
}
