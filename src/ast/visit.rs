//! Immutable visitor over expressions and graph patterns.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to continue into children. Returning
//! [`ControlFlow::Break`] stops the traversal early.

use std::ops::ControlFlow;

use crate::ast::expression::{Aggregate, Expression};
use crate::ast::pattern::{GraphPattern, GraphPatternOperation};
use crate::ast::term::{Term, TriplePattern};
use crate::query::Query;

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

pub trait Visit {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }

    fn visit_aggregate(&mut self, aggregate: &Aggregate) -> VisitResult<Self::Break> {
        walk_aggregate(self, aggregate)
    }

    fn visit_graph_pattern(&mut self, pattern: &GraphPattern) -> VisitResult<Self::Break> {
        walk_graph_pattern(self, pattern)
    }

    fn visit_operation(&mut self, operation: &GraphPatternOperation) -> VisitResult<Self::Break> {
        walk_operation(self, operation)
    }

    fn visit_subquery(&mut self, query: &Query) -> VisitResult<Self::Break> {
        self.visit_graph_pattern(query.root_pattern())
    }

    fn visit_triple(&mut self, triple: &TriplePattern) -> VisitResult<Self::Break> {
        walk_triple(self, triple)
    }

    fn visit_term(&mut self, _term: &Term) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

pub fn walk_expression<V: Visit + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    match expression {
        Expression::Variable(_) | Expression::Literal(_) | Expression::Iri(_) => {}
        Expression::Unary(_, operand) => try_visit!(visitor.visit_expression(operand)),
        Expression::Binary(_, left, right) => {
            try_visit!(visitor.visit_expression(left));
            try_visit!(visitor.visit_expression(right));
        }
        Expression::FunctionCall(call) => {
            for arg in &call.args {
                try_visit!(visitor.visit_expression(arg));
            }
        }
        Expression::Aggregate(aggregate) => try_visit!(visitor.visit_aggregate(aggregate)),
    }
    ControlFlow::Continue(())
}

pub fn walk_aggregate<V: Visit + ?Sized>(
    visitor: &mut V,
    aggregate: &Aggregate,
) -> VisitResult<V::Break> {
    if let Some(argument) = &aggregate.argument {
        try_visit!(visitor.visit_expression(argument));
    }
    ControlFlow::Continue(())
}

pub fn walk_graph_pattern<V: Visit + ?Sized>(
    visitor: &mut V,
    pattern: &GraphPattern,
) -> VisitResult<V::Break> {
    for operation in &pattern.operations {
        try_visit!(visitor.visit_operation(operation));
    }
    ControlFlow::Continue(())
}

pub fn walk_operation<V: Visit + ?Sized>(
    visitor: &mut V,
    operation: &GraphPatternOperation,
) -> VisitResult<V::Break> {
    match operation {
        GraphPatternOperation::Triples(triples) => {
            for triple in triples {
                try_visit!(visitor.visit_triple(triple));
            }
        }
        GraphPatternOperation::Group(pattern)
        | GraphPatternOperation::Optional(pattern)
        | GraphPatternOperation::Minus(pattern) => {
            try_visit!(visitor.visit_graph_pattern(pattern));
        }
        GraphPatternOperation::Union(left, right) => {
            try_visit!(visitor.visit_graph_pattern(left));
            try_visit!(visitor.visit_graph_pattern(right));
        }
        GraphPatternOperation::Graph { name, pattern } => {
            try_visit!(visitor.visit_term(name));
            try_visit!(visitor.visit_graph_pattern(pattern));
        }
        GraphPatternOperation::Service(service) => {
            try_visit!(visitor.visit_term(&service.endpoint));
            try_visit!(visitor.visit_graph_pattern(&service.pattern));
        }
        GraphPatternOperation::Bind(bind) => {
            try_visit!(visitor.visit_expression(&bind.expression));
        }
        GraphPatternOperation::Filter(expression) => {
            try_visit!(visitor.visit_expression(expression));
        }
        GraphPatternOperation::Values(values) => {
            for term in values.rows.iter().flatten().flatten() {
                try_visit!(visitor.visit_term(term));
            }
        }
        GraphPatternOperation::Subquery(query) => try_visit!(visitor.visit_subquery(query)),
    }
    ControlFlow::Continue(())
}

pub fn walk_triple<V: Visit + ?Sized>(
    visitor: &mut V,
    triple: &TriplePattern,
) -> VisitResult<V::Break> {
    try_visit!(visitor.visit_term(&triple.subject));
    try_visit!(visitor.visit_term(&triple.predicate));
    visitor.visit_term(&triple.object)
}
