//! Graph patterns forming the body (`WHERE` clause) of a query.
//!
//! A [`GraphPattern`] is an ordered list of [`GraphPatternOperation`]s. Each
//! operation exclusively owns its children, so the tree is acyclic and can be
//! moved freely. Sub-selects own a complete nested [`Query`].
//!
//! # Examples
//!
//! ```text
//! { ?s ?p ?o . OPTIONAL { ?s <name> ?n } BIND(STRLEN(?n) AS ?len) }
//! ```

use crate::ast::expression::Expression;
use crate::ast::term::{Term, TriplePattern, Variable};
use crate::ast::visitors::VariableCollector;
use crate::query::Query;

/// An ordered group of pattern operations (`{ ... }`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphPattern {
    pub operations: Vec<GraphPatternOperation>,
}

impl GraphPattern {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group from the given operations.
    pub fn from_operations(operations: Vec<GraphPatternOperation>) -> Self {
        Self { operations }
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: GraphPatternOperation) {
        self.operations.push(operation);
    }

    /// Returns the variables bound by this group, in first-seen order.
    pub fn bound_variables(&self) -> Vec<Variable> {
        let mut variables = Vec::new();
        for operation in &self.operations {
            for variable in operation.bound_variables() {
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
            }
        }
        variables
    }
}

/// A single node of the pattern tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphPatternOperation {
    /// Basic graph pattern: a block of triple patterns.
    Triples(Vec<TriplePattern>),
    /// Nested group `{ ... }`.
    Group(GraphPattern),
    /// `OPTIONAL { ... }`.
    Optional(GraphPattern),
    /// `{ ... } UNION { ... }`.
    Union(GraphPattern, GraphPattern),
    /// `MINUS { ... }`.
    Minus(GraphPattern),
    /// `GRAPH <iri> { ... }` or `GRAPH ?g { ... }`.
    Graph { name: Term, pattern: GraphPattern },
    /// `BIND(expr AS ?v)`.
    Bind(Bind),
    /// Inline `VALUES` block.
    Values(Values),
    /// `FILTER(expr)`.
    Filter(Expression),
    /// Nested `SELECT` query.
    Subquery(Box<Query>),
    /// `SERVICE [SILENT] <endpoint> { ... }`.
    Service(Service),
}

impl GraphPatternOperation {
    /// Returns the variables this operation binds, in first-seen order.
    ///
    /// The grammar layer feeds this into
    /// [`Query::register_variables`](crate::Query::register_variables).
    pub fn bound_variables(&self) -> Vec<Variable> {
        VariableCollector::collect_definitions_from_operation(self)
    }

    /// Returns a short keyword naming the operation kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            GraphPatternOperation::Triples(_) => "triples",
            GraphPatternOperation::Group(_) => "group",
            GraphPatternOperation::Optional(_) => "OPTIONAL",
            GraphPatternOperation::Union(_, _) => "UNION",
            GraphPatternOperation::Minus(_) => "MINUS",
            GraphPatternOperation::Graph { .. } => "GRAPH",
            GraphPatternOperation::Bind(_) => "BIND",
            GraphPatternOperation::Values(_) => "VALUES",
            GraphPatternOperation::Filter(_) => "FILTER",
            GraphPatternOperation::Subquery(_) => "subquery",
            GraphPatternOperation::Service(_) => "SERVICE",
        }
    }
}

/// `BIND(expression AS target)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub expression: Expression,
    pub target: Variable,
    /// Whether `target` is exposed to an enclosing `SELECT *`. False for
    /// binds synthesized by the query model.
    pub visible: bool,
}

/// A `VALUES` block. `None` entries are `UNDEF`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    pub variables: Vec<Variable>,
    pub rows: Vec<Vec<Option<Term>>>,
}

impl Values {
    pub fn new(variables: Vec<Variable>, rows: Vec<Vec<Option<Term>>>) -> Self {
        Self { variables, rows }
    }
}

/// A federated `SERVICE` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub endpoint: Term,
    pub pattern: GraphPattern,
    pub silent: bool,
}
