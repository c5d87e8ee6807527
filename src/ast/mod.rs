//! Query model building blocks: terms, expressions, patterns, header clauses
//! and solution modifiers.

pub mod clause;
pub mod expression;
pub mod modifiers;
pub mod pattern;
pub mod term;
pub mod visit;
pub mod visitors;

pub use clause::{
    Alias, AskClause, ConstructClause, DatasetClauses, Distinctness, HeaderClause, Prefix,
    SelectClause, Selection, UpdateClause,
};
pub use expression::{
    Aggregate, AggregateFunction, BinaryOperator, Expression, FunctionCall, UnaryOperator,
};
pub use modifiers::{GroupKey, LimitOffset, OrderKey, SolutionModifiers, VariableOrderKey};
pub use pattern::{Bind, GraphPattern, GraphPatternOperation, Service, Values};
pub use term::{BlankNode, Iri, Literal, Term, TriplePattern, Variable};
