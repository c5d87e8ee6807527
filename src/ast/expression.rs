//! Expressions used in FILTER, BIND, SELECT aliases and solution modifiers.
//!
//! The query model never evaluates expressions. It only needs to know which
//! variables an expression reads and whether (and where) it aggregates.

use std::collections::BTreeSet;
use std::fmt;

use smol_str::SmolStr;

use crate::ast::term::{Iri, Literal, Variable};
use crate::ast::visitors::VariableCollector;

/// A SPARQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Variable reference.
    Variable(Variable),
    /// Literal constant.
    Literal(Literal),
    /// IRI constant.
    Iri(Iri),
    /// Unary operator application (`!e`, `-e`, `+e`).
    Unary(UnaryOperator, Box<Expression>),
    /// Binary operator application.
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
    /// Built-in or IRI-named function call.
    FunctionCall(FunctionCall),
    /// Aggregate (`COUNT`, `SUM`, ...).
    Aggregate(Aggregate),
}

impl Expression {
    /// Convenience constructor for a variable reference.
    pub fn variable(name: impl AsRef<str>) -> Self {
        Expression::Variable(Variable::new(name))
    }

    /// Convenience constructor for a binary expression.
    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(op, Box::new(left), Box::new(right))
    }

    /// Convenience constructor for an aggregate over a single argument.
    pub fn aggregate(function: AggregateFunction, argument: Expression) -> Self {
        Expression::Aggregate(Aggregate {
            function,
            distinct: false,
            argument: Some(Box::new(argument)),
        })
    }

    /// Returns the variable if the whole expression is a bare variable.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expression::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns all variables this expression reads, including those inside
    /// aggregates.
    pub fn variables(&self) -> BTreeSet<Variable> {
        VariableCollector::collect_references_from_expression(self)
    }

    /// Returns true if the expression contains an aggregate anywhere.
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate(_) => true,
            Expression::Variable(_) | Expression::Literal(_) | Expression::Iri(_) => false,
            Expression::Unary(_, operand) => operand.contains_aggregate(),
            Expression::Binary(_, left, right) => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expression::FunctionCall(call) => call.args.iter().any(Expression::contains_aggregate),
        }
    }

    /// Returns the variables read *outside* of any aggregate that are not in
    /// `grouped`.
    ///
    /// In a grouped query these are exactly the variables whose per-row value
    /// is undefined, so a non-empty result means the expression is illegal.
    pub fn unaggregated_variables(&self, grouped: &BTreeSet<Variable>) -> BTreeSet<Variable> {
        VariableCollector::collect_unaggregated_references(self)
            .into_iter()
            .filter(|variable| !grouped.contains(variable))
            .collect()
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::Variable(variable)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(variable) => variable.fmt(f),
            Expression::Literal(literal) => literal.fmt(f),
            Expression::Iri(iri) => iri.fmt(f),
            Expression::Unary(op, operand) => write!(f, "{op}{operand}"),
            Expression::Binary(op, left, right) => write!(f, "({left} {op} {right})"),
            Expression::FunctionCall(call) => call.fmt(f),
            Expression::Aggregate(aggregate) => aggregate.fmt(f),
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Plus,
    Minus,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        })
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        })
    }
}

// ============================================================================
// Function calls and aggregates
// ============================================================================

/// A function call such as `STRLEN(?x)` or `<http://example.org/f>(?x)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionCall {
    /// Upper-case built-in name or a bracketed IRI.
    pub name: SmolStr,
    pub args: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(name: impl Into<SmolStr>, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(")")
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    Sample,
    GroupConcat { separator: Option<SmolStr> },
}

impl AggregateFunction {
    /// Returns the SPARQL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Sample => "SAMPLE",
            AggregateFunction::GroupConcat { .. } => "GROUP_CONCAT",
        }
    }
}

/// An aggregate application. `argument` is `None` only for `COUNT(*)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub distinct: bool,
    pub argument: Option<Box<Expression>>,
}

impl Aggregate {
    /// `COUNT(*)`.
    pub fn count_star(distinct: bool) -> Self {
        Self {
            function: AggregateFunction::Count,
            distinct,
            argument: None,
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.keyword())?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        match &self.argument {
            Some(argument) => argument.fmt(f)?,
            None => f.write_str("*")?,
        }
        if let AggregateFunction::GroupConcat {
            separator: Some(separator),
        } = &self.function
        {
            write!(f, "; SEPARATOR=\"{separator}\"")?;
        }
        f.write_str(")")
    }
}
