//! Solution modifiers as handed over by the grammar layer.
//!
//! [`SolutionModifiers`] is consumed once by
//! [`Query::add_solution_modifiers`](crate::Query::add_solution_modifiers);
//! what ends up on the query are plain variables ([`VariableOrderKey`],
//! grouped variables) plus the stored HAVING expressions.

use std::fmt;

use crate::ast::expression::Expression;
use crate::ast::term::Variable;

/// One entry of a GROUP BY clause.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// `GROUP BY ?x`
    Variable(Variable),
    /// `GROUP BY (STR(?x))`
    Expression(Expression),
    /// `GROUP BY (STR(?x) AS ?s)`
    Alias { expression: Expression, target: Variable },
}

/// One entry of an ORDER BY clause, before rewriting.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    Variable { variable: Variable, descending: bool },
    Expression { expression: Expression, descending: bool },
}

impl OrderKey {
    /// `ASC(?variable)` or plain `?variable`.
    pub fn ascending(variable: Variable) -> Self {
        OrderKey::Variable {
            variable,
            descending: false,
        }
    }

    /// `DESC(?variable)`.
    pub fn descending(variable: Variable) -> Self {
        OrderKey::Variable {
            variable,
            descending: true,
        }
    }

    /// An ordering by an arbitrary expression.
    pub fn expression(expression: Expression, descending: bool) -> Self {
        OrderKey::Expression {
            expression,
            descending,
        }
    }
}

/// An ORDER BY entry after rewriting: always a plain variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableOrderKey {
    pub variable: Variable,
    pub descending: bool,
}

impl fmt::Display for VariableOrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "DESC({})", self.variable)
        } else {
            write!(f, "ASC({})", self.variable)
        }
    }
}

/// `LIMIT` / `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitOffset {
    pub limit: Option<u64>,
    pub offset: u64,
}

impl LimitOffset {
    pub fn new(limit: Option<u64>, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// True if neither LIMIT nor a non-zero OFFSET is present.
    pub fn is_unconstrained(&self) -> bool {
        self.limit.is_none() && self.offset == 0
    }

    /// Number of input rows needed to produce the result, if bounded.
    pub fn upper_bound(&self) -> Option<u64> {
        self.limit.map(|limit| limit.saturating_add(self.offset))
    }
}

impl fmt::Display for LimitOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if let Some(limit) = self.limit {
            write!(f, "LIMIT {limit}")?;
            sep = " ";
        }
        if self.offset > 0 {
            write!(f, "{sep}OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}

/// Raw modifiers of a query, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolutionModifiers {
    pub group_by: Vec<GroupKey>,
    pub having: Vec<Expression>,
    pub order_by: Vec<OrderKey>,
    pub limit_offset: LimitOffset,
}

impl SolutionModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group_by(mut self, keys: Vec<GroupKey>) -> Self {
        self.group_by = keys;
        self
    }

    pub fn with_having(mut self, filters: Vec<Expression>) -> Self {
        self.having = filters;
        self
    }

    pub fn with_order_by(mut self, keys: Vec<OrderKey>) -> Self {
        self.order_by = keys;
        self
    }

    pub fn with_limit_offset(mut self, limit_offset: LimitOffset) -> Self {
        self.limit_offset = limit_offset;
        self
    }
}
