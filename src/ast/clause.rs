//! Header clauses: what a query produces.
//!
//! The set of query forms is fixed by the language, so [`HeaderClause`] is a
//! closed enum and consumers match on it exhaustively.

use std::fmt;

use crate::ast::expression::Expression;
use crate::ast::term::{Iri, TriplePattern, Variable};

// ============================================================================
// Header clause
// ============================================================================

/// The query form together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderClause {
    Select(SelectClause),
    Construct(ConstructClause),
    Update(UpdateClause),
    Ask(AskClause),
}

impl HeaderClause {
    /// Returns the SPARQL keyword of the query form.
    pub fn keyword(&self) -> &'static str {
        match self {
            HeaderClause::Select(_) => "SELECT",
            HeaderClause::Construct(_) => "CONSTRUCT",
            HeaderClause::Update(_) => "UPDATE",
            HeaderClause::Ask(_) => "ASK",
        }
    }
}

impl Default for HeaderClause {
    fn default() -> Self {
        HeaderClause::Select(SelectClause::default())
    }
}

// ============================================================================
// SELECT
// ============================================================================

/// `DISTINCT` / `REDUCED` modifier of a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distinctness {
    #[default]
    None,
    Distinct,
    Reduced,
}

/// `(expression AS target)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub expression: Expression,
    pub target: Variable,
}

impl Alias {
    pub fn new(expression: Expression, target: Variable) -> Self {
        Self { expression, target }
    }

    /// True for aliases synthesized by the query model.
    pub fn is_internal(&self) -> bool {
        self.target.is_internal()
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} AS {})", self.expression, self.target)
    }
}

/// The projection of a SELECT: `*` or an explicit variable list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Asterisk,
    /// Selected variables in order, including the targets of user aliases.
    Variables(Vec<Variable>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Variables(Vec::new())
    }
}

/// A SELECT header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectClause {
    selection: Selection,
    aliases: Vec<Alias>,
    pub distinctness: Distinctness,
}

impl SelectClause {
    /// `SELECT *`.
    pub fn asterisk() -> Self {
        Self {
            selection: Selection::Asterisk,
            ..Self::default()
        }
    }

    /// `SELECT ?a ?b ...`.
    pub fn with_variables(variables: Vec<Variable>) -> Self {
        Self {
            selection: Selection::Variables(variables),
            ..Self::default()
        }
    }

    /// Sets the distinctness modifier.
    pub fn with_distinctness(mut self, distinctness: Distinctness) -> Self {
        self.distinctness = distinctness;
        self
    }

    /// Returns true for `SELECT *`.
    pub fn is_asterisk(&self) -> bool {
        matches!(self.selection, Selection::Asterisk)
    }

    /// Returns the projection as written.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Appends a plain selected variable. Ignored for `SELECT *`.
    pub fn add_variable(&mut self, variable: Variable) {
        if let Selection::Variables(variables) = &mut self.selection {
            variables.push(variable);
        }
    }

    /// Appends an alias. User aliases also select their target; internal
    /// aliases are only computed, never projected.
    pub fn add_alias(&mut self, alias: Alias) {
        if !alias.is_internal() {
            self.add_variable(alias.target.clone());
        }
        self.aliases.push(alias);
    }

    /// Returns all aliases, user and internal, in insertion order.
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Returns the aliases written by the user.
    pub fn user_aliases(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter().filter(|alias| !alias.is_internal())
    }

    /// Returns the selected variables. `SELECT *` expands to the non-internal
    /// variables of `visible`.
    pub fn selected_variables(&self, visible: &[Variable]) -> Vec<Variable> {
        match &self.selection {
            Selection::Asterisk => visible
                .iter()
                .filter(|variable| !variable.is_internal())
                .cloned()
                .collect(),
            Selection::Variables(variables) => variables.clone(),
        }
    }
}

// ============================================================================
// CONSTRUCT, UPDATE, ASK
// ============================================================================

/// A CONSTRUCT header: the template instantiated per solution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstructClause {
    pub template: Vec<TriplePattern>,
}

impl ConstructClause {
    pub fn new(template: Vec<TriplePattern>) -> Self {
        Self { template }
    }

    /// Returns the variables of the template in first-seen order.
    pub fn contained_variables(&self) -> Vec<Variable> {
        let mut variables: Vec<Variable> = Vec::new();
        for variable in self.template.iter().flat_map(TriplePattern::variables) {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
        variables
    }
}

/// An update header: templates to delete and insert per solution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateClause {
    pub delete: Vec<TriplePattern>,
    pub insert: Vec<TriplePattern>,
    /// Graphs the templates apply to (`WITH` / `GRAPH`); empty means the
    /// default graph.
    pub graphs: Vec<Iri>,
}

/// An ASK header. Existence-only, so it carries nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AskClause;

// ============================================================================
// Dataset and prologue
// ============================================================================

/// IRIs from `FROM` and `FROM NAMED`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetClauses {
    pub default_graphs: Vec<Iri>,
    pub named_graphs: Vec<Iri>,
}

impl DatasetClauses {
    /// Returns true if neither `FROM` nor `FROM NAMED` was given.
    pub fn is_empty(&self) -> bool {
        self.default_graphs.is_empty() && self.named_graphs.is_empty()
    }
}

/// A `PREFIX p: <iri>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub prefix: String,
    pub iri: String,
}

impl Prefix {
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PREFIX {}: <{}>", self.prefix, self.iri)
    }
}
