//! The root object of a parsed query.
//!
//! A [`Query`] is built by one owner (the parsing pass) through a fixed
//! sequence of calls:
//!
//! 1. push pattern operations into the body and register the variables they
//!    bind ([`Query::add_pattern`], [`Query::register_variables`]),
//! 2. replace the default header clause once ([`Query::set_header_clause`]),
//! 3. attach the solution modifiers
//!    ([`Query::add_solution_modifiers`]).
//!
//! Once built, the query is plain data and may be shared freely.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{
    Alias, Bind, ConstructClause, DatasetClauses, Expression, GraphPattern, GraphPatternOperation,
    HeaderClause, Iri, LimitOffset, Prefix, SelectClause, UpdateClause, Values, Variable,
    VariableOrderKey,
};
use crate::diag::{Diag, SourceFile};
use crate::error::{InvalidQueryError, Result};
use crate::naming;

/// A parsed SPARQL query or update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub(crate) root_pattern: GraphPattern,
    pub(crate) header_clause: HeaderClause,
    header_clause_set: bool,
    pub(crate) dataset_clauses: DatasetClauses,
    prefixes: Vec<Prefix>,
    pub(crate) having_clauses: Vec<Expression>,
    pub(crate) order_by: Vec<VariableOrderKey>,
    pub(crate) is_internal_sort: bool,
    pub(crate) group_by_variables: Vec<Variable>,
    pub(crate) limit_offset: LimitOffset,
    post_query_values: Option<Values>,
    num_internal_variables: u64,
    visible_variables: Vec<Variable>,
    visible_lookup: HashSet<Variable>,
    warnings: Vec<String>,
    original_string: String,
}

impl Query {
    /// Creates an empty query for the given source text.
    pub fn new(original_string: impl Into<String>) -> Self {
        Self {
            original_string: original_string.into(),
            ..Self::default()
        }
    }

    /// Returns the query text this object was built from.
    pub fn original_string(&self) -> &str {
        &self.original_string
    }

    // ------------------------------------------------------------------------
    // Header clause
    // ------------------------------------------------------------------------

    /// Replaces the default (empty SELECT) header clause.
    ///
    /// The query form is decided once; a second call is rejected.
    pub fn set_header_clause(&mut self, clause: HeaderClause) -> Result<()> {
        if self.header_clause_set {
            return Err(InvalidQueryError::structural(format!(
                "The query form was already set to {}, it cannot be changed to {}.",
                self.header_clause.keyword(),
                clause.keyword()
            )));
        }
        self.header_clause = clause;
        self.header_clause_set = true;
        Ok(())
    }

    pub fn header_clause(&self) -> &HeaderClause {
        &self.header_clause
    }

    pub fn has_select_clause(&self) -> bool {
        matches!(self.header_clause, HeaderClause::Select(_))
    }

    pub fn has_construct_clause(&self) -> bool {
        matches!(self.header_clause, HeaderClause::Construct(_))
    }

    pub fn has_update_clause(&self) -> bool {
        matches!(self.header_clause, HeaderClause::Update(_))
    }

    pub fn has_ask_clause(&self) -> bool {
        matches!(self.header_clause, HeaderClause::Ask(_))
    }

    pub fn select_clause(&self) -> Option<&SelectClause> {
        match &self.header_clause {
            HeaderClause::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn select_clause_mut(&mut self) -> Option<&mut SelectClause> {
        match &mut self.header_clause {
            HeaderClause::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn construct_clause(&self) -> Option<&ConstructClause> {
        match &self.header_clause {
            HeaderClause::Construct(construct) => Some(construct),
            _ => None,
        }
    }

    pub fn update_clause(&self) -> Option<&UpdateClause> {
        match &self.header_clause {
            HeaderClause::Update(update) => Some(update),
            _ => None,
        }
    }

    /// Returns the aliases of a SELECT query, internal ones included. Empty
    /// for all other query forms.
    pub fn aliases(&self) -> &[Alias] {
        match &self.header_clause {
            HeaderClause::Select(select) => select.aliases(),
            _ => &[],
        }
    }

    /// Returns the projected variables of a SELECT query, with `SELECT *`
    /// expanded to the visible non-internal variables. Empty for other forms.
    pub fn selected_variables(&self) -> Vec<Variable> {
        self.select_clause()
            .map(|select| select.selected_variables(&self.visible_variables))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------------

    pub fn root_pattern(&self) -> &GraphPattern {
        &self.root_pattern
    }

    /// Top-level operations of the body.
    pub fn children(&self) -> &[GraphPatternOperation] {
        &self.root_pattern.operations
    }

    pub fn children_mut(&mut self) -> &mut Vec<GraphPatternOperation> {
        &mut self.root_pattern.operations
    }

    /// Appends an operation to the top level of the body. Does not register
    /// any variable; the caller decides what becomes visible.
    pub fn add_pattern(&mut self, operation: GraphPatternOperation) {
        self.root_pattern.push(operation);
    }

    // ------------------------------------------------------------------------
    // Visibility tracking
    // ------------------------------------------------------------------------

    /// Marks a variable as bound by the body. Registering twice is a no-op.
    pub fn register_variable(&mut self, variable: Variable) {
        if self.visible_lookup.insert(variable.clone()) {
            self.visible_variables.push(variable);
        }
    }

    /// Registers each variable in order.
    pub fn register_variables(&mut self, variables: impl IntoIterator<Item = Variable>) {
        for variable in variables {
            self.register_variable(variable);
        }
    }

    /// Returns the variables bound by the body so far, in first-seen order.
    pub fn visible_variables(&self) -> &[Variable] {
        &self.visible_variables
    }

    /// Returns true if the body binds `variable`.
    pub fn is_visible(&self, variable: &Variable) -> bool {
        self.visible_lookup.contains(variable)
    }

    // ------------------------------------------------------------------------
    // Warnings
    // ------------------------------------------------------------------------

    /// Returns all recorded warnings in insertion order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Records a warning. Warnings never abort construction.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        debug!(warning = %warning, "query warning recorded");
        self.warnings.push(warning);
    }

    /// Returns the warnings as renderable diagnostics.
    pub fn diagnostics(&self) -> Vec<Diag> {
        self.warnings
            .iter()
            .map(|warning| Diag::warning(warning.as_str()).with_code("sparql::warning"))
            .collect()
    }

    /// Returns the original query text wrapped for diagnostic rendering.
    pub fn source_file(&self) -> SourceFile {
        SourceFile::new(self.original_string.as_str())
    }

    // ------------------------------------------------------------------------
    // Internal synthesis
    // ------------------------------------------------------------------------

    /// Returns a fresh internal variable, distinct from every variable created
    /// before on this query and from every user-written variable.
    pub fn new_internal_variable(&mut self) -> Variable {
        let variable = naming::internal_variable(self.num_internal_variables);
        self.num_internal_variables += 1;
        variable
    }

    /// Number of internal variables created so far.
    pub fn num_internal_variables(&self) -> u64 {
        self.num_internal_variables
    }

    /// Maps a blank node of the body to the variable that replaces it.
    pub fn blank_node_to_internal_variable(label: &str) -> Variable {
        naming::blank_node_to_internal_variable(label)
    }

    /// Appends `BIND(expression AS target)` to the top level of the body.
    /// `target_is_visible` decides whether `SELECT *` exposes the target.
    pub(crate) fn add_bind(
        &mut self,
        expression: Expression,
        target: Variable,
        target_is_visible: bool,
    ) {
        debug!(
            target = %target,
            expression = %expression,
            visible = target_is_visible,
            "adding BIND"
        );
        self.register_variable(target.clone());
        self.root_pattern.push(GraphPatternOperation::Bind(Bind {
            expression,
            target,
            visible: target_is_visible,
        }));
    }

    /// Materializes `expression` as a hidden BIND and returns its variable.
    pub fn add_internal_bind(&mut self, expression: Expression) -> Variable {
        let target = self.new_internal_variable();
        self.add_bind(expression, target.clone(), false);
        target
    }

    /// Like [`Query::add_internal_bind`], and additionally records the
    /// binding as an internal alias of the SELECT clause so consumers that
    /// only read the header see the computed column.
    pub fn add_internal_alias(&mut self, expression: Expression) -> Variable {
        let alias_expression = expression.clone();
        let target = self.add_internal_bind(expression);
        if let Some(select) = self.select_clause_mut() {
            select.add_alias(Alias::new(alias_expression, target.clone()));
        }
        target
    }

    /// Computes `expression` as an internal alias of the SELECT clause only,
    /// without a BIND in the body. For expressions reading alias targets,
    /// which are unbound until projection.
    pub(crate) fn add_projection_alias(&mut self, expression: Expression) -> Variable {
        let target = self.new_internal_variable();
        debug!(target = %target, expression = %expression, "adding projection alias");
        if let Some(select) = self.select_clause_mut() {
            select.add_alias(Alias::new(expression, target.clone()));
        }
        target
    }

    // ------------------------------------------------------------------------
    // Remaining parts
    // ------------------------------------------------------------------------

    pub fn dataset_clauses(&self) -> &DatasetClauses {
        &self.dataset_clauses
    }

    pub fn set_dataset_clauses(&mut self, dataset_clauses: DatasetClauses) {
        self.dataset_clauses = dataset_clauses;
    }

    /// Returns the `PREFIX` declarations of the prologue in source order.
    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    /// Records a `PREFIX` declaration. A later declaration of the same
    /// prefix replaces the earlier one.
    pub fn add_prefix(&mut self, prefix: Prefix) {
        match self.prefixes.iter_mut().find(|p| p.prefix == prefix.prefix) {
            Some(existing) => *existing = prefix,
            None => self.prefixes.push(prefix),
        }
    }

    /// Expands `prefix:local` with the declared prefixes.
    pub fn expand_prefixed_name(&self, prefixed: &str) -> Option<Iri> {
        let (prefix, local) = prefixed.split_once(':')?;
        self.prefixes
            .iter()
            .find(|p| p.prefix == prefix)
            .map(|p| Iri::new(format!("{}{local}", p.iri)))
    }

    pub fn group_by_variables(&self) -> &[Variable] {
        &self.group_by_variables
    }

    pub fn having_clauses(&self) -> &[Expression] {
        &self.having_clauses
    }

    pub fn order_by(&self) -> &[VariableOrderKey] {
        &self.order_by
    }

    /// True once any ORDER BY expression was rewritten into an internal BIND.
    pub fn is_internal_sort(&self) -> bool {
        self.is_internal_sort
    }

    pub fn limit_offset(&self) -> LimitOffset {
        self.limit_offset
    }

    pub fn post_query_values(&self) -> Option<&Values> {
        self.post_query_values.as_ref()
    }

    /// Sets the trailing `VALUES` block and registers its variables.
    pub fn set_post_query_values(&mut self, values: Values) {
        self.register_variables(values.variables.iter().cloned());
        self.post_query_values = Some(values);
    }
}
