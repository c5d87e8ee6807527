//! Attaching GROUP BY, HAVING, ORDER BY and LIMIT/OFFSET to a query.
//!
//! The steps run in a fixed order because each one changes what is legal in
//! the next: GROUP BY decides whether the query is grouped and binds new
//! variables, HAVING and ORDER BY are checked against that state, and the
//! header clause is validated last against the final grouping.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::ast::{
    Expression, GroupKey, HeaderClause, OrderKey, Selection, SolutionModifiers, Variable,
    VariableOrderKey,
};
use crate::error::{InvalidQueryError, Result};
use crate::query::Query;
use crate::semantic::ValidationConfig;

const IMPLICIT_GROUP_BY_NOTE: &str =
    " Note: The GROUP BY in this query is implicit because an aggregate expression was used in the SELECT clause.";

const ALIAS_LOCATION: &str = " or in an alias of the SELECT clause";

/// Grouping state of a query once its GROUP BY has been attached.
#[derive(Debug, Clone, Copy)]
struct Grouping {
    grouped: bool,
    implicit: bool,
}

impl Grouping {
    fn note(self) -> &'static str {
        if self.implicit {
            IMPLICIT_GROUP_BY_NOTE
        } else {
            ""
        }
    }
}

impl Query {
    /// Validates `modifiers` and attaches them to the query.
    ///
    /// Expressions in GROUP BY and ORDER BY are materialized as internal
    /// BINDs. Unbound variables fail or warn depending on `config`; grouping
    /// violations and structural errors always fail. After an error the
    /// query is in an unspecified state and must be discarded.
    pub fn add_solution_modifiers(
        &mut self,
        modifiers: SolutionModifiers,
        config: &ValidationConfig,
    ) -> Result<()> {
        let SolutionModifiers {
            group_by,
            having,
            order_by,
            limit_offset,
        } = modifiers;
        debug!(
            group_keys = group_by.len(),
            having = having.len(),
            order_keys = order_by.len(),
            strict = config.strict_mode,
            "adding solution modifiers"
        );

        self.add_group_by_clause(group_by, config)?;
        let grouping = self.grouping();

        self.add_having_clause(having, grouping.grouped, config)?;
        self.add_order_by_clause(order_by, grouping, config)?;
        self.limit_offset = limit_offset;

        self.check_header_clause(grouping, config)
    }

    /// Attaches HAVING filters.
    ///
    /// `is_group_by` states whether the query is grouped; HAVING on an
    /// ungrouped query is rejected. Every variable read outside of an
    /// aggregate must be grouped or the target of a SELECT alias.
    pub fn add_having_clause(
        &mut self,
        having: Vec<Expression>,
        is_group_by: bool,
        config: &ValidationConfig,
    ) -> Result<()> {
        if having.is_empty() {
            return Ok(());
        }
        if !is_group_by {
            return Err(InvalidQueryError::structural(
                "A HAVING clause is only supported in queries with GROUP BY.",
            ));
        }

        let alias_targets = self.user_alias_targets();
        let group_level = self.group_level_variables();
        let note = self.grouping().note();

        for filter in having {
            self.check_used_variables_are_visible(
                &filter,
                "HAVING",
                &alias_targets,
                ALIAS_LOCATION,
                config,
            )?;
            if let Some(variable) = filter.unaggregated_variables(&group_level).first() {
                return Err(InvalidQueryError::grouping(format!(
                    "Variable {variable} is used in the HAVING clause \"{filter}\", but is neither grouped nor aggregated.{note}"
                )));
            }
            self.having_clauses.push(filter);
        }
        Ok(())
    }

    fn add_group_by_clause(
        &mut self,
        keys: Vec<GroupKey>,
        config: &ValidationConfig,
    ) -> Result<()> {
        // `GROUP BY ?x ?x` groups by ?x once.
        let mut deduplicated: HashSet<Variable> = HashSet::new();

        for key in keys {
            match key {
                GroupKey::Variable(variable) => {
                    self.add_group_by_variable(variable, &mut deduplicated, config)?;
                }
                GroupKey::Expression(Expression::Variable(variable)) => {
                    self.add_group_by_variable(variable, &mut deduplicated, config)?;
                }
                GroupKey::Expression(expression) => {
                    self.check_group_key_expression(&expression, config)?;
                    let target = self.add_internal_alias(expression);
                    deduplicated.insert(target.clone());
                    self.group_by_variables.push(target);
                }
                GroupKey::Alias { expression, target } => {
                    self.check_group_key_expression(&expression, config)?;
                    if self.is_visible(&target) || deduplicated.contains(&target) {
                        return Err(InvalidQueryError::structural(format!(
                            "The target {target} of an AS clause in GROUP BY is already bound in the query body or by an earlier GROUP BY key."
                        )));
                    }
                    self.add_bind(expression, target.clone(), true);
                    deduplicated.insert(target.clone());
                    self.group_by_variables.push(target);
                }
            }
        }
        Ok(())
    }

    fn add_group_by_variable(
        &mut self,
        variable: Variable,
        deduplicated: &mut HashSet<Variable>,
        config: &ValidationConfig,
    ) -> Result<()> {
        self.check_variable_is_visible(&variable, "GROUP BY", &HashSet::new(), "", config)?;
        if deduplicated.insert(variable.clone()) {
            self.group_by_variables.push(variable);
        }
        Ok(())
    }

    fn check_group_key_expression(
        &mut self,
        expression: &Expression,
        config: &ValidationConfig,
    ) -> Result<()> {
        self.check_used_variables_are_visible(
            expression,
            "GROUP BY",
            &HashSet::new(),
            " or previously in the same GROUP BY",
            config,
        )?;
        if expression.contains_aggregate() {
            return Err(InvalidQueryError::grouping(format!(
                "The GROUP BY expression \"{expression}\" contains an aggregate, which is not allowed."
            )));
        }
        Ok(())
    }

    fn add_order_by_clause(
        &mut self,
        keys: Vec<OrderKey>,
        grouping: Grouping,
        config: &ValidationConfig,
    ) -> Result<()> {
        let alias_targets = self.user_alias_targets();

        for key in keys {
            match key {
                OrderKey::Variable {
                    variable,
                    descending,
                }
                | OrderKey::Expression {
                    expression: Expression::Variable(variable),
                    descending,
                } => {
                    self.add_variable_order_key(
                        variable,
                        descending,
                        grouping,
                        &alias_targets,
                        config,
                    )?;
                }
                OrderKey::Expression {
                    expression,
                    descending,
                } => {
                    self.check_used_variables_are_visible(
                        &expression,
                        "ORDER BY",
                        &alias_targets,
                        ALIAS_LOCATION,
                        config,
                    )?;
                    if grouping.grouped {
                        let group_level = self.group_level_variables();
                        let ungrouped = expression.unaggregated_variables(&group_level);
                        if let Some(variable) = ungrouped.first() {
                            return Err(InvalidQueryError::grouping(format!(
                                "Variable {variable} is used in the ORDER BY expression \"{expression}\", but is neither grouped nor aggregated.{}",
                                grouping.note()
                            )));
                        }
                    }
                    // Alias targets only exist after projection.
                    let reads_alias = expression
                        .variables()
                        .iter()
                        .any(|variable| alias_targets.contains(variable));
                    let variable = if reads_alias {
                        self.add_projection_alias(expression)
                    } else {
                        self.add_internal_bind(expression)
                    };
                    self.is_internal_sort = true;
                    self.order_by.push(VariableOrderKey {
                        variable,
                        descending,
                    });
                }
            }
        }
        Ok(())
    }

    fn add_variable_order_key(
        &mut self,
        variable: Variable,
        descending: bool,
        grouping: Grouping,
        alias_targets: &HashSet<Variable>,
        config: &ValidationConfig,
    ) -> Result<()> {
        if !grouping.grouped {
            self.check_variable_is_visible(&variable, "ORDER BY", alias_targets, "", config)?;
        } else if !self.group_by_variables.contains(&variable)
            && !alias_targets.contains(&variable)
        {
            self.add_warning_or_fail(
                format!(
                    "Variable {variable} was used in an ORDER BY clause, but is neither grouped nor created as an alias in the SELECT clause.{}",
                    grouping.note()
                ),
                config,
            )?;
        }
        self.order_by.push(VariableOrderKey {
            variable,
            descending,
        });
        Ok(())
    }

    fn check_header_clause(
        &mut self,
        grouping: Grouping,
        config: &ValidationConfig,
    ) -> Result<()> {
        if self.has_select_clause() {
            return self.check_select_clause(grouping, config);
        }
        let template = match &self.header_clause {
            HeaderClause::Construct(construct) => construct.contained_variables(),
            HeaderClause::Select(_) | HeaderClause::Update(_) | HeaderClause::Ask(_) => {
                return Ok(());
            }
        };
        if !grouping.grouped {
            return Ok(());
        }
        for variable in template {
            if !self.group_by_variables.contains(&variable) {
                return Err(InvalidQueryError::grouping(format!(
                    "Variable {variable} is used in the CONSTRUCT template, but is not part of the GROUP BY clause."
                )));
            }
        }
        Ok(())
    }

    fn check_select_clause(
        &mut self,
        grouping: Grouping,
        config: &ValidationConfig,
    ) -> Result<()> {
        let Some(select) = self.select_clause().cloned() else {
            return Ok(());
        };
        let explicit: &[Variable] = match select.selection() {
            Selection::Variables(variables) => variables,
            Selection::Asterisk => &[],
        };

        for alias in select.user_aliases() {
            if explicit.iter().filter(|v| **v == alias.target).count() > 1 {
                return Err(InvalidQueryError::structural(format!(
                    "The variable name {} used in an alias was already selected on.",
                    alias.target
                )));
            }
            if self.is_visible(&alias.target) {
                return Err(InvalidQueryError::structural(format!(
                    "The target {} of an AS clause was already used in the query body.",
                    alias.target
                )));
            }
        }

        let mut bound_by_aliases = HashSet::new();
        for alias in select.user_aliases() {
            self.check_used_variables_are_visible(
                &alias.expression,
                "Alias",
                &bound_by_aliases,
                " or in a previous alias of the same SELECT clause",
                config,
            )?;
            bound_by_aliases.insert(alias.target.clone());
        }

        if !grouping.grouped {
            return Ok(());
        }
        if select.is_asterisk() {
            return Err(InvalidQueryError::structural(
                "GROUP BY is not allowed when all variables are selected via SELECT *.",
            ));
        }

        let grouped: BTreeSet<Variable> = self.group_by_variables.iter().cloned().collect();
        let aliases: Vec<_> = select.user_aliases().collect();
        let note = grouping.note();

        for variable in explicit {
            if let Some(position) = aliases.iter().position(|alias| alias.target == *variable) {
                let alias = aliases[position];
                let mut allowed = grouped.clone();
                allowed.extend(aliases[..position].iter().map(|a| a.target.clone()));
                let unaggregated = alias.expression.unaggregated_variables(&allowed);
                if !unaggregated.is_empty() {
                    let names = unaggregated
                        .iter()
                        .map(Variable::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(InvalidQueryError::grouping(format!(
                        "The expression \"{}\" does not aggregate {names}. All non-aggregated variables must be part of the GROUP BY clause.{note}",
                        alias.expression
                    )));
                }
            } else if !grouped.contains(variable) {
                return Err(InvalidQueryError::grouping(format!(
                    "Variable {variable} is selected but not aggregated. All non-aggregated variables must be part of the GROUP BY clause.{note}"
                )));
            }
        }
        Ok(())
    }

    fn grouping(&self) -> Grouping {
        let explicit = !self.group_by_variables.is_empty();
        let implicit = !explicit
            && self.select_clause().is_some_and(|select| {
                select
                    .user_aliases()
                    .any(|alias| alias.expression.contains_aggregate())
            });
        Grouping {
            grouped: explicit || implicit,
            implicit,
        }
    }

    fn user_alias_targets(&self) -> HashSet<Variable> {
        self.select_clause()
            .map(|select| select.user_aliases().map(|a| a.target.clone()).collect())
            .unwrap_or_default()
    }

    /// Variables with one value per group: grouped variables and the
    /// targets of SELECT aliases.
    fn group_level_variables(&self) -> BTreeSet<Variable> {
        self.group_by_variables
            .iter()
            .cloned()
            .chain(self.user_alias_targets())
            .collect()
    }
}
