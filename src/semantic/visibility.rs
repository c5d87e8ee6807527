//! Visibility checks shared by all solution modifiers.

use std::collections::HashSet;

use crate::ast::{Expression, Variable};
use crate::error::{InvalidQueryError, Result};
use crate::query::Query;
use crate::semantic::ValidationConfig;

impl Query {
    /// Fails in strict mode, records `warning` otherwise.
    pub fn add_warning_or_fail(
        &mut self,
        warning: impl Into<String>,
        config: &ValidationConfig,
    ) -> Result<()> {
        let warning = warning.into();
        if config.strict_mode {
            return Err(InvalidQueryError::visibility(warning));
        }
        self.add_warning(warning);
        Ok(())
    }

    /// Checks that `variable` is bound by the body or contained in
    /// `additional_visible`.
    ///
    /// `location` names the clause using the variable (`"ORDER BY"`, ...).
    /// `other_location` is appended to the message when the variable could
    /// also legally come from somewhere else, e.g. `" or previously in the
    /// same GROUP BY"`.
    pub fn check_variable_is_visible(
        &mut self,
        variable: &Variable,
        location: &str,
        additional_visible: &HashSet<Variable>,
        other_location: &str,
        config: &ValidationConfig,
    ) -> Result<()> {
        if self.is_visible(variable) || additional_visible.contains(variable) {
            return Ok(());
        }
        self.add_warning_or_fail(
            format!(
                "Variable {variable} was used by {location}, but is not defined in the query body{other_location}."
            ),
            config,
        )
    }

    /// Runs [`Query::check_variable_is_visible`] for every variable read by
    /// `expression`.
    pub fn check_used_variables_are_visible(
        &mut self,
        expression: &Expression,
        location: &str,
        additional_visible: &HashSet<Variable>,
        other_location: &str,
        config: &ValidationConfig,
    ) -> Result<()> {
        for variable in expression.variables() {
            self.check_variable_is_visible(
                &variable,
                location,
                additional_visible,
                other_location,
                config,
            )?;
        }
        Ok(())
    }
}
