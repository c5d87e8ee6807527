//! Error type for invalid queries.
//!
//! Every hard failure of the query model is an [`InvalidQueryError`]. The
//! message is meant to be shown to the end user essentially verbatim.

use miette::Diagnostic;
use thiserror::Error;

use crate::diag::Diag;

/// Result alias used throughout the crate.
pub type Result<T, E = InvalidQueryError> = std::result::Result<T, E>;

/// Category of an [`InvalidQueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidQueryKind {
    /// A language-level illegality, independent of any policy
    /// (HAVING without grouping, a header clause set twice, ...).
    Structural,
    /// A variable used before it is bound. Only raised in strict mode.
    Visibility,
    /// An ungrouped variable used outside an aggregate in a grouped query.
    Grouping,
}

/// A query that cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum InvalidQueryError {
    #[error("{message}")]
    #[diagnostic(code(sparql::structural))]
    Structural { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(sparql::unbound_variable),
        help("bind the variable in the query body or run with lenient validation")
    )]
    Visibility { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(sparql::grouping),
        help("group by the variable or use it inside an aggregate")
    )]
    Grouping { message: String },
}

impl InvalidQueryError {
    /// Creates a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Creates a visibility error.
    pub fn visibility(message: impl Into<String>) -> Self {
        Self::Visibility {
            message: message.into(),
        }
    }

    /// Creates a grouping error.
    pub fn grouping(message: impl Into<String>) -> Self {
        Self::Grouping {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> InvalidQueryKind {
        match self {
            Self::Structural { .. } => InvalidQueryKind::Structural,
            Self::Visibility { .. } => InvalidQueryKind::Visibility,
            Self::Grouping { .. } => InvalidQueryKind::Grouping,
        }
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Structural { message }
            | Self::Visibility { message }
            | Self::Grouping { message } => message,
        }
    }

    /// Converts this error into a renderable diagnostic.
    pub fn to_diag(&self) -> Diag {
        let code = match self.kind() {
            InvalidQueryKind::Structural => "sparql::structural",
            InvalidQueryKind::Visibility => "sparql::unbound_variable",
            InvalidQueryKind::Grouping => "sparql::grouping",
        };
        let diag = Diag::error(self.message()).with_code(code);
        match Diagnostic::help(self) {
            Some(help) => diag.with_help(help.to_string()),
            None => diag,
        }
    }
}
