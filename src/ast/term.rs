//! RDF terms as they appear inside query bodies and templates.
//!
//! Terms are the leaves of triple patterns and expressions: variables, IRIs,
//! literals and blank nodes. All textual payloads are stored as [`SmolStr`]
//! since most of them are short and cloned frequently while the query is
//! rewritten.

use std::fmt;

use smol_str::SmolStr;

use crate::error::{InvalidQueryError, Result};
use crate::naming;

// ============================================================================
// Variables
// ============================================================================

/// A SPARQL variable, stored with its leading `?`.
///
/// Variables written as `$x` are normalized to `?x`, so both spellings compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    name: SmolStr,
}

impl Variable {
    /// Creates a variable from trusted input.
    ///
    /// A missing sigil is added and `$` is rewritten to `?`. No character
    /// validation happens here; use [`Variable::parse`] for user-written text.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let name = match name.strip_prefix('?').or_else(|| name.strip_prefix('$')) {
            Some(bare) => SmolStr::new(format!("?{bare}")),
            None => SmolStr::new(format!("?{name}")),
        };
        Self { name }
    }

    /// Parses a user-written variable such as `?name` or `$name`.
    ///
    /// Rejects names containing characters outside the SPARQL `VARNAME`
    /// production. This keeps the internal namespace (see [`crate::naming`])
    /// unreachable from query text.
    pub fn parse(text: &str) -> Result<Self> {
        let bare = text
            .strip_prefix('?')
            .or_else(|| text.strip_prefix('$'))
            .ok_or_else(|| {
                InvalidQueryError::structural(format!(
                    "\"{text}\" is not a variable, variables start with '?' or '$'."
                ))
            })?;

        if !is_valid_varname(bare) {
            return Err(InvalidQueryError::structural(format!(
                "\"{text}\" is not a valid variable name."
            )));
        }

        Ok(Self::new(bare))
    }

    /// Returns the name including the leading `?`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this variable was synthesized by the query model
    /// rather than written by the user.
    pub fn is_internal(&self) -> bool {
        naming::is_internal_name(&self.name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn is_varname_start(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_varname_continue(ch: char) -> bool {
    is_varname_start(ch)
        || ch == '\u{00B7}'
        || ('\u{0300}'..='\u{036F}').contains(&ch)
        || ('\u{203F}'..='\u{2040}').contains(&ch)
}

fn is_valid_varname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_varname_start(first) => chars.all(is_varname_continue),
        _ => false,
    }
}

// ============================================================================
// IRIs, literals, blank nodes
// ============================================================================

/// An absolute IRI, stored without angle brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iri(SmolStr);

impl Iri {
    /// Creates an IRI. Surrounding angle brackets are stripped if present.
    pub fn new(iri: impl AsRef<str>) -> Self {
        let iri = iri.as_ref();
        let iri = iri
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(iri);
        Self(SmolStr::new(iri))
    }

    /// Returns the IRI text without brackets.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Plain string literal: `"text"`.
    Simple(SmolStr),
    /// Language-tagged string: `"text"@en`.
    LangString { value: SmolStr, language: SmolStr },
    /// Literal with an explicit datatype: `"text"^^<iri>`.
    Typed { value: SmolStr, datatype: Iri },
    /// Numeric literal written without quotes (`42`, `1.5`, `1e3`).
    Numeric(SmolStr),
    /// `true` or `false`.
    Boolean(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Simple(value) => write!(f, "\"{value}\""),
            Literal::LangString { value, language } => write!(f, "\"{value}\"@{language}"),
            Literal::Typed { value, datatype } => write!(f, "\"{value}\"^^{datatype}"),
            Literal::Numeric(value) => f.write_str(value),
            Literal::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// A blank node label as written in the query (`_:b0`), without the `_:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode(SmolStr);

impl BlankNode {
    /// Creates a blank node from a label, with or without the `_:` prefix.
    pub fn new(label: impl AsRef<str>) -> Self {
        let label = label.as_ref();
        Self(SmolStr::new(label.strip_prefix("_:").unwrap_or(label)))
    }

    /// Returns the label without the `_:` prefix.
    pub fn label(&self) -> &str {
        &self.0
    }

    /// Returns the internal variable that stands in for this blank node.
    pub fn to_internal_variable(&self) -> Variable {
        naming::blank_node_to_internal_variable(&self.0)
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

// ============================================================================
// Terms and triple patterns
// ============================================================================

/// Any term that can occupy a position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Variable),
    Iri(Iri),
    Literal(Literal),
    BlankNode(BlankNode),
}

impl Term {
    /// Returns the variable if this term is one.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(variable) => Some(variable),
            _ => None,
        }
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(variable) => variable.fmt(f),
            Term::Iri(iri) => iri.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
            Term::BlankNode(node) => node.fmt(f),
        }
    }
}

/// A single `subject predicate object` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    /// Creates a triple pattern from anything convertible into terms.
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Returns the variables of this pattern in subject, predicate, object
    /// order. A variable used twice is returned twice.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Term::as_variable)
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_sigils_are_normalized() {
        assert_eq!(Variable::new("?x").name(), "?x");
        assert_eq!(Variable::new("$x").name(), "?x");
        assert_eq!(Variable::new("x").name(), "?x");
        assert_eq!(Variable::new("$x"), Variable::new("?x"));
    }

    #[test]
    fn variable_parse_accepts_user_names() {
        assert_eq!(Variable::parse("?name").unwrap().name(), "?name");
        assert_eq!(Variable::parse("$_tmp1").unwrap().name(), "?_tmp1");
        assert_eq!(Variable::parse("?ñandú").unwrap().name(), "?ñandú");
    }

    #[test]
    fn variable_parse_rejects_reserved_and_malformed_names() {
        assert!(Variable::parse("name").is_err());
        assert!(Variable::parse("?").is_err());
        assert!(Variable::parse("?a-b").is_err());
        assert!(Variable::parse("?@internal_0").is_err());
    }

    #[test]
    fn user_variables_are_not_internal() {
        assert!(!Variable::new("?x").is_internal());
    }

    #[test]
    fn iri_strips_brackets() {
        let iri = Iri::new("<http://example.org/p>");
        assert_eq!(iri.as_str(), "http://example.org/p");
        assert_eq!(iri.to_string(), "<http://example.org/p>");
    }

    #[test]
    fn literal_display() {
        assert_eq!(Literal::Simple("a".into()).to_string(), "\"a\"");
        assert_eq!(
            Literal::LangString {
                value: "chat".into(),
                language: "fr".into()
            }
            .to_string(),
            "\"chat\"@fr"
        );
        assert_eq!(Literal::Numeric("42".into()).to_string(), "42");
        assert_eq!(Literal::Boolean(true).to_string(), "true");
    }

    #[test]
    fn blank_node_label_prefix_is_optional() {
        assert_eq!(BlankNode::new("_:b0"), BlankNode::new("b0"));
        assert_eq!(BlankNode::new("b0").to_string(), "_:b0");
    }

    #[test]
    fn triple_pattern_variables_in_position_order() {
        let triple = TriplePattern::new(
            Variable::new("?s"),
            Iri::new("http://example.org/p"),
            Variable::new("?o"),
        );
        let vars: Vec<_> = triple.variables().map(Variable::name).collect();
        assert_eq!(vars, vec!["?s", "?o"]);
        assert_eq!(triple.to_string(), "?s <http://example.org/p> ?o");
    }
}
