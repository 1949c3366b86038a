//! RDF term model: nodes, literals, triples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{RDF_LANG_STRING_IRI, XSD_BOOLEAN_IRI, XSD_INTEGER_IRI, XSD_STRING_IRI};

// ============================================================================
// Literal
// ============================================================================

/// A literal value: lexical form plus optional datatype or language tag.
///
/// Equality is byte-exact on all three parts. `xsd:string` (and
/// `rdf:langString` for tagged literals) are the implicit RDF 1.1 datatypes and
/// are normalized away at construction, so `"a"` and `"a"^^xsd:string` are the
/// same literal, as they are on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl Literal {
    pub fn simple(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        let datatype = if datatype == XSD_STRING_IRI {
            None
        } else {
            Some(datatype)
        };
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(if value { "true" } else { "false" }, XSD_BOOLEAN_IRI)
    }

    pub fn integer(value: u64) -> Self {
        Self::typed(value.to_string(), XSD_INTEGER_IRI)
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Parse as `xsd:boolean` (lexical space `true|false|1|0`).
    pub fn as_bool(&self) -> Option<bool> {
        if self.datatype.as_deref() != Some(XSD_BOOLEAN_IRI) {
            return None;
        }
        match self.lexical.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Parse as a non-negative `xsd:integer`.
    pub fn as_u64(&self) -> Option<u64> {
        if self.datatype.as_deref() != Some(XSD_INTEGER_IRI) {
            return None;
        }
        self.lexical.trim_start_matches('+').parse().ok()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        f.write_str(&escape_lexical(&self.lexical))?;
        f.write_str("\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")
        } else {
            Ok(())
        }
    }
}

/// Escape a lexical form for N-Triples output. Non-ASCII text is kept as-is
/// (N-Triples is UTF-8); only the characters the grammar forbids are escaped.
pub(crate) fn escape_lexical(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Node
// ============================================================================

/// An identity usable as subject, predicate or object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    /// A global identifier (IRI).
    Named(String),
    /// A locally unique identifier (blank node label, without `_:`).
    Anonymous(String),
    Literal(Literal),
}

impl Node {
    pub fn named(iri: impl Into<String>) -> Self {
        Node::Named(iri.into())
    }

    pub fn anonymous(label: impl Into<String>) -> Self {
        Node::Anonymous(label.into())
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Node::Named(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Node::Anonymous(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    pub fn as_named(&self) -> Option<&str> {
        match self {
            Node::Named(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// True for the IRI `iri`.
    pub fn is_iri(&self, iri: &str) -> bool {
        self.as_named() == Some(iri)
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Node::Literal(value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Named(iri) => write!(f, "<{iri}>"),
            Node::Anonymous(label) => write!(f, "_:{label}"),
            Node::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

// ============================================================================
// Triple
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// `rdf:langString` is never stored as an explicit datatype.
pub(crate) fn normalize_datatype(datatype: &str) -> Option<&str> {
    if datatype == XSD_STRING_IRI || datatype == RDF_LANG_STRING_IRI {
        None
    } else {
        Some(datatype)
    }
}
