//! Terms, triple patterns, property paths and graph patterns.

use serde::{Deserialize, Serialize};
use std::fmt;

use spingraph_rdf::{Literal, Node};

use crate::expr::Expression;
use crate::query::Query;
use crate::Iri;

// ============================================================================
// Terms
// ============================================================================

/// A query variable, identified by name (without the leading `?`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// An IRI or literal that appears verbatim in a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Constant {
    Iri(Iri),
    Literal(Literal),
}

impl Constant {
    pub fn iri(iri: impl Into<String>) -> Self {
        Constant::Iri(iri.into())
    }

    pub fn literal(literal: Literal) -> Self {
        Constant::Literal(literal)
    }

    /// Constants are stored in the graph as themselves.
    pub fn to_node(&self) -> Node {
        match self {
            Constant::Iri(iri) => Node::Named(iri.clone()),
            Constant::Literal(lit) => Node::Literal(lit.clone()),
        }
    }

    /// Inverse of [`Constant::to_node`]; anonymous nodes are not constants.
    pub fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Named(iri) => Some(Constant::Iri(iri.clone())),
            Node::Literal(lit) => Some(Constant::Literal(lit.clone())),
            Node::Anonymous(_) => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Iri(iri) => write!(f, "<{iri}>"),
            Constant::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// Subject, predicate or object position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TermPattern {
    Variable(Variable),
    Constant(Constant),
}

impl TermPattern {
    pub fn var(name: impl Into<String>) -> Self {
        TermPattern::Variable(Variable::new(name))
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        TermPattern::Constant(Constant::iri(iri))
    }

    pub fn literal(literal: Literal) -> Self {
        TermPattern::Constant(Constant::Literal(literal))
    }
}

impl fmt::Display for TermPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermPattern::Variable(v) => write!(f, "{v}"),
            TermPattern::Constant(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: TermPattern,
    pub predicate: TermPattern,
    pub object: TermPattern,
}

impl TriplePattern {
    pub fn new(subject: TermPattern, predicate: TermPattern, object: TermPattern) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

// ============================================================================
// Property paths
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyPath {
    Link {
        iri: Iri,
    },
    /// `^path`
    Inverse {
        path: Box<PropertyPath>,
    },
    /// `left / right`
    Sequence {
        left: Box<PropertyPath>,
        right: Box<PropertyPath>,
    },
    /// `left | right`
    Alternative {
        left: Box<PropertyPath>,
        right: Box<PropertyPath>,
    },
    /// `path{min,max}`; `*`, `+` and `?` are `{0,}`, `{1,}` and `{0,1}`.
    Repeat {
        path: Box<PropertyPath>,
        min: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
}

impl PropertyPath {
    pub fn link(iri: impl Into<String>) -> Self {
        PropertyPath::Link { iri: iri.into() }
    }

    pub fn zero_or_more(path: PropertyPath) -> Self {
        PropertyPath::Repeat {
            path: Box::new(path),
            min: 0,
            max: None,
        }
    }

    pub fn one_or_more(path: PropertyPath) -> Self {
        PropertyPath::Repeat {
            path: Box::new(path),
            min: 1,
            max: None,
        }
    }

    pub fn zero_or_one(path: PropertyPath) -> Self {
        PropertyPath::Repeat {
            path: Box::new(path),
            min: 0,
            max: Some(1),
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Link { iri } => write!(f, "<{iri}>"),
            PropertyPath::Inverse { path } => write!(f, "^({path})"),
            PropertyPath::Sequence { left, right } => write!(f, "({left} / {right})"),
            PropertyPath::Alternative { left, right } => write!(f, "({left} | {right})"),
            PropertyPath::Repeat { path, min, max } => match (min, max) {
                (0, None) => write!(f, "({path})*"),
                (1, None) => write!(f, "({path})+"),
                (0, Some(1)) => write!(f, "({path})?"),
                (min, None) => write!(f, "({path}){{{min},}}"),
                (min, Some(max)) => write!(f, "({path}){{{min},{max}}}"),
            },
        }
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// Inline data. `None` cells are `UNDEF`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValuesTable {
    pub variables: Vec<Variable>,
    pub rows: Vec<Vec<Option<Constant>>>,
}

// ============================================================================
// Graph patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphPattern {
    /// An ordered block of triple patterns.
    BasicPattern { triples: Vec<TriplePattern> },
    /// A single triple whose predicate is a property path.
    Path {
        subject: TermPattern,
        path: PropertyPath,
        object: TermPattern,
    },
    /// `{ p1 p2 ... }`, the join of its elements in order.
    Group { elements: Vec<GraphPattern> },
    Optional { pattern: Box<GraphPattern> },
    Union { branches: Vec<GraphPattern> },
    Minus {
        left: Box<GraphPattern>,
        right: Box<GraphPattern>,
    },
    NamedGraph {
        graph: TermPattern,
        pattern: Box<GraphPattern>,
    },
    Service {
        endpoint: TermPattern,
        #[serde(default)]
        silent: bool,
        pattern: Box<GraphPattern>,
    },
    /// A nested SELECT. Names in `imports` denote the same variable inside
    /// and outside; every other inner name is local to the sub-query.
    SubSelect {
        query: Box<Query>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        imports: Vec<Variable>,
    },
    Filter {
        pattern: Box<GraphPattern>,
        expression: Expression,
    },
    Bind {
        expression: Expression,
        variable: Variable,
    },
    Values { table: ValuesTable },
}

impl GraphPattern {
    pub fn basic(triples: Vec<TriplePattern>) -> Self {
        GraphPattern::BasicPattern { triples }
    }

    pub fn group(elements: Vec<GraphPattern>) -> Self {
        GraphPattern::Group { elements }
    }

    pub fn optional(pattern: GraphPattern) -> Self {
        GraphPattern::Optional {
            pattern: Box::new(pattern),
        }
    }

    pub fn filter(pattern: GraphPattern, expression: Expression) -> Self {
        GraphPattern::Filter {
            pattern: Box::new(pattern),
            expression,
        }
    }

    pub fn sub_select(query: Query, imports: Vec<Variable>) -> Self {
        GraphPattern::SubSelect {
            query: Box::new(query),
            imports,
        }
    }

    /// Short, stable label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            GraphPattern::BasicPattern { .. } => "basic_pattern",
            GraphPattern::Path { .. } => "path",
            GraphPattern::Group { .. } => "group",
            GraphPattern::Optional { .. } => "optional",
            GraphPattern::Union { .. } => "union",
            GraphPattern::Minus { .. } => "minus",
            GraphPattern::NamedGraph { .. } => "named_graph",
            GraphPattern::Service { .. } => "service",
            GraphPattern::SubSelect { .. } => "sub_select",
            GraphPattern::Filter { .. } => "filter",
            GraphPattern::Bind { .. } => "bind",
            GraphPattern::Values { .. } => "values",
        }
    }
}
