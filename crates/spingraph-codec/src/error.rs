use thiserror::Error;

use spingraph_rdf::Node;

/// Failure of one encode call. Nothing has been written to the sink.
///
/// `path` locates the offending algebra node, e.g.
/// `/where/elements[1]/expression/args[0]`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unresolved function `{name}` at {path}")]
    UnresolvedFunction { name: String, path: String },

    #[error("{form} query without a pattern at {path}")]
    MissingPattern { form: &'static str, path: String },

    #[error("{limit} ({max}) exceeded at {path}")]
    ResourceLimitExceeded {
        limit: &'static str,
        max: usize,
        path: String,
    },

    #[error("root or minted node {node} already occurs in the sink")]
    NodeCollision { node: Node },
}

/// Failure of one decode call. No partial query is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("node {node} has no vocabulary type (found: {found:?})")]
    UnknownNodeType { node: Node, found: Vec<String> },

    #[error("node {node} is a {found} where {expected} was expected")]
    UnexpectedNodeType {
        node: Node,
        found: String,
        expected: &'static str,
    },

    /// A required property has no object, or a single-valued property has
    /// more than one.
    #[error("node {node}: expected exactly one <{property}>, found {found}")]
    MissingRequiredProperty {
        node: Node,
        property: &'static str,
        found: usize,
    },

    #[error("malformed list at {node}: {reason}")]
    MalformedList { node: Node, reason: String },

    #[error("cyclic reference through {node}")]
    CyclicReference { node: Node },

    #[error("{limit} ({max}) exceeded at {node}")]
    ResourceLimitExceeded {
        limit: &'static str,
        max: usize,
        node: Node,
    },

    #[error("node {node}: invalid value {value} for <{property}> (expected {expected})")]
    InvalidLiteral {
        node: Node,
        property: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("node {node}: unknown operator {operator}")]
    UnknownOperator { node: Node, operator: String },
}

impl DecodeError {
    /// The node the error was raised at.
    pub fn node(&self) -> &Node {
        match self {
            DecodeError::UnknownNodeType { node, .. }
            | DecodeError::UnexpectedNodeType { node, .. }
            | DecodeError::MissingRequiredProperty { node, .. }
            | DecodeError::MalformedList { node, .. }
            | DecodeError::CyclicReference { node }
            | DecodeError::ResourceLimitExceeded { node, .. }
            | DecodeError::InvalidLiteral { node, .. }
            | DecodeError::UnknownOperator { node, .. } => node,
        }
    }
}
