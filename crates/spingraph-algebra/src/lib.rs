//! SPARQL query algebra for Spingraph.
//!
//! This crate defines the in-memory tree a parser hands to the encoder and the
//! decoder hands back: query forms, graph patterns, expressions, property
//! paths and solution modifiers. All types are plain data with `serde`
//! derives; JSON is the exchange form used by the CLI.
//!
//! The model is deliberately closed (tagged enums throughout) so the codec can
//! match exhaustively over every construct.

pub mod digest;
pub mod expr;
pub mod pattern;
pub mod query;

pub use digest::{fnv1a64_digest_bytes, query_digest_v1, QUERY_DIGEST_V1_PREFIX};
pub use expr::{AggregateKind, Expression, OperatorKind};
pub use pattern::{
    Constant, GraphPattern, PropertyPath, TermPattern, TriplePattern, ValuesTable, Variable,
};
pub use query::{
    DatasetClause, Distinctness, OrderCondition, OrderDirection, ProjectionItem, Query, QueryForm,
    SolutionModifier,
};

pub use spingraph_rdf::Literal;

/// An absolute IRI, stored without angle brackets.
pub type Iri = String;
