//! Graph primitives for Spingraph.
//!
//! This crate is the storage boundary the codec writes into and reads from:
//!
//! - [`Node`] / [`Literal`] / [`Triple`]: the RDF term model (named,
//!   anonymous, literal).
//! - [`Graph`]: an append-only in-memory triple set with subject and predicate
//!   indices (roaring bitmaps of triple ids).
//! - [`GraphSink`] / [`GraphView`]: the only two capabilities the codec needs
//!   from a store (insert + freshness check, lookup by subject).
//! - [`SharedGraph`]: a cloneable, lock-protected graph for concurrent writers.
//! - [`BlankNodeAllocator`]: collision-free anonymous-node minting.
//! - [`ntriples`]: canonical N-Triples output and N-Triples/Turtle input
//!   (parsing goes through Sophia).

pub mod alloc;
pub mod graph;
pub mod ntriples;
pub mod term;

pub use alloc::BlankNodeAllocator;
pub use graph::{Graph, GraphSink, GraphView, SharedGraph, SinkError, MAX_TRIPLES};
pub use ntriples::{RdfFormat, RdfSyntaxError};
pub use term::{Literal, Node, Triple};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDF_TYPE_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_LANG_STRING_IRI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const XSD_STRING_IRI: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_BOOLEAN_IRI: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_INTEGER_IRI: &str = "http://www.w3.org/2001/XMLSchema#integer";
