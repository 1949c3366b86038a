//! SPARQL algebra <-> RDF graph codec.
//!
//! [`GraphEncoder`] turns a [`spingraph_algebra::Query`] into triples over the
//! SPIN vocabulary (see [`vocab`]); [`GraphDecoder`] reads them back. Both are
//! constructed with an injected [`FunctionRegistry`] and a [`CodecConfig`],
//! and neither keeps state between calls.
//!
//! ```no_run
//! use std::sync::Arc;
//! use spingraph_algebra::{GraphPattern, ProjectionItem, Query, TermPattern, TriplePattern};
//! use spingraph_codec::{BuiltinRegistry, GraphDecoder, GraphEncoder};
//! use spingraph_rdf::Graph;
//!
//! let registry = Arc::new(BuiltinRegistry::sparql());
//! let query = Query::select(
//!     Some(vec![ProjectionItem::var("s")]),
//!     GraphPattern::basic(vec![TriplePattern::new(
//!         TermPattern::var("s"),
//!         TermPattern::iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
//!         TermPattern::iri("http://example.org/Person"),
//!     )]),
//! );
//!
//! let mut graph = Graph::new();
//! let root = GraphEncoder::new(registry.clone()).encode(&query, &mut graph)?;
//! let back = GraphDecoder::new(registry).decode(&graph, &root)?;
//! assert_eq!(back, query);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod registry;
pub mod vocab;

pub use config::{CodecConfig, FunctionMode};
pub use decode::GraphDecoder;
pub use encode::GraphEncoder;
pub use error::{DecodeError, EncodeError};
pub use registry::{BuiltinRegistry, FunctionRegistry};
pub use vocab::{NodeKind, VocabularySchema, VOCABULARY_VERSION};
