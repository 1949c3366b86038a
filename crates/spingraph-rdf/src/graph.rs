//! Indexed in-memory triple sets and the sink/view capabilities.

use ahash::{AHashMap, AHashSet};
use parking_lot::{RwLock, RwLockReadGuard};
use roaring::RoaringBitmap;
use std::sync::Arc;
use thiserror::Error;

use crate::term::{Node, Triple};

/// Most triples one [`Graph`] can hold; triple ids are `u32`.
pub const MAX_TRIPLES: usize = u32::MAX as usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("{0} already occurs in the store")]
    NotFresh(Node),
    #[error("store is full ({max} triples)")]
    Full { max: usize },
}

// ============================================================================
// Capabilities
// ============================================================================

/// Write side of a store, as seen by the encoder.
pub trait GraphSink {
    /// Insert one triple. Returns `false` if it was already present.
    fn insert(&mut self, triple: Triple) -> bool;

    /// Insert a batch of triples. Stores that can make the whole batch
    /// visible atomically should override this.
    fn insert_all(&mut self, triples: Vec<Triple>) -> usize {
        let mut added = 0;
        for triple in triples {
            if self.insert(triple) {
                added += 1;
            }
        }
        added
    }

    /// Whether `node` does not occur anywhere in the store yet.
    fn is_fresh(&self, node: &Node) -> bool;

    /// Insert a batch rooted at `root`, provided `root` is still fresh.
    ///
    /// Shared stores must check and insert under one lock; otherwise two
    /// writers can both see `root` as fresh and both claim it.
    fn try_commit(&mut self, root: &Node, triples: Vec<Triple>) -> Result<usize, SinkError> {
        if !self.is_fresh(root) {
            return Err(SinkError::NotFresh(root.clone()));
        }
        Ok(self.insert_all(triples))
    }
}

/// Read side of a store, as seen by the decoder.
pub trait GraphView {
    fn triples_with_subject(&self, subject: &Node) -> Vec<Triple>;
}

// ============================================================================
// Graph
// ============================================================================

/// Append-only triple set with subject and predicate indices.
///
/// Triples get dense `u32` ids in insertion order; the indices are roaring
/// bitmaps over those ids, so iteration through an index also follows
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    ids: AHashMap<Triple, u32>,
    by_subject: AHashMap<Node, RoaringBitmap>,
    by_predicate: AHashMap<Node, RoaringBitmap>,
    /// Every anonymous label mentioned in any position.
    anonymous: AHashSet<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.ids.contains_key(triple)
    }

    /// All triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Insert `triple`. Returns `false` if it was already present or the
    /// graph is full; [`Graph::try_add`] tells the two apart.
    pub fn add(&mut self, triple: Triple) -> bool {
        self.try_add(triple).unwrap_or(false)
    }

    pub fn try_add(&mut self, triple: Triple) -> Result<bool, SinkError> {
        if self.ids.contains_key(&triple) {
            return Ok(false);
        }
        let id = match u32::try_from(self.triples.len()) {
            Ok(id) if (id as usize) < MAX_TRIPLES => id,
            _ => return Err(SinkError::Full { max: MAX_TRIPLES }),
        };
        for node in [&triple.subject, &triple.predicate, &triple.object] {
            if let Node::Anonymous(label) = node {
                if !self.anonymous.contains(label) {
                    self.anonymous.insert(label.clone());
                }
            }
        }
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .insert(id);
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .insert(id);
        self.ids.insert(triple.clone(), id);
        self.triples.push(triple);
        Ok(true)
    }

    pub fn subject_triples<'a>(&'a self, subject: &Node) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_subject
            .get(subject)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .map(move |id| &self.triples[id as usize])
    }

    pub fn predicate_triples<'a>(
        &'a self,
        predicate: &Node,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_predicate
            .get(predicate)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .map(move |id| &self.triples[id as usize])
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(&'a self, subject: &Node, predicate: &'a Node) -> Vec<&'a Node> {
        self.subject_triples(subject)
            .filter(|t| &t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Whether `node` occurs in any position.
    pub fn mentions(&self, node: &Node) -> bool {
        match node {
            Node::Anonymous(label) => self.anonymous.contains(label),
            other => {
                self.by_subject.contains_key(other)
                    || self.by_predicate.contains_key(other)
                    || self.triples.iter().any(|t| &t.object == other)
            }
        }
    }

    /// Number of distinct subjects.
    pub fn subject_count(&self) -> usize {
        self.by_subject.len()
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.add(triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl GraphSink for Graph {
    fn insert(&mut self, triple: Triple) -> bool {
        self.add(triple)
    }

    fn is_fresh(&self, node: &Node) -> bool {
        !self.mentions(node)
    }

    /// Rejects the whole batch up front if it could overflow the id space.
    fn try_commit(&mut self, root: &Node, triples: Vec<Triple>) -> Result<usize, SinkError> {
        if self.mentions(root) {
            return Err(SinkError::NotFresh(root.clone()));
        }
        if self.triples.len().saturating_add(triples.len()) > MAX_TRIPLES {
            return Err(SinkError::Full { max: MAX_TRIPLES });
        }
        let mut added = 0;
        for triple in triples {
            if self.try_add(triple)? {
                added += 1;
            }
        }
        Ok(added)
    }
}

impl GraphView for Graph {
    fn triples_with_subject(&self, subject: &Node) -> Vec<Triple> {
        self.subject_triples(subject).cloned().collect()
    }
}

// ============================================================================
// SharedGraph
// ============================================================================

/// A graph shared between threads.
///
/// Each clone is a handle to the same graph. Single inserts and whole batches
/// are applied under one write lock, so readers never observe a partial
/// triple or a partial batch. Decoding should go through [`SharedGraph::snapshot`]
/// so that the whole call sees one consistent state.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Hold a read lock for the duration of a decode call.
    pub fn snapshot(&self) -> RwLockReadGuard<'_, Graph> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy out the current contents.
    pub fn to_graph(&self) -> Graph {
        self.inner.read().clone()
    }
}

impl GraphSink for SharedGraph {
    fn insert(&mut self, triple: Triple) -> bool {
        self.inner.write().add(triple)
    }

    fn insert_all(&mut self, triples: Vec<Triple>) -> usize {
        let mut graph = self.inner.write();
        let mut added = 0;
        for triple in triples {
            if graph.add(triple) {
                added += 1;
            }
        }
        added
    }

    fn is_fresh(&self, node: &Node) -> bool {
        !self.inner.read().mentions(node)
    }

    fn try_commit(&mut self, root: &Node, triples: Vec<Triple>) -> Result<usize, SinkError> {
        let mut graph = self.inner.write();
        GraphSink::try_commit(&mut *graph, root, triples)
    }
}

impl GraphView for SharedGraph {
    fn triples_with_subject(&self, subject: &Node) -> Vec<Triple> {
        self.inner.read().triples_with_subject(subject)
    }
}
