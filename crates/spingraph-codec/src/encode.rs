//! Algebra -> graph.
//!
//! One encode call is a depth-first walk over the [`Query`] tree. Each algebra
//! node becomes one freshly minted anonymous node carrying an `rdf:type` from
//! the vocabulary schema; children hang off it through the predicates the
//! schema declares for that kind. Ordered children become `rdf:first` /
//! `rdf:rest` chains ending in `rdf:nil`.
//!
//! Identity rules:
//! - variables are shared by name within a lexical scope, and a sub-select
//!   opens a new scope (seeded only with its imports);
//! - unresolved-function placeholders are shared by raw name within a call;
//! - every other node, including structurally identical sub-expressions, is
//!   minted fresh;
//! - constants are written as themselves.
//!
//! Triples are staged in memory and handed to the sink in one
//! [`GraphSink::insert_all`] only after the whole tree has been encoded.

use ahash::AHashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use spingraph_algebra::{
    Constant, Distinctness, Expression, GraphPattern, OrderDirection, ProjectionItem,
    PropertyPath, Query, QueryForm, TermPattern, TriplePattern, ValuesTable, Variable,
};
use spingraph_rdf::{
    BlankNodeAllocator, GraphSink, Literal, Node, SinkError, Triple, RDF_FIRST_IRI, RDF_NIL_IRI,
    RDF_REST_IRI, RDF_TYPE_IRI,
};

use crate::config::{CodecConfig, FunctionMode};
use crate::error::EncodeError;
use crate::registry::FunctionRegistry;
use crate::vocab::*;

type Result<T> = std::result::Result<T, EncodeError>;

/// Encodes queries into any [`GraphSink`].
///
/// An encoder is `Send + Sync`; concurrent calls on one encoder share its
/// allocator and therefore never mint the same anonymous node.
pub struct GraphEncoder {
    schema: Arc<VocabularySchema>,
    registry: Arc<dyn FunctionRegistry>,
    allocator: Arc<BlankNodeAllocator>,
    config: CodecConfig,
}

impl GraphEncoder {
    pub fn new(registry: Arc<dyn FunctionRegistry>) -> Self {
        Self {
            schema: VocabularySchema::v1(),
            registry,
            allocator: Arc::new(BlankNodeAllocator::new()),
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_allocator(mut self, allocator: Arc<BlankNodeAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_schema(mut self, schema: Arc<VocabularySchema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `query` under a freshly minted anonymous root.
    pub fn encode<S: GraphSink + ?Sized>(&self, query: &Query, sink: &mut S) -> Result<Node> {
        let mut run = EncodeRun::new(self, &*sink);
        let root = run.mint()?;
        run.query(query, &root)?;
        let (triples, minted) = run.finish();
        self.commit(triples, minted, root, sink)
    }

    /// Encode `query` under the named root `root_iri`, which must not occur
    /// in the sink yet.
    pub fn encode_with_root<S: GraphSink + ?Sized>(
        &self,
        query: &Query,
        root_iri: &str,
        sink: &mut S,
    ) -> Result<Node> {
        let root = Node::named(root_iri);
        if !sink.is_fresh(&root) {
            return Err(EncodeError::NodeCollision { node: root });
        }
        let mut run = EncodeRun::new(self, &*sink);
        run.query(query, &root)?;
        let (triples, minted) = run.finish();
        self.commit(triples, minted, root, sink)
    }

    /// Hand the staged triples to the sink, which re-checks that `root` is
    /// still unclaimed under the same lock it inserts with.
    fn commit<S: GraphSink + ?Sized>(
        &self,
        triples: Vec<Triple>,
        minted: usize,
        root: Node,
        sink: &mut S,
    ) -> Result<Node> {
        let staged = triples.len();
        let added = sink.try_commit(&root, triples).map_err(|err| match err {
            SinkError::NotFresh(node) => EncodeError::NodeCollision { node },
            SinkError::Full { max } => EncodeError::ResourceLimitExceeded {
                limit: "store_triples",
                max,
                path: "/".to_string(),
            },
        })?;
        debug!(root = %root, staged, added, minted, "encoded query");
        Ok(root)
    }
}

// ============================================================================
// Per-call state
// ============================================================================

struct EncodeRun<'a, S: ?Sized> {
    enc: &'a GraphEncoder,
    sink: &'a S,
    triples: Vec<Triple>,
    /// Innermost scope last.
    scopes: Vec<AHashMap<String, Node>>,
    placeholders: AHashMap<String, Node>,
    path: Vec<String>,
    /// Typed nodes open on the walk, counted the way the decoder enters them.
    depth: usize,
    minted: usize,
}

impl<'a, S: GraphSink + ?Sized> EncodeRun<'a, S> {
    fn new(enc: &'a GraphEncoder, sink: &'a S) -> Self {
        Self {
            enc,
            sink,
            triples: Vec::new(),
            scopes: vec![AHashMap::new()],
            placeholders: AHashMap::new(),
            path: Vec::new(),
            depth: 0,
            minted: 0,
        }
    }

    fn finish(self) -> (Vec<Triple>, usize) {
        (self.triples, self.minted)
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for seg in &self.path {
            if !seg.starts_with('[') {
                out.push('/');
            }
            out.push_str(seg);
        }
        out
    }

    /// Run `f` under path segment `segment`.
    fn nested<T>(
        &mut self,
        segment: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push(segment.into());
        let out = f(self);
        self.path.pop();
        out
    }

    /// Run `f` for one typed node and everything below it.
    ///
    /// Variable references (shared or not) and placeholders count as a level;
    /// constants, operator IRIs and list cells do not.
    fn level<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.enc.config.max_depth {
            return Err(EncodeError::ResourceLimitExceeded {
                limit: "max_depth",
                max: self.enc.config.max_depth,
                path: self.path_string(),
            });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn mint(&mut self) -> Result<Node> {
        if self.minted >= self.enc.config.max_nodes {
            return Err(EncodeError::ResourceLimitExceeded {
                limit: "max_nodes",
                max: self.enc.config.max_nodes,
                path: self.path_string(),
            });
        }
        let node = self.enc.allocator.mint();
        if !self.sink.is_fresh(&node) {
            return Err(EncodeError::NodeCollision { node });
        }
        self.minted += 1;
        Ok(node)
    }

    fn emit(&mut self, subject: &Node, predicate: &str, object: Node) {
        self.triples
            .push(Triple::new(subject.clone(), Node::named(predicate), object));
    }

    /// Emit `predicate` on a node of `kind`; the schema must declare it.
    fn prop(&mut self, kind: NodeKind, subject: &Node, predicate: &'static str, object: Node) {
        debug_assert!(
            self.enc.schema.property(kind, predicate).is_some(),
            "{predicate} is not declared for {kind:?}"
        );
        self.emit(subject, predicate, object);
    }

    fn set_type(&mut self, node: &Node, kind: NodeKind) {
        let type_iri = self.enc.schema.type_iri(kind);
        trace!(node = %node, kind = ?kind, path = %self.path_string(), "typed node");
        self.emit(node, RDF_TYPE_IRI, Node::named(type_iri));
    }

    fn typed(&mut self, kind: NodeKind) -> Result<Node> {
        let node = self.mint()?;
        self.set_type(&node, kind);
        Ok(node)
    }

    /// Encode `items` as a list chain and return its head (`rdf:nil` when
    /// empty).
    fn list<T>(
        &mut self,
        items: &[T],
        mut element: impl FnMut(&mut Self, &T) -> Result<Node>,
    ) -> Result<Node> {
        let nil = Node::named(RDF_NIL_IRI);
        if items.is_empty() {
            return Ok(nil);
        }
        let head = self.mint()?;
        let mut cell = head.clone();
        for (i, item) in items.iter().enumerate() {
            let value = self.nested(format!("[{i}]"), |run| element(run, item))?;
            self.emit(&cell, RDF_FIRST_IRI, value);
            let next = if i + 1 == items.len() {
                nil.clone()
            } else {
                self.mint()?
            };
            self.emit(&cell, RDF_REST_IRI, next.clone());
            cell = next;
        }
        Ok(head)
    }

    // ------------------------------------------------------------------
    // Variables and functions
    // ------------------------------------------------------------------

    fn variable(&mut self, var: &Variable) -> Result<Node> {
        self.level(|run| {
            if let Some(node) = run.scopes.last().and_then(|s| s.get(var.name())) {
                return Ok(node.clone());
            }
            let node = run.variable_node(var)?;
            if let Some(scope) = run.scopes.last_mut() {
                scope.insert(var.name().to_string(), node.clone());
            }
            Ok(node)
        })
    }

    /// A new `sp:Variable` node outside the scope table.
    fn variable_node(&mut self, var: &Variable) -> Result<Node> {
        let node = self.typed(NodeKind::Variable)?;
        self.prop(
            NodeKind::Variable,
            &node,
            PROP_VAR_NAME,
            Node::Literal(Literal::simple(var.name())),
        );
        Ok(node)
    }

    /// Canonical IRI for `name`, or a placeholder in lenient mode.
    fn function_ref(&mut self, name: &str, marked_unresolved: bool) -> Result<Node> {
        if !marked_unresolved {
            if let Some(iri) = self.enc.registry.resolve(name) {
                return Ok(Node::Named(iri));
            }
        }
        match self.enc.config.function_mode {
            FunctionMode::Strict => Err(EncodeError::UnresolvedFunction {
                name: name.to_string(),
                path: self.path_string(),
            }),
            FunctionMode::Lenient => self.level(|run| {
                if let Some(node) = run.placeholders.get(name) {
                    return Ok(node.clone());
                }
                warn!(name, path = %run.path_string(), "emitting unresolved function placeholder");
                let node = run.typed(NodeKind::UnresolvedFunction)?;
                run.prop(
                    NodeKind::UnresolvedFunction,
                    &node,
                    PROP_FUNCTION_NAME,
                    Node::Literal(Literal::simple(name)),
                );
                run.placeholders.insert(name.to_string(), node.clone());
                Ok(node)
            }),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn query(&mut self, q: &Query, node: &Node) -> Result<()> {
        self.level(|run| run.query_body(q, node))
    }

    fn query_body(&mut self, q: &Query, node: &Node) -> Result<()> {
        let kind = match &q.form {
            QueryForm::Select { .. } => NodeKind::Select,
            QueryForm::Construct { .. } => NodeKind::Construct,
            QueryForm::Ask => NodeKind::Ask,
            QueryForm::Describe { .. } => NodeKind::Describe,
        };
        self.set_type(node, kind);

        match &q.form {
            QueryForm::Select {
                projection: Some(items),
            } => {
                let head = self.nested("resultVariables", |run| {
                    run.list(items, |run, item| run.projection(item))
                })?;
                self.prop(kind, node, PROP_RESULT_VARIABLES, head);
            }
            QueryForm::Select { projection: None } | QueryForm::Ask => {}
            QueryForm::Construct { template } => {
                let head = self.nested("templates", |run| {
                    run.list(template, |run, t| run.triple(t, NodeKind::TripleTemplate))
                })?;
                self.prop(kind, node, PROP_TEMPLATES, head);
            }
            QueryForm::Describe { targets } => {
                if let Some(targets) = targets {
                    let head = self.nested("resultNodes", |run| {
                        run.list(targets, |run, t| run.term(t))
                    })?;
                    self.prop(kind, node, PROP_RESULT_NODES, head);
                }
            }
        }

        match &q.pattern {
            Some(pattern) => {
                let body = self.nested("where", |run| run.pattern(pattern))?;
                self.prop(kind, node, PROP_WHERE, body);
            }
            None if kind != NodeKind::Describe => {
                return Err(EncodeError::MissingPattern {
                    form: q.form.label(),
                    path: self.path_string(),
                });
            }
            None => {}
        }

        let m = &q.modifiers;
        match m.distinct {
            Distinctness::None => {}
            Distinctness::Distinct => {
                self.prop(kind, node, PROP_DISTINCT, Literal::boolean(true).into())
            }
            Distinctness::Reduced => {
                self.prop(kind, node, PROP_REDUCED, Literal::boolean(true).into())
            }
        }
        if !m.group_by.is_empty() {
            let head = self.nested("groupBy", |run| {
                run.list(&m.group_by, |run, e| run.expression(e))
            })?;
            self.prop(kind, node, PROP_GROUP_BY, head);
        }
        if !m.having.is_empty() {
            let head = self.nested("having", |run| {
                run.list(&m.having, |run, e| run.expression(e))
            })?;
            self.prop(kind, node, PROP_HAVING, head);
        }
        if !m.order_by.is_empty() {
            let head = self.nested("orderBy", |run| {
                run.list(&m.order_by, |run, cond| {
                    let key_kind = match cond.direction {
                        OrderDirection::Ascending => NodeKind::Asc,
                        OrderDirection::Descending => NodeKind::Desc,
                    };
                    run.level(|run| {
                        let key = run.typed(key_kind)?;
                        let expr =
                            run.nested("expression", |run| run.expression(&cond.expression))?;
                        run.prop(key_kind, &key, PROP_EXPRESSION, expr);
                        Ok(key)
                    })
                })
            })?;
            self.prop(kind, node, PROP_ORDER_BY, head);
        }
        if let Some(limit) = m.limit {
            self.prop(kind, node, PROP_LIMIT, Literal::integer(limit).into());
        }
        if let Some(offset) = m.offset {
            self.prop(kind, node, PROP_OFFSET, Literal::integer(offset).into());
        }

        if let Some(values) = &q.values {
            let v = self.nested("values", |run| run.values(values))?;
            self.prop(kind, node, PROP_VALUES, v);
        }
        for iri in &q.dataset.default_graphs {
            self.prop(kind, node, PROP_FROM, Node::named(iri.as_str()));
        }
        for iri in &q.dataset.named_graphs {
            self.prop(kind, node, PROP_FROM_NAMED, Node::named(iri.as_str()));
        }
        Ok(())
    }

    fn projection(&mut self, item: &ProjectionItem) -> Result<Node> {
        match item {
            ProjectionItem::Variable(var) => self.variable(var),
            ProjectionItem::Expression { expression, alias } => self.level(|run| {
                let node = run.variable_node(alias)?;
                let expr = run.nested("expression", |run| run.expression(expression))?;
                run.prop(NodeKind::Variable, &node, PROP_EXPRESSION, expr);
                Ok(node)
            }),
        }
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    fn term(&mut self, term: &TermPattern) -> Result<Node> {
        match term {
            TermPattern::Variable(var) => self.variable(var),
            TermPattern::Constant(c) => Ok(c.to_node()),
        }
    }

    fn triple(&mut self, t: &TriplePattern, kind: NodeKind) -> Result<Node> {
        self.level(|run| run.triple_body(t, kind))
    }

    fn triple_body(&mut self, t: &TriplePattern, kind: NodeKind) -> Result<Node> {
        let node = self.typed(kind)?;
        let s = self.term(&t.subject)?;
        let p = self.term(&t.predicate)?;
        let o = self.term(&t.object)?;
        self.prop(kind, &node, PROP_SUBJECT, s);
        self.prop(kind, &node, PROP_PREDICATE, p);
        self.prop(kind, &node, PROP_OBJECT, o);
        Ok(node)
    }

    fn pattern(&mut self, pattern: &GraphPattern) -> Result<Node> {
        self.level(|run| run.pattern_body(pattern))
    }

    fn pattern_body(&mut self, pattern: &GraphPattern) -> Result<Node> {
        match pattern {
            GraphPattern::BasicPattern { triples } => {
                let kind = NodeKind::BasicPattern;
                let node = self.typed(kind)?;
                let head = self.nested("elements", |run| {
                    run.list(triples, |run, t| run.triple(t, NodeKind::TriplePattern))
                })?;
                self.prop(kind, &node, PROP_ELEMENTS, head);
                Ok(node)
            }
            GraphPattern::Path {
                subject,
                path,
                object,
            } => {
                let kind = NodeKind::TriplePath;
                let node = self.typed(kind)?;
                let s = self.term(subject)?;
                let p = self.nested("path", |run| run.path(path))?;
                let o = self.term(object)?;
                self.prop(kind, &node, PROP_SUBJECT, s);
                self.prop(kind, &node, PROP_PATH, p);
                self.prop(kind, &node, PROP_OBJECT, o);
                Ok(node)
            }
            GraphPattern::Group { elements } => self.pattern_list(NodeKind::Group, elements),
            GraphPattern::Union { branches } => self.pattern_list(NodeKind::Union, branches),
            GraphPattern::Optional { pattern } => {
                let kind = NodeKind::Optional;
                let node = self.typed(kind)?;
                let body = self.nested("body", |run| run.pattern(pattern))?;
                self.prop(kind, &node, PROP_BODY, body);
                Ok(node)
            }
            GraphPattern::Minus { left, right } => {
                let kind = NodeKind::Minus;
                let node = self.typed(kind)?;
                let l = self.nested("left", |run| run.pattern(left))?;
                let r = self.nested("right", |run| run.pattern(right))?;
                self.prop(kind, &node, PROP_LEFT, l);
                self.prop(kind, &node, PROP_RIGHT, r);
                Ok(node)
            }
            GraphPattern::NamedGraph { graph, pattern } => {
                let kind = NodeKind::NamedGraph;
                let node = self.typed(kind)?;
                let g = self.term(graph)?;
                let body = self.nested("body", |run| run.pattern(pattern))?;
                self.prop(kind, &node, PROP_GRAPH_NAME_NODE, g);
                self.prop(kind, &node, PROP_BODY, body);
                Ok(node)
            }
            GraphPattern::Service {
                endpoint,
                silent,
                pattern,
            } => {
                let kind = NodeKind::Service;
                let node = self.typed(kind)?;
                let e = self.term(endpoint)?;
                let body = self.nested("body", |run| run.pattern(pattern))?;
                self.prop(kind, &node, PROP_SERVICE_URI, e);
                self.prop(kind, &node, PROP_BODY, body);
                if *silent {
                    self.prop(kind, &node, PROP_SILENT, Literal::boolean(true).into());
                }
                Ok(node)
            }
            GraphPattern::SubSelect { query, imports } => {
                let kind = NodeKind::SubQuery;
                let node = self.typed(kind)?;
                let mut outer: Vec<(String, Node)> = Vec::with_capacity(imports.len());
                for var in imports {
                    let bound = self.variable(var)?;
                    outer.push((var.name().to_string(), bound));
                }

                let inner = self.mint()?;
                self.scopes.push(outer.iter().cloned().collect());
                let encoded = self.nested("query", |run| run.query(query, &inner));
                self.scopes.pop();
                encoded?;
                self.prop(kind, &node, PROP_QUERY, inner);

                if !outer.is_empty() {
                    let head = self.nested("imports", |run| {
                        run.list(&outer, |_, (_, n)| Ok(n.clone()))
                    })?;
                    self.prop(kind, &node, PROP_IMPORTS, head);
                }
                Ok(node)
            }
            GraphPattern::Filter {
                pattern,
                expression,
            } => {
                let kind = NodeKind::Filter;
                let node = self.typed(kind)?;
                let body = self.nested("body", |run| run.pattern(pattern))?;
                let expr = self.nested("expression", |run| run.expression(expression))?;
                self.prop(kind, &node, PROP_BODY, body);
                self.prop(kind, &node, PROP_EXPRESSION, expr);
                Ok(node)
            }
            GraphPattern::Bind {
                expression,
                variable,
            } => {
                let kind = NodeKind::Bind;
                let node = self.typed(kind)?;
                let expr = self.nested("expression", |run| run.expression(expression))?;
                let var = self.variable(variable)?;
                self.prop(kind, &node, PROP_EXPRESSION, expr);
                self.prop(kind, &node, PROP_VARIABLE, var);
                Ok(node)
            }
            GraphPattern::Values { table } => {
                self.nested("values", |run| run.values_body(table))
            }
        }
    }

    fn pattern_list(&mut self, kind: NodeKind, elements: &[GraphPattern]) -> Result<Node> {
        let node = self.typed(kind)?;
        let head = self.nested("elements", |run| {
            run.list(elements, |run, p| run.pattern(p))
        })?;
        self.prop(kind, &node, PROP_ELEMENTS, head);
        Ok(node)
    }

    fn values(&mut self, table: &ValuesTable) -> Result<Node> {
        self.level(|run| run.values_body(table))
    }

    fn values_body(&mut self, table: &ValuesTable) -> Result<Node> {
        let kind = NodeKind::Values;
        let node = self.typed(kind)?;
        let vars = self.nested("variables", |run| {
            run.list(&table.variables, |run, v| run.variable(v))
        })?;
        let rows = self.nested("bindings", |run| {
            run.list(&table.rows, |run, row| {
                run.list(row, |_, cell: &Option<Constant>| {
                    Ok(match cell {
                        Some(c) => c.to_node(),
                        None => Node::named(UNDEF),
                    })
                })
            })
        })?;
        self.prop(kind, &node, PROP_VARIABLES, vars);
        self.prop(kind, &node, PROP_BINDINGS, rows);
        Ok(node)
    }

    fn path(&mut self, path: &PropertyPath) -> Result<Node> {
        match path {
            PropertyPath::Link { iri } => Ok(Node::named(iri.as_str())),
            _ => self.level(|run| run.path_body(path)),
        }
    }

    fn path_body(&mut self, path: &PropertyPath) -> Result<Node> {
        match path {
            PropertyPath::Link { iri } => Ok(Node::named(iri.as_str())),
            PropertyPath::Inverse { path } => {
                let kind = NodeKind::ReversePath;
                let node = self.typed(kind)?;
                let sub = self.nested("subPath", |run| run.path(path))?;
                self.prop(kind, &node, PROP_SUB_PATH, sub);
                Ok(node)
            }
            PropertyPath::Sequence { left, right } => {
                self.binary_path(NodeKind::SeqPath, left, right)
            }
            PropertyPath::Alternative { left, right } => {
                self.binary_path(NodeKind::AltPath, left, right)
            }
            PropertyPath::Repeat { path, min, max } => {
                let kind = NodeKind::ModPath;
                let node = self.typed(kind)?;
                let sub = self.nested("subPath", |run| run.path(path))?;
                self.prop(kind, &node, PROP_SUB_PATH, sub);
                self.prop(kind, &node, PROP_MOD_MIN, Literal::integer(*min).into());
                if let Some(max) = max {
                    self.prop(kind, &node, PROP_MOD_MAX, Literal::integer(*max).into());
                }
                Ok(node)
            }
        }
    }

    fn binary_path(
        &mut self,
        kind: NodeKind,
        left: &PropertyPath,
        right: &PropertyPath,
    ) -> Result<Node> {
        let node = self.typed(kind)?;
        let l = self.nested("path1", |run| run.path(left))?;
        let r = self.nested("path2", |run| run.path(right))?;
        self.prop(kind, &node, PROP_PATH1, l);
        self.prop(kind, &node, PROP_PATH2, r);
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self, expr: &Expression) -> Result<Node> {
        match expr {
            Expression::Variable(var) => self.variable(var),
            Expression::Constant(c) => Ok(c.to_node()),
            _ => self.level(|run| run.expression_body(expr)),
        }
    }

    fn expression_body(&mut self, expr: &Expression) -> Result<Node> {
        match expr {
            Expression::Variable(var) => self.variable(var),
            Expression::Constant(c) => Ok(c.to_node()),
            Expression::FunctionCall {
                name,
                args,
                unresolved,
            } => {
                let kind = NodeKind::FunctionCall;
                let node = self.typed(kind)?;
                let function = self.function_ref(name, *unresolved)?;
                let head = self.nested("args", |run| {
                    run.list(args, |run, a| run.expression(a))
                })?;
                self.prop(kind, &node, PROP_FUNCTION, function);
                self.prop(kind, &node, PROP_ARGUMENTS, head);
                Ok(node)
            }
            Expression::Operator { op, operands } => {
                let kind = NodeKind::Operator;
                let node = self.typed(kind)?;
                let operator = self.function_ref(op.symbol(), false)?;
                let head = self.nested("operands", |run| {
                    run.list(operands, |run, a| run.expression(a))
                })?;
                self.prop(kind, &node, PROP_OPERATOR, operator);
                self.prop(kind, &node, PROP_ARGUMENTS, head);
                Ok(node)
            }
            Expression::Aggregate {
                kind: agg,
                expression,
                distinct,
                separator,
            } => {
                let kind = NodeKind::for_aggregate(*agg);
                let node = self.typed(kind)?;
                if let Some(inner) = expression {
                    let e = self.nested("expression", |run| run.expression(inner))?;
                    self.prop(kind, &node, PROP_EXPRESSION, e);
                }
                if *distinct {
                    self.prop(kind, &node, PROP_DISTINCT, Literal::boolean(true).into());
                }
                if let Some(sep) = separator {
                    self.prop(kind, &node, PROP_SEPARATOR, Literal::simple(sep.as_str()).into());
                }
                Ok(node)
            }
            Expression::Exists(pattern) => self.exists(NodeKind::Exists, pattern),
            Expression::NotExists(pattern) => self.exists(NodeKind::NotExists, pattern),
        }
    }

    fn exists(&mut self, kind: NodeKind, pattern: &GraphPattern) -> Result<Node> {
        let node = self.typed(kind)?;
        let body = self.nested("body", |run| run.pattern(pattern))?;
        self.prop(kind, &node, PROP_BODY, body);
        Ok(node)
    }
}
