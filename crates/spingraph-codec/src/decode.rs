//! Graph -> algebra.
//!
//! The decoder walks from a root node, reads each node's `rdf:type` to pick
//! the expected shape, and follows the predicates the schema declares for it.
//! Predicates it does not know are ignored.
//!
//! The input graph is not trusted to be a tree. The walk keeps the set of
//! nodes on the current path (list cells included) and fails with
//! [`DecodeError::CyclicReference`] when a node reappears on it. Depth, total
//! visited nodes and list length are bounded by [`CodecConfig`].
//!
//! Per-call state is not unwound on error; a failed run is dropped whole.

use ahash::AHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use spingraph_algebra::{
    Constant, DatasetClause, Distinctness, Expression, GraphPattern, OperatorKind,
    OrderCondition, OrderDirection, ProjectionItem, PropertyPath, Query, QueryForm,
    SolutionModifier, TermPattern, TriplePattern, ValuesTable, Variable,
};
use spingraph_rdf::{GraphView, Node, Triple, RDF_FIRST_IRI, RDF_NIL_IRI, RDF_REST_IRI, RDF_TYPE_IRI};

use crate::config::CodecConfig;
use crate::error::DecodeError;
use crate::registry::FunctionRegistry;
use crate::vocab::*;

type Result<T> = std::result::Result<T, DecodeError>;

/// Decodes queries from any [`GraphView`].
///
/// The view should present one consistent state for the whole call (for a
/// [`spingraph_rdf::SharedGraph`], decode from its snapshot).
pub struct GraphDecoder {
    schema: Arc<VocabularySchema>,
    registry: Arc<dyn FunctionRegistry>,
    config: CodecConfig,
}

impl GraphDecoder {
    pub fn new(registry: Arc<dyn FunctionRegistry>) -> Self {
        Self {
            schema: VocabularySchema::v1(),
            registry,
            config: CodecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_schema(mut self, schema: Arc<VocabularySchema>) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn decode<G: GraphView + ?Sized>(&self, graph: &G, root: &Node) -> Result<Query> {
        let mut run = DecodeRun {
            dec: self,
            graph,
            on_stack: AHashSet::new(),
            depth: 0,
            visited: 0,
        };
        let query = run.query(root)?;
        debug!(root = %root, visited = run.visited, "decoded query");
        Ok(query)
    }
}

// ============================================================================
// Node properties
// ============================================================================

/// The outgoing triples of one typed node.
struct Props<'s> {
    schema: &'s VocabularySchema,
    node: Node,
    kind: NodeKind,
    triples: Vec<Triple>,
}

impl<'s> Props<'s> {
    fn objects<'p>(&'p self, predicate: &'p str) -> impl Iterator<Item = &'p Node> + 'p {
        self.triples
            .iter()
            .filter(move |t| t.predicate.is_iri(predicate))
            .map(|t| &t.object)
    }

    fn declared(&self, predicate: &str, cardinality: Cardinality) {
        debug_assert_eq!(
            self.schema.property(self.kind, predicate).map(|p| p.cardinality),
            Some(cardinality),
            "{predicate} on {:?}",
            self.kind
        );
    }

    fn at_most_one(&self, predicate: &'static str) -> Result<Option<&Node>> {
        let mut objects = self.objects(predicate);
        let first = objects.next();
        let extra = objects.count();
        if extra > 0 {
            return Err(DecodeError::MissingRequiredProperty {
                node: self.node.clone(),
                property: predicate,
                found: extra + 1,
            });
        }
        Ok(first)
    }

    fn required(&self, predicate: &'static str) -> Result<&Node> {
        self.declared(predicate, Cardinality::Required);
        self.at_most_one(predicate)?
            .ok_or_else(|| DecodeError::MissingRequiredProperty {
                node: self.node.clone(),
                property: predicate,
                found: 0,
            })
    }

    fn optional(&self, predicate: &'static str) -> Result<Option<&Node>> {
        self.declared(predicate, Cardinality::Optional);
        self.at_most_one(predicate)
    }

    fn many(&self, predicate: &'static str) -> Vec<&Node> {
        self.declared(predicate, Cardinality::Many);
        self.objects(predicate).collect()
    }

    fn invalid(&self, property: &'static str, value: &Node, expected: &'static str) -> DecodeError {
        DecodeError::InvalidLiteral {
            node: self.node.clone(),
            property,
            value: value.to_string(),
            expected,
        }
    }

    /// Absent reads as `false`.
    fn flag(&self, predicate: &'static str) -> Result<bool> {
        match self.optional(predicate)? {
            None => Ok(false),
            Some(value) => value
                .as_literal()
                .and_then(|l| l.as_bool())
                .ok_or_else(|| self.invalid(predicate, value, "xsd:boolean")),
        }
    }

    fn integer(&self, value: &Node, predicate: &'static str) -> Result<u64> {
        value
            .as_literal()
            .and_then(|l| l.as_u64())
            .ok_or_else(|| self.invalid(predicate, value, "non-negative xsd:integer"))
    }

    fn opt_integer(&self, predicate: &'static str) -> Result<Option<u64>> {
        self.optional(predicate)?
            .map(|v| self.integer(v, predicate))
            .transpose()
    }

    fn string(&self, value: &Node, predicate: &'static str) -> Result<String> {
        match value.as_literal() {
            Some(lit) if lit.datatype().is_none() && lit.language().is_none() => {
                Ok(lit.lexical().to_string())
            }
            _ => Err(self.invalid(predicate, value, "xsd:string")),
        }
    }

    fn required_string(&self, predicate: &'static str) -> Result<String> {
        let value = self.required(predicate)?;
        self.string(value, predicate)
    }

    fn unexpected(&self, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedNodeType {
            node: self.node.clone(),
            found: self.schema.type_iri(self.kind).to_string(),
            expected,
        }
    }
}

// ============================================================================
// Per-call state
// ============================================================================

struct DecodeRun<'a, G: ?Sized> {
    dec: &'a GraphDecoder,
    graph: &'a G,
    on_stack: AHashSet<Node>,
    depth: usize,
    visited: usize,
}

impl<'a, G: GraphView + ?Sized> DecodeRun<'a, G> {
    fn limit(&self, limit: &'static str, max: usize, node: &Node) -> DecodeError {
        DecodeError::ResourceLimitExceeded {
            limit,
            max,
            node: node.clone(),
        }
    }

    fn visit(&mut self, node: &Node) -> Result<()> {
        if self.on_stack.contains(node) {
            return Err(DecodeError::CyclicReference { node: node.clone() });
        }
        if self.visited >= self.dec.config.max_nodes {
            return Err(self.limit("max_nodes", self.dec.config.max_nodes, node));
        }
        self.visited += 1;
        self.on_stack.insert(node.clone());
        Ok(())
    }

    fn enter(&mut self, node: &Node) -> Result<()> {
        if self.depth >= self.dec.config.max_depth {
            return Err(self.limit("max_depth", self.dec.config.max_depth, node));
        }
        self.visit(node)?;
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self, node: &Node) {
        self.on_stack.remove(node);
        self.depth -= 1;
    }

    /// Run `f` on a node one level deeper.
    fn within<T>(&mut self, node: &Node, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter(node)?;
        let out = f(self)?;
        self.leave(node);
        Ok(out)
    }

    /// Read `node`'s triples and resolve its vocabulary kind.
    fn props(&self, node: &Node, expected: &'static str) -> Result<Props<'a>> {
        if node.is_literal() {
            return Err(DecodeError::UnexpectedNodeType {
                node: node.clone(),
                found: "literal".to_string(),
                expected,
            });
        }
        let dec: &'a GraphDecoder = self.dec;
        let schema: &'a VocabularySchema = &dec.schema;
        let triples = self.graph.triples_with_subject(node);
        let mut found = Vec::new();
        let mut kinds: Vec<NodeKind> = Vec::new();
        for t in triples.iter().filter(|t| t.predicate.is_iri(RDF_TYPE_IRI)) {
            found.push(t.object.to_string());
            if let Some(kind) = t.object.as_named().and_then(|iri| schema.kind_of(iri)) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        match kinds.as_slice() {
            [kind] => {
                trace!(node = %node, kind = ?kind, "decoding node");
                Ok(Props {
                    schema,
                    node: node.clone(),
                    kind: *kind,
                    triples,
                })
            }
            [] => Err(DecodeError::UnknownNodeType {
                node: node.clone(),
                found,
            }),
            several => Err(DecodeError::MissingRequiredProperty {
                node: node.clone(),
                property: RDF_TYPE_IRI,
                found: several.len(),
            }),
        }
    }

    /// Walk a list chain from `head`, decoding each element with `element`.
    fn list<T>(
        &mut self,
        head: &Node,
        mut element: impl FnMut(&mut Self, &Node) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut cells = Vec::new();
        let mut cell = head.clone();
        while !cell.is_iri(RDF_NIL_IRI) {
            if cell.is_literal() {
                return Err(DecodeError::MalformedList {
                    node: cell,
                    reason: "list cell is a literal".to_string(),
                });
            }
            if cells.len() >= self.dec.config.max_list_len {
                return Err(DecodeError::MalformedList {
                    node: cell,
                    reason: format!(
                        "no rdf:nil within {} cells",
                        self.dec.config.max_list_len
                    ),
                });
            }
            self.visit(&cell)?;

            let triples = self.graph.triples_with_subject(&cell);
            let link = |predicate: &str, name: &str| -> Result<Node> {
                let mut objects = triples
                    .iter()
                    .filter(|t| t.predicate.is_iri(predicate))
                    .map(|t| &t.object);
                match (objects.next(), objects.next()) {
                    (Some(o), None) => Ok(o.clone()),
                    (None, _) => Err(DecodeError::MalformedList {
                        node: cell.clone(),
                        reason: format!("missing {name}"),
                    }),
                    (Some(_), Some(_)) => Err(DecodeError::MalformedList {
                        node: cell.clone(),
                        reason: format!("more than one {name}"),
                    }),
                }
            };
            let first = link(RDF_FIRST_IRI, "rdf:first")?;
            let rest = link(RDF_REST_IRI, "rdf:rest")?;

            out.push(element(self, &first)?);
            cells.push(cell);
            cell = rest;
        }
        for c in &cells {
            self.on_stack.remove(c);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn query(&mut self, node: &Node) -> Result<Query> {
        let props = self.props(node, "a query")?;
        if !props.kind.is_query() {
            return Err(props.unexpected("a query"));
        }
        self.within(node, |run| run.query_body(&props))
    }

    fn query_body(&mut self, props: &Props<'a>) -> Result<Query> {
        let form = match props.kind {
            NodeKind::Select => {
                let projection = match props.optional(PROP_RESULT_VARIABLES)? {
                    Some(head) => Some(self.list(head, |run, n| run.projection(n))?),
                    None => None,
                };
                QueryForm::Select { projection }
            }
            NodeKind::Construct => {
                let head = props.required(PROP_TEMPLATES)?;
                let template =
                    self.list(head, |run, n| run.triple(n, NodeKind::TripleTemplate))?;
                QueryForm::Construct { template }
            }
            NodeKind::Ask => QueryForm::Ask,
            NodeKind::Describe => {
                let targets = match props.optional(PROP_RESULT_NODES)? {
                    Some(head) => Some(self.list(head, |run, n| run.term(n))?),
                    None => None,
                };
                QueryForm::Describe { targets }
            }
            _ => return Err(props.unexpected("a query")),
        };

        let where_node = if props.kind == NodeKind::Describe {
            props.optional(PROP_WHERE)?
        } else {
            Some(props.required(PROP_WHERE)?)
        };
        let pattern = match where_node {
            Some(n) => Some(self.pattern(n)?),
            None => None,
        };

        let distinct = if props.flag(PROP_DISTINCT)? {
            Distinctness::Distinct
        } else if props.flag(PROP_REDUCED)? {
            Distinctness::Reduced
        } else {
            Distinctness::None
        };
        let group_by = match props.optional(PROP_GROUP_BY)? {
            Some(head) => self.list(head, |run, n| run.expression(n))?,
            None => Vec::new(),
        };
        let having = match props.optional(PROP_HAVING)? {
            Some(head) => self.list(head, |run, n| run.expression(n))?,
            None => Vec::new(),
        };
        let order_by = match props.optional(PROP_ORDER_BY)? {
            Some(head) => self.list(head, |run, n| run.order_condition(n))?,
            None => Vec::new(),
        };
        let modifiers = SolutionModifier {
            order_by,
            group_by,
            having,
            limit: props.opt_integer(PROP_LIMIT)?,
            offset: props.opt_integer(PROP_OFFSET)?,
            distinct,
        };

        let values = match props.optional(PROP_VALUES)? {
            Some(n) => Some(self.values_node(n)?),
            None => None,
        };

        let mut dataset = DatasetClause::default();
        for (predicate, target) in [
            (PROP_FROM, &mut dataset.default_graphs),
            (PROP_FROM_NAMED, &mut dataset.named_graphs),
        ] {
            for graph in props.many(predicate) {
                match graph.as_named() {
                    Some(iri) => target.push(iri.to_string()),
                    None => {
                        return Err(props.invalid(predicate, graph, "a graph IRI"));
                    }
                }
            }
        }

        Ok(Query {
            form,
            dataset,
            pattern,
            modifiers,
            values,
        })
    }

    fn projection(&mut self, node: &Node) -> Result<ProjectionItem> {
        let props = self.props(node, "a projected variable")?;
        if props.kind != NodeKind::Variable {
            return Err(props.unexpected("a projected variable"));
        }
        self.within(node, |run| {
            let alias = Variable::new(props.required_string(PROP_VAR_NAME)?);
            match props.optional(PROP_EXPRESSION)? {
                None => Ok(ProjectionItem::Variable(alias)),
                Some(expr) => Ok(ProjectionItem::Expression {
                    expression: run.expression(expr)?,
                    alias,
                }),
            }
        })
    }

    fn order_condition(&mut self, node: &Node) -> Result<OrderCondition> {
        if node.is_anonymous() {
            let props = self.props(node, "an order condition")?;
            let direction = match props.kind {
                NodeKind::Asc => Some(OrderDirection::Ascending),
                NodeKind::Desc => Some(OrderDirection::Descending),
                _ => None,
            };
            if let Some(direction) = direction {
                return self.within(node, |run| {
                    let expression = run.expression(props.required(PROP_EXPRESSION)?)?;
                    Ok(OrderCondition {
                        expression,
                        direction,
                    })
                });
            }
        }
        Ok(OrderCondition {
            expression: self.expression(node)?,
            direction: OrderDirection::Ascending,
        })
    }

    // ------------------------------------------------------------------
    // Terms and variables
    // ------------------------------------------------------------------

    fn variable(&mut self, node: &Node) -> Result<Variable> {
        let props = self.props(node, "a variable")?;
        if props.kind != NodeKind::Variable {
            return Err(props.unexpected("a variable"));
        }
        self.within(node, |_| Ok(Variable::new(props.required_string(PROP_VAR_NAME)?)))
    }

    fn term(&mut self, node: &Node) -> Result<TermPattern> {
        match Constant::from_node(node) {
            Some(c) => Ok(TermPattern::Constant(c)),
            None => Ok(TermPattern::Variable(self.variable(node)?)),
        }
    }

    fn triple(&mut self, node: &Node, expected: NodeKind) -> Result<TriplePattern> {
        let what = if expected == NodeKind::TripleTemplate {
            "a triple template"
        } else {
            "a triple pattern"
        };
        let props = self.props(node, what)?;
        if props.kind != expected {
            return Err(props.unexpected(what));
        }
        self.within(node, |run| {
            Ok(TriplePattern::new(
                run.term(props.required(PROP_SUBJECT)?)?,
                run.term(props.required(PROP_PREDICATE)?)?,
                run.term(props.required(PROP_OBJECT)?)?,
            ))
        })
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    fn pattern(&mut self, node: &Node) -> Result<GraphPattern> {
        let props = self.props(node, "a graph pattern")?;
        self.within(node, |run| run.pattern_body(&props))
    }

    fn pattern_body(&mut self, props: &Props<'a>) -> Result<GraphPattern> {
        Ok(match props.kind {
            NodeKind::BasicPattern => GraphPattern::BasicPattern {
                triples: self.list(props.required(PROP_ELEMENTS)?, |run, n| {
                    run.triple(n, NodeKind::TriplePattern)
                })?,
            },
            NodeKind::TriplePath => GraphPattern::Path {
                subject: self.term(props.required(PROP_SUBJECT)?)?,
                path: self.path(props.required(PROP_PATH)?)?,
                object: self.term(props.required(PROP_OBJECT)?)?,
            },
            NodeKind::Group => GraphPattern::Group {
                elements: self.list(props.required(PROP_ELEMENTS)?, |run, n| run.pattern(n))?,
            },
            NodeKind::Union => GraphPattern::Union {
                branches: self.list(props.required(PROP_ELEMENTS)?, |run, n| run.pattern(n))?,
            },
            NodeKind::Optional => GraphPattern::Optional {
                pattern: Box::new(self.pattern(props.required(PROP_BODY)?)?),
            },
            NodeKind::Minus => GraphPattern::Minus {
                left: Box::new(self.pattern(props.required(PROP_LEFT)?)?),
                right: Box::new(self.pattern(props.required(PROP_RIGHT)?)?),
            },
            NodeKind::NamedGraph => GraphPattern::NamedGraph {
                graph: self.term(props.required(PROP_GRAPH_NAME_NODE)?)?,
                pattern: Box::new(self.pattern(props.required(PROP_BODY)?)?),
            },
            NodeKind::Service => GraphPattern::Service {
                endpoint: self.term(props.required(PROP_SERVICE_URI)?)?,
                silent: props.flag(PROP_SILENT)?,
                pattern: Box::new(self.pattern(props.required(PROP_BODY)?)?),
            },
            NodeKind::SubQuery => {
                let query = self.query(props.required(PROP_QUERY)?)?;
                let imports = match props.optional(PROP_IMPORTS)? {
                    Some(head) => self.list(head, |run, n| run.variable(n))?,
                    None => Vec::new(),
                };
                GraphPattern::SubSelect {
                    query: Box::new(query),
                    imports,
                }
            }
            NodeKind::Filter => GraphPattern::Filter {
                pattern: Box::new(self.pattern(props.required(PROP_BODY)?)?),
                expression: self.expression(props.required(PROP_EXPRESSION)?)?,
            },
            NodeKind::Bind => GraphPattern::Bind {
                expression: self.expression(props.required(PROP_EXPRESSION)?)?,
                variable: self.variable(props.required(PROP_VARIABLE)?)?,
            },
            NodeKind::Values => GraphPattern::Values {
                table: self.values_table(props)?,
            },
            _ => return Err(props.unexpected("a graph pattern")),
        })
    }

    fn values_node(&mut self, node: &Node) -> Result<ValuesTable> {
        let props = self.props(node, "a VALUES block")?;
        if props.kind != NodeKind::Values {
            return Err(props.unexpected("a VALUES block"));
        }
        self.within(node, |run| run.values_table(&props))
    }

    fn values_table(&mut self, props: &Props<'a>) -> Result<ValuesTable> {
        let variables = self.list(props.required(PROP_VARIABLES)?, |run, n| run.variable(n))?;
        let width = variables.len();
        let rows = self.list(props.required(PROP_BINDINGS)?, |run, row_head| {
            let row = run.list(row_head, |_, cell| {
                if cell.is_iri(UNDEF) {
                    return Ok(None);
                }
                match Constant::from_node(cell) {
                    Some(c) => Ok(Some(c)),
                    None => Err(DecodeError::UnexpectedNodeType {
                        node: cell.clone(),
                        found: "anonymous node".to_string(),
                        expected: "a constant or sp:undef",
                    }),
                }
            })?;
            if row.len() != width {
                return Err(DecodeError::MalformedList {
                    node: row_head.clone(),
                    reason: format!("row has {} cells, expected {width}", row.len()),
                });
            }
            Ok(row)
        })?;
        Ok(ValuesTable { variables, rows })
    }

    fn path(&mut self, node: &Node) -> Result<PropertyPath> {
        if let Some(iri) = node.as_named() {
            return Ok(PropertyPath::link(iri));
        }
        let props = self.props(node, "a property path")?;
        self.within(node, |run| {
            Ok(match props.kind {
                NodeKind::ReversePath => PropertyPath::Inverse {
                    path: Box::new(run.path(props.required(PROP_SUB_PATH)?)?),
                },
                NodeKind::SeqPath => PropertyPath::Sequence {
                    left: Box::new(run.path(props.required(PROP_PATH1)?)?),
                    right: Box::new(run.path(props.required(PROP_PATH2)?)?),
                },
                NodeKind::AltPath => PropertyPath::Alternative {
                    left: Box::new(run.path(props.required(PROP_PATH1)?)?),
                    right: Box::new(run.path(props.required(PROP_PATH2)?)?),
                },
                NodeKind::ModPath => {
                    let min_node = props.required(PROP_MOD_MIN)?;
                    PropertyPath::Repeat {
                        path: Box::new(run.path(props.required(PROP_SUB_PATH)?)?),
                        min: props.integer(min_node, PROP_MOD_MIN)?,
                        max: props.opt_integer(PROP_MOD_MAX)?,
                    }
                }
                _ => return Err(props.unexpected("a property path")),
            })
        })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self, node: &Node) -> Result<Expression> {
        if let Some(c) = Constant::from_node(node) {
            return Ok(Expression::Constant(c));
        }
        let props = self.props(node, "an expression")?;
        self.within(node, |run| run.expression_body(&props))
    }

    fn expression_body(&mut self, props: &Props<'a>) -> Result<Expression> {
        if let Some(kind) = props.kind.aggregate() {
            let expression = match props.optional(PROP_EXPRESSION)? {
                Some(n) => Some(Box::new(self.expression(n)?)),
                None => None,
            };
            let separator = match props.optional(PROP_SEPARATOR)? {
                Some(n) => Some(props.string(n, PROP_SEPARATOR)?),
                None => None,
            };
            return Ok(Expression::Aggregate {
                kind,
                expression,
                distinct: props.flag(PROP_DISTINCT)?,
                separator,
            });
        }
        Ok(match props.kind {
            NodeKind::Variable => {
                Expression::Variable(Variable::new(props.required_string(PROP_VAR_NAME)?))
            }
            NodeKind::FunctionCall => {
                let (name, unresolved) = self.function_name(props.required(PROP_FUNCTION)?)?;
                let args = self.list(props.required(PROP_ARGUMENTS)?, |run, n| run.expression(n))?;
                Expression::FunctionCall {
                    name,
                    args,
                    unresolved,
                }
            }
            NodeKind::Operator => {
                let op_node = props.required(PROP_OPERATOR)?;
                let (symbol, _) = self.function_name(op_node)?;
                let op = OperatorKind::from_symbol(&symbol).ok_or_else(|| {
                    DecodeError::UnknownOperator {
                        node: props.node.clone(),
                        operator: symbol.clone(),
                    }
                })?;
                let operands =
                    self.list(props.required(PROP_ARGUMENTS)?, |run, n| run.expression(n))?;
                Expression::Operator { op, operands }
            }
            NodeKind::Exists => {
                Expression::Exists(Box::new(self.pattern(props.required(PROP_BODY)?)?))
            }
            NodeKind::NotExists => {
                Expression::NotExists(Box::new(self.pattern(props.required(PROP_BODY)?)?))
            }
            _ => return Err(props.unexpected("an expression")),
        })
    }

    /// Textual name behind a function reference, and whether it was an
    /// unresolved placeholder.
    fn function_name(&mut self, node: &Node) -> Result<(String, bool)> {
        if let Some(iri) = node.as_named() {
            let name = self
                .dec
                .registry
                .name_of(iri)
                .unwrap_or_else(|| iri.to_string());
            return Ok((name, false));
        }
        let props = self.props(node, "a function reference")?;
        if props.kind != NodeKind::UnresolvedFunction {
            return Err(props.unexpected("a function reference"));
        }
        self.within(node, |_| Ok((props.required_string(PROP_FUNCTION_NAME)?, true)))
    }
}
