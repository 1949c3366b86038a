//! Vocabulary schema v1: the published type and predicate identifiers.
//!
//! Types and predicates live in the SPIN namespace (`sp:`); ordered sequences
//! use the standard `rdf:first` / `rdf:rest` / `rdf:nil` list terms.
//!
//! Compatibility rules:
//! - changing the meaning of an identifier is a breaking change and bumps
//!   [`VOCABULARY_VERSION`];
//! - adding an optional predicate is backward compatible, since decoders ignore
//!   predicates they do not know.

use ahash::AHashMap;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

use spingraph_algebra::AggregateKind;

/// Version of the table returned by [`VocabularySchema::v1`].
pub const VOCABULARY_VERSION: &str = "1";

/// SPIN namespace IRI prefix.
pub const SP_NS: &str = "http://spinrdf.org/sp#";

// Classes: query forms
pub const CLASS_SELECT: &str = "http://spinrdf.org/sp#Select";
pub const CLASS_CONSTRUCT: &str = "http://spinrdf.org/sp#Construct";
pub const CLASS_ASK: &str = "http://spinrdf.org/sp#Ask";
pub const CLASS_DESCRIBE: &str = "http://spinrdf.org/sp#Describe";

// Classes: patterns
pub const CLASS_BASIC_PATTERN: &str = "http://spinrdf.org/sp#BasicPattern";
pub const CLASS_TRIPLE_PATTERN: &str = "http://spinrdf.org/sp#TriplePattern";
pub const CLASS_TRIPLE_TEMPLATE: &str = "http://spinrdf.org/sp#TripleTemplate";
pub const CLASS_TRIPLE_PATH: &str = "http://spinrdf.org/sp#TriplePath";
pub const CLASS_GROUP: &str = "http://spinrdf.org/sp#Group";
pub const CLASS_OPTIONAL: &str = "http://spinrdf.org/sp#Optional";
pub const CLASS_UNION: &str = "http://spinrdf.org/sp#Union";
pub const CLASS_MINUS: &str = "http://spinrdf.org/sp#Minus";
pub const CLASS_NAMED_GRAPH: &str = "http://spinrdf.org/sp#NamedGraph";
pub const CLASS_SERVICE: &str = "http://spinrdf.org/sp#Service";
pub const CLASS_SUB_QUERY: &str = "http://spinrdf.org/sp#SubQuery";
pub const CLASS_FILTER: &str = "http://spinrdf.org/sp#Filter";
pub const CLASS_BIND: &str = "http://spinrdf.org/sp#Bind";
pub const CLASS_VALUES: &str = "http://spinrdf.org/sp#Values";

// Classes: expressions
pub const CLASS_VARIABLE: &str = "http://spinrdf.org/sp#Variable";
pub const CLASS_FUNCTION_CALL: &str = "http://spinrdf.org/sp#FunctionCall";
pub const CLASS_OPERATOR: &str = "http://spinrdf.org/sp#Operator";
pub const CLASS_UNRESOLVED_FUNCTION: &str = "http://spinrdf.org/sp#UnresolvedFunction";
pub const CLASS_COUNT: &str = "http://spinrdf.org/sp#Count";
pub const CLASS_SUM: &str = "http://spinrdf.org/sp#Sum";
pub const CLASS_AVG: &str = "http://spinrdf.org/sp#Avg";
pub const CLASS_MIN: &str = "http://spinrdf.org/sp#Min";
pub const CLASS_MAX: &str = "http://spinrdf.org/sp#Max";
pub const CLASS_SAMPLE: &str = "http://spinrdf.org/sp#Sample";
pub const CLASS_GROUP_CONCAT: &str = "http://spinrdf.org/sp#GroupConcat";
pub const CLASS_EXISTS: &str = "http://spinrdf.org/sp#Exists";
pub const CLASS_NOT_EXISTS: &str = "http://spinrdf.org/sp#NotExists";
pub const CLASS_ASC: &str = "http://spinrdf.org/sp#Asc";
pub const CLASS_DESC: &str = "http://spinrdf.org/sp#Desc";

// Classes: property paths
pub const CLASS_ALT_PATH: &str = "http://spinrdf.org/sp#AltPath";
pub const CLASS_SEQ_PATH: &str = "http://spinrdf.org/sp#SeqPath";
pub const CLASS_REVERSE_PATH: &str = "http://spinrdf.org/sp#ReversePath";
pub const CLASS_MOD_PATH: &str = "http://spinrdf.org/sp#ModPath";

// Properties: queries
pub const PROP_WHERE: &str = "http://spinrdf.org/sp#where";
pub const PROP_RESULT_VARIABLES: &str = "http://spinrdf.org/sp#resultVariables";
pub const PROP_RESULT_NODES: &str = "http://spinrdf.org/sp#resultNodes";
pub const PROP_TEMPLATES: &str = "http://spinrdf.org/sp#templates";
pub const PROP_DISTINCT: &str = "http://spinrdf.org/sp#distinct";
pub const PROP_REDUCED: &str = "http://spinrdf.org/sp#reduced";
pub const PROP_GROUP_BY: &str = "http://spinrdf.org/sp#groupBy";
pub const PROP_HAVING: &str = "http://spinrdf.org/sp#having";
pub const PROP_ORDER_BY: &str = "http://spinrdf.org/sp#orderBy";
pub const PROP_LIMIT: &str = "http://spinrdf.org/sp#limit";
pub const PROP_OFFSET: &str = "http://spinrdf.org/sp#offset";
pub const PROP_VALUES: &str = "http://spinrdf.org/sp#values";
pub const PROP_FROM: &str = "http://spinrdf.org/sp#from";
pub const PROP_FROM_NAMED: &str = "http://spinrdf.org/sp#fromNamed";

// Properties: patterns
pub const PROP_ELEMENTS: &str = "http://spinrdf.org/sp#elements";
pub const PROP_SUBJECT: &str = "http://spinrdf.org/sp#subject";
pub const PROP_PREDICATE: &str = "http://spinrdf.org/sp#predicate";
pub const PROP_OBJECT: &str = "http://spinrdf.org/sp#object";
pub const PROP_PATH: &str = "http://spinrdf.org/sp#path";
pub const PROP_BODY: &str = "http://spinrdf.org/sp#body";
pub const PROP_LEFT: &str = "http://spinrdf.org/sp#left";
pub const PROP_RIGHT: &str = "http://spinrdf.org/sp#right";
pub const PROP_GRAPH_NAME_NODE: &str = "http://spinrdf.org/sp#graphNameNode";
pub const PROP_SERVICE_URI: &str = "http://spinrdf.org/sp#serviceURI";
pub const PROP_SILENT: &str = "http://spinrdf.org/sp#silent";
pub const PROP_QUERY: &str = "http://spinrdf.org/sp#query";
pub const PROP_IMPORTS: &str = "http://spinrdf.org/sp#imports";
pub const PROP_VARIABLE: &str = "http://spinrdf.org/sp#variable";
pub const PROP_VARIABLES: &str = "http://spinrdf.org/sp#variables";
pub const PROP_BINDINGS: &str = "http://spinrdf.org/sp#bindings";

// Properties: expressions
pub const PROP_VAR_NAME: &str = "http://spinrdf.org/sp#varName";
pub const PROP_EXPRESSION: &str = "http://spinrdf.org/sp#expression";
pub const PROP_FUNCTION: &str = "http://spinrdf.org/sp#function";
pub const PROP_FUNCTION_NAME: &str = "http://spinrdf.org/sp#functionName";
pub const PROP_OPERATOR: &str = "http://spinrdf.org/sp#operator";
pub const PROP_ARGUMENTS: &str = "http://spinrdf.org/sp#arguments";
pub const PROP_SEPARATOR: &str = "http://spinrdf.org/sp#separator";

// Properties: paths
pub const PROP_PATH1: &str = "http://spinrdf.org/sp#path1";
pub const PROP_PATH2: &str = "http://spinrdf.org/sp#path2";
pub const PROP_SUB_PATH: &str = "http://spinrdf.org/sp#subPath";
pub const PROP_MOD_MIN: &str = "http://spinrdf.org/sp#modMin";
pub const PROP_MOD_MAX: &str = "http://spinrdf.org/sp#modMax";

/// Marks an `UNDEF` cell in a VALUES row.
pub const UNDEF: &str = "http://spinrdf.org/sp#undef";

// ============================================================================
// Schema types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Select,
    Construct,
    Ask,
    Describe,
    BasicPattern,
    TriplePattern,
    TripleTemplate,
    TriplePath,
    Group,
    Optional,
    Union,
    Minus,
    NamedGraph,
    Service,
    SubQuery,
    Filter,
    Bind,
    Values,
    Variable,
    FunctionCall,
    Operator,
    UnresolvedFunction,
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Sample,
    GroupConcat,
    Exists,
    NotExists,
    Asc,
    Desc,
    AltPath,
    SeqPath,
    ReversePath,
    ModPath,
}

impl NodeKind {
    pub fn is_query(self) -> bool {
        matches!(
            self,
            NodeKind::Select | NodeKind::Construct | NodeKind::Ask | NodeKind::Describe
        )
    }

    pub fn aggregate(self) -> Option<AggregateKind> {
        Some(match self {
            NodeKind::Count => AggregateKind::Count,
            NodeKind::Sum => AggregateKind::Sum,
            NodeKind::Avg => AggregateKind::Avg,
            NodeKind::Min => AggregateKind::Min,
            NodeKind::Max => AggregateKind::Max,
            NodeKind::Sample => AggregateKind::Sample,
            NodeKind::GroupConcat => AggregateKind::GroupConcat,
            _ => return None,
        })
    }

    pub fn for_aggregate(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Count => NodeKind::Count,
            AggregateKind::Sum => NodeKind::Sum,
            AggregateKind::Avg => NodeKind::Avg,
            AggregateKind::Min => NodeKind::Min,
            AggregateKind::Max => NodeKind::Max,
            AggregateKind::Sample => NodeKind::Sample,
            AggregateKind::GroupConcat => NodeKind::GroupConcat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one object.
    Required,
    /// Zero or one object.
    Optional,
    /// Any number of objects.
    Many,
}

/// What the object of a property is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Node,
    List,
    Boolean,
    Integer,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub predicate: &'static str,
    pub cardinality: Cardinality,
    pub shape: ValueShape,
}

const fn prop(predicate: &'static str, cardinality: Cardinality, shape: ValueShape) -> PropertySpec {
    PropertySpec {
        predicate,
        cardinality,
        shape,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeSpec {
    pub kind: NodeKind,
    pub type_iri: &'static str,
    pub properties: Vec<PropertySpec>,
}

/// The versioned kind <-> identifier table, built once per process.
#[derive(Debug)]
pub struct VocabularySchema {
    version: &'static str,
    types: Vec<TypeSpec>,
    by_type: AHashMap<&'static str, usize>,
    by_kind: AHashMap<NodeKind, usize>,
}

use Cardinality::{Many, Optional as Opt, Required as Req};

/// Properties shared by every query form.
const QUERY_COMMON: [PropertySpec; 10] = [
    prop(PROP_DISTINCT, Opt, ValueShape::Boolean),
    prop(PROP_REDUCED, Opt, ValueShape::Boolean),
    prop(PROP_GROUP_BY, Opt, ValueShape::List),
    prop(PROP_HAVING, Opt, ValueShape::List),
    prop(PROP_ORDER_BY, Opt, ValueShape::List),
    prop(PROP_LIMIT, Opt, ValueShape::Integer),
    prop(PROP_OFFSET, Opt, ValueShape::Integer),
    prop(PROP_VALUES, Opt, ValueShape::Node),
    prop(PROP_FROM, Many, ValueShape::Node),
    prop(PROP_FROM_NAMED, Many, ValueShape::Node),
];

const AGGREGATE: [PropertySpec; 3] = [
    prop(PROP_EXPRESSION, Opt, ValueShape::Node),
    prop(PROP_DISTINCT, Opt, ValueShape::Boolean),
    prop(PROP_SEPARATOR, Opt, ValueShape::String),
];

fn query_spec(kind: NodeKind, type_iri: &'static str, own: &[PropertySpec]) -> TypeSpec {
    let mut properties = own.to_vec();
    properties.extend_from_slice(&QUERY_COMMON);
    TypeSpec {
        kind,
        type_iri,
        properties,
    }
}

fn type_spec(kind: NodeKind, type_iri: &'static str, properties: &[PropertySpec]) -> TypeSpec {
    TypeSpec {
        kind,
        type_iri,
        properties: properties.to_vec(),
    }
}

impl VocabularySchema {
    /// The process-wide v1 table.
    pub fn v1() -> Arc<VocabularySchema> {
        static V1: OnceLock<Arc<VocabularySchema>> = OnceLock::new();
        V1.get_or_init(|| Arc::new(Self::build_v1())).clone()
    }

    fn build_v1() -> Self {
        use NodeKind as K;
        use ValueShape::{Boolean, Integer, List, Node, String as Str};

        let triple = [
            prop(PROP_SUBJECT, Req, Node),
            prop(PROP_PREDICATE, Req, Node),
            prop(PROP_OBJECT, Req, Node),
        ];
        let binary_path = [prop(PROP_PATH1, Req, Node), prop(PROP_PATH2, Req, Node)];
        let body = [prop(PROP_BODY, Req, Node)];

        let types = vec![
            query_spec(
                K::Select,
                CLASS_SELECT,
                &[
                    prop(PROP_WHERE, Req, Node),
                    prop(PROP_RESULT_VARIABLES, Opt, List),
                ],
            ),
            query_spec(
                K::Construct,
                CLASS_CONSTRUCT,
                &[prop(PROP_WHERE, Req, Node), prop(PROP_TEMPLATES, Req, List)],
            ),
            query_spec(K::Ask, CLASS_ASK, &[prop(PROP_WHERE, Req, Node)]),
            query_spec(
                K::Describe,
                CLASS_DESCRIBE,
                &[
                    prop(PROP_WHERE, Opt, Node),
                    prop(PROP_RESULT_NODES, Opt, List),
                ],
            ),
            type_spec(K::BasicPattern, CLASS_BASIC_PATTERN, &[prop(PROP_ELEMENTS, Req, List)]),
            type_spec(K::TriplePattern, CLASS_TRIPLE_PATTERN, &triple),
            type_spec(K::TripleTemplate, CLASS_TRIPLE_TEMPLATE, &triple),
            type_spec(
                K::TriplePath,
                CLASS_TRIPLE_PATH,
                &[
                    prop(PROP_SUBJECT, Req, Node),
                    prop(PROP_PATH, Req, Node),
                    prop(PROP_OBJECT, Req, Node),
                ],
            ),
            type_spec(K::Group, CLASS_GROUP, &[prop(PROP_ELEMENTS, Req, List)]),
            type_spec(K::Optional, CLASS_OPTIONAL, &body),
            type_spec(K::Union, CLASS_UNION, &[prop(PROP_ELEMENTS, Req, List)]),
            type_spec(
                K::Minus,
                CLASS_MINUS,
                &[prop(PROP_LEFT, Req, Node), prop(PROP_RIGHT, Req, Node)],
            ),
            type_spec(
                K::NamedGraph,
                CLASS_NAMED_GRAPH,
                &[prop(PROP_GRAPH_NAME_NODE, Req, Node), prop(PROP_BODY, Req, Node)],
            ),
            type_spec(
                K::Service,
                CLASS_SERVICE,
                &[
                    prop(PROP_SERVICE_URI, Req, Node),
                    prop(PROP_BODY, Req, Node),
                    prop(PROP_SILENT, Opt, Boolean),
                ],
            ),
            type_spec(
                K::SubQuery,
                CLASS_SUB_QUERY,
                &[prop(PROP_QUERY, Req, Node), prop(PROP_IMPORTS, Opt, List)],
            ),
            type_spec(
                K::Filter,
                CLASS_FILTER,
                &[prop(PROP_BODY, Req, Node), prop(PROP_EXPRESSION, Req, Node)],
            ),
            type_spec(
                K::Bind,
                CLASS_BIND,
                &[prop(PROP_EXPRESSION, Req, Node), prop(PROP_VARIABLE, Req, Node)],
            ),
            type_spec(
                K::Values,
                CLASS_VALUES,
                &[prop(PROP_VARIABLES, Req, List), prop(PROP_BINDINGS, Req, List)],
            ),
            type_spec(
                K::Variable,
                CLASS_VARIABLE,
                &[prop(PROP_VAR_NAME, Req, Str), prop(PROP_EXPRESSION, Opt, Node)],
            ),
            type_spec(
                K::FunctionCall,
                CLASS_FUNCTION_CALL,
                &[prop(PROP_FUNCTION, Req, Node), prop(PROP_ARGUMENTS, Req, List)],
            ),
            type_spec(
                K::Operator,
                CLASS_OPERATOR,
                &[prop(PROP_OPERATOR, Req, Node), prop(PROP_ARGUMENTS, Req, List)],
            ),
            type_spec(
                K::UnresolvedFunction,
                CLASS_UNRESOLVED_FUNCTION,
                &[prop(PROP_FUNCTION_NAME, Req, Str)],
            ),
            type_spec(K::Count, CLASS_COUNT, &AGGREGATE),
            type_spec(K::Sum, CLASS_SUM, &AGGREGATE),
            type_spec(K::Avg, CLASS_AVG, &AGGREGATE),
            type_spec(K::Min, CLASS_MIN, &AGGREGATE),
            type_spec(K::Max, CLASS_MAX, &AGGREGATE),
            type_spec(K::Sample, CLASS_SAMPLE, &AGGREGATE),
            type_spec(K::GroupConcat, CLASS_GROUP_CONCAT, &AGGREGATE),
            type_spec(K::Exists, CLASS_EXISTS, &body),
            type_spec(K::NotExists, CLASS_NOT_EXISTS, &body),
            type_spec(K::Asc, CLASS_ASC, &[prop(PROP_EXPRESSION, Req, Node)]),
            type_spec(K::Desc, CLASS_DESC, &[prop(PROP_EXPRESSION, Req, Node)]),
            type_spec(K::AltPath, CLASS_ALT_PATH, &binary_path),
            type_spec(K::SeqPath, CLASS_SEQ_PATH, &binary_path),
            type_spec(K::ReversePath, CLASS_REVERSE_PATH, &[prop(PROP_SUB_PATH, Req, Node)]),
            type_spec(
                K::ModPath,
                CLASS_MOD_PATH,
                &[
                    prop(PROP_SUB_PATH, Req, Node),
                    prop(PROP_MOD_MIN, Req, Integer),
                    prop(PROP_MOD_MAX, Opt, Integer),
                ],
            ),
        ];

        let mut by_type = AHashMap::new();
        let mut by_kind = AHashMap::new();
        for (idx, t) in types.iter().enumerate() {
            by_type.insert(t.type_iri, idx);
            by_kind.insert(t.kind, idx);
        }

        Self {
            version: VOCABULARY_VERSION,
            types,
            by_type,
            by_kind,
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn types(&self) -> &[TypeSpec] {
        &self.types
    }

    pub fn type_spec(&self, kind: NodeKind) -> Option<&TypeSpec> {
        self.by_kind.get(&kind).map(|&idx| &self.types[idx])
    }

    /// Type IRI of `kind`. Every [`NodeKind`] has one in v1.
    pub fn type_iri(&self, kind: NodeKind) -> &'static str {
        self.type_spec(kind).map(|t| t.type_iri).unwrap_or(SP_NS)
    }

    pub fn kind_of(&self, type_iri: &str) -> Option<NodeKind> {
        self.by_type.get(type_iri).map(|&idx| self.types[idx].kind)
    }

    pub fn property(&self, kind: NodeKind, predicate: &str) -> Option<&PropertySpec> {
        self.type_spec(kind)?
            .properties
            .iter()
            .find(|p| p.predicate == predicate)
    }
}
