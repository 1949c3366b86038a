use rayon::prelude::*;
use std::sync::Arc;

use spingraph_algebra::{
    Constant, Expression, GraphPattern, Literal, OperatorKind, ProjectionItem, Query,
    TermPattern, TriplePattern, Variable,
};
use spingraph_codec::vocab::*;
use spingraph_codec::{
    BuiltinRegistry, CodecConfig, DecodeError, EncodeError, FunctionMode, GraphDecoder,
    GraphEncoder,
};
use spingraph_rdf::{
    Graph, GraphSink, Node, SharedGraph, Triple, RDF_FIRST_IRI, RDF_NIL_IRI, RDF_REST_IRI,
    RDF_TYPE_IRI,
};

const PERSON: &str = "http://example.org/Person";

fn registry() -> Arc<BuiltinRegistry> {
    Arc::new(BuiltinRegistry::sparql())
}

fn one(graph: &Graph, subject: &Node, predicate: &str) -> Node {
    let predicate = Node::named(predicate);
    let objects = graph.objects(subject, &predicate);
    assert_eq!(objects.len(), 1, "{subject} {predicate}: {objects:?}");
    objects[0].clone()
}

fn person_query() -> Query {
    Query::select(
        Some(vec![ProjectionItem::var("s")]),
        GraphPattern::basic(vec![TriplePattern::new(
            TermPattern::var("s"),
            TermPattern::iri(RDF_TYPE_IRI),
            TermPattern::iri(PERSON),
        )]),
    )
}

fn var_nodes_named(graph: &Graph, name: &str) -> usize {
    graph
        .predicate_triples(&Node::named(PROP_VAR_NAME))
        .filter(|t| t.object == Node::Literal(Literal::simple(name)))
        .count()
}

// ============================================================================
// Graph shape
// ============================================================================

#[test]
fn select_person_has_expected_shape() {
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .encode(&person_query(), &mut graph)
        .unwrap();

    assert!(root.is_anonymous());
    assert_eq!(one(&graph, &root, RDF_TYPE_IRI), Node::named(CLASS_SELECT));

    let cell = one(&graph, &root, PROP_RESULT_VARIABLES);
    let var = one(&graph, &cell, RDF_FIRST_IRI);
    assert_eq!(one(&graph, &cell, RDF_REST_IRI), Node::named(RDF_NIL_IRI));
    assert_eq!(one(&graph, &var, RDF_TYPE_IRI), Node::named(CLASS_VARIABLE));
    assert_eq!(
        one(&graph, &var, PROP_VAR_NAME),
        Node::Literal(Literal::simple("s"))
    );

    let bgp = one(&graph, &root, PROP_WHERE);
    assert_eq!(one(&graph, &bgp, RDF_TYPE_IRI), Node::named(CLASS_BASIC_PATTERN));
    let elements = one(&graph, &bgp, PROP_ELEMENTS);
    assert_eq!(one(&graph, &elements, RDF_REST_IRI), Node::named(RDF_NIL_IRI));
    let tp = one(&graph, &elements, RDF_FIRST_IRI);
    assert_eq!(one(&graph, &tp, RDF_TYPE_IRI), Node::named(CLASS_TRIPLE_PATTERN));
    assert_eq!(one(&graph, &tp, PROP_SUBJECT), var);
    assert_eq!(one(&graph, &tp, PROP_PREDICATE), Node::named(RDF_TYPE_IRI));
    assert_eq!(one(&graph, &tp, PROP_OBJECT), Node::named(PERSON));

    // root 3, projection cell 2, variable 2, bgp 2, elements cell 2, triple 4
    assert_eq!(graph.len(), 15);

    let back = GraphDecoder::new(registry()).decode(&graph, &root).unwrap();
    assert_eq!(back, person_query());
}

#[test]
fn list_order_is_preserved() {
    for n in [0usize, 1, 10, 1000] {
        let vars: Vec<ProjectionItem> =
            (0..n).map(|i| ProjectionItem::var(format!("v{i}"))).collect();
        let q = Query::select(Some(vars), GraphPattern::group(Vec::new()));
        let mut graph = Graph::new();
        let root = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap();

        let mut names = Vec::new();
        let mut cell = one(&graph, &root, PROP_RESULT_VARIABLES);
        while !cell.is_iri(RDF_NIL_IRI) {
            let var = one(&graph, &cell, RDF_FIRST_IRI);
            let name = one(&graph, &var, PROP_VAR_NAME);
            names.push(name.as_literal().unwrap().lexical().to_string());
            cell = one(&graph, &cell, RDF_REST_IRI);
        }
        let expected: Vec<String> = (0..n).map(|i| format!("v{i}")).collect();
        assert_eq!(names, expected, "n = {n}");

        let back = GraphDecoder::new(registry()).decode(&graph, &root).unwrap();
        assert_eq!(back, q, "n = {n}");
    }
}

#[test]
fn literals_keep_lexical_datatype_and_language() {
    let literals = vec![
        Literal::simple("naïve café 日本語 \"quoted\"\n"),
        Literal::lang("colour", "en-GB"),
        Literal::typed("42", "http://www.w3.org/2001/XMLSchema#integer"),
        Literal::typed("x", "http://example.org/dt#custom"),
    ];
    let triples = literals
        .iter()
        .map(|l| {
            TriplePattern::new(
                TermPattern::var("s"),
                TermPattern::iri("http://example.org/p"),
                TermPattern::literal(l.clone()),
            )
        })
        .collect();
    let q = Query::ask(GraphPattern::basic(triples));

    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap();
    for l in &literals {
        let node = Node::Literal(l.clone());
        assert_eq!(
            graph.iter().filter(|t| t.object == node).count(),
            1,
            "{node}"
        );
    }
    let back = GraphDecoder::new(registry()).decode(&graph, &root).unwrap();
    assert_eq!(back, q);
}

// ============================================================================
// Scopes
// ============================================================================

fn scoped_query(imports: Vec<Variable>) -> Query {
    let inner = Query::select(
        Some(vec![ProjectionItem::var("x")]),
        GraphPattern::basic(vec![TriplePattern::new(
            TermPattern::var("x"),
            TermPattern::iri("http://example.org/q"),
            TermPattern::var("z"),
        )]),
    );
    Query::select(
        Some(vec![ProjectionItem::var("x")]),
        GraphPattern::group(vec![
            GraphPattern::basic(vec![TriplePattern::new(
                TermPattern::var("x"),
                TermPattern::iri("http://example.org/p"),
                TermPattern::var("y"),
            )]),
            GraphPattern::sub_select(inner, imports),
        ]),
    )
}

#[test]
fn sub_select_without_imports_gets_its_own_variables() {
    let q = scoped_query(Vec::new());
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap();

    assert_eq!(var_nodes_named(&graph, "x"), 2);
    assert_eq!(var_nodes_named(&graph, "y"), 1);
    assert_eq!(var_nodes_named(&graph, "z"), 1);
    assert_eq!(GraphDecoder::new(registry()).decode(&graph, &root).unwrap(), q);
}

#[test]
fn imported_variable_is_the_outer_node() {
    let q = scoped_query(vec![Variable::new("x")]);
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap();

    assert_eq!(var_nodes_named(&graph, "x"), 1);
    let sub = graph
        .predicate_triples(&Node::named(RDF_TYPE_IRI))
        .find(|t| t.object.is_iri(CLASS_SUB_QUERY))
        .map(|t| t.subject.clone())
        .unwrap();
    let imports = one(&graph, &sub, PROP_IMPORTS);
    let imported = one(&graph, &imports, RDF_FIRST_IRI);
    let outer = one(&graph, &root, PROP_RESULT_VARIABLES);
    assert_eq!(one(&graph, &outer, RDF_FIRST_IRI), imported);

    assert_eq!(GraphDecoder::new(registry()).decode(&graph, &root).unwrap(), q);
}

// ============================================================================
// Function modes
// ============================================================================

fn unknown_call_query() -> Query {
    let call = |arg: &str| Expression::call("my:fn", vec![Expression::var(arg)]);
    Query::select(
        Some(vec![ProjectionItem::var("a")]),
        GraphPattern::filter(
            GraphPattern::group(Vec::new()),
            Expression::binary(OperatorKind::And, call("a"), call("b")),
        ),
    )
}

#[test]
fn strict_mode_rejects_unknown_function_without_writing() {
    let mut graph = Graph::new();
    let err = GraphEncoder::new(registry())
        .encode(&unknown_call_query(), &mut graph)
        .unwrap_err();
    match err {
        EncodeError::UnresolvedFunction { name, path } => {
            assert_eq!(name, "my:fn");
            assert_eq!(path, "/where/expression/operands[0]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(graph.is_empty());
}

#[test]
fn lenient_placeholders_decode_as_unresolved_calls() {
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .with_config(CodecConfig::lenient())
        .encode(&unknown_call_query(), &mut graph)
        .unwrap();

    let placeholders: Vec<&Triple> = graph
        .iter()
        .filter(|t| t.object.is_iri(CLASS_UNRESOLVED_FUNCTION))
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(
        one(&graph, &placeholders[0].subject, PROP_FUNCTION_NAME),
        Node::Literal(Literal::simple("my:fn"))
    );

    let back = GraphDecoder::new(registry()).decode(&graph, &root).unwrap();
    let mut expected = unknown_call_query();
    if let Some(GraphPattern::Filter { expression, .. }) = expected.pattern.as_mut() {
        if let Expression::Operator { operands, .. } = expression {
            for e in operands {
                if let Expression::FunctionCall { unresolved, .. } = e {
                    *unresolved = true;
                }
            }
        }
    }
    assert_eq!(back, expected);
}

#[test]
fn marked_unresolved_call_round_trips_in_lenient_mode() {
    let q = Query::ask(GraphPattern::filter(
        GraphPattern::group(Vec::new()),
        Expression::FunctionCall {
            name: "STRLEN".to_string(),
            args: Vec::new(),
            unresolved: true,
        },
    ));
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .with_config(CodecConfig::lenient())
        .encode(&q, &mut graph)
        .unwrap();
    assert_eq!(GraphDecoder::new(registry()).decode(&graph, &root).unwrap(), q);

    let strict = GraphEncoder::new(registry()).encode(&q, &mut Graph::new());
    assert!(matches!(strict, Err(EncodeError::UnresolvedFunction { .. })));
}

#[test]
fn lower_case_builtin_is_not_folded_to_its_keyword() {
    let q = Query::ask(GraphPattern::filter(
        GraphPattern::group(Vec::new()),
        Expression::call("strlen", vec![Expression::var("o")]),
    ));

    let mut graph = Graph::new();
    let err = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap_err();
    assert!(matches!(err, EncodeError::UnresolvedFunction { ref name, .. } if name == "strlen"));
    assert!(graph.is_empty());

    // Lenient mode keeps the spelling on the placeholder.
    let root = GraphEncoder::new(registry())
        .with_config(CodecConfig::lenient())
        .encode(&q, &mut graph)
        .unwrap();
    match GraphDecoder::new(registry()).decode(&graph, &root).unwrap().pattern {
        Some(GraphPattern::Filter {
            expression: Expression::FunctionCall { name, unresolved, .. },
            ..
        }) => {
            assert_eq!(name, "strlen");
            assert!(unresolved);
        }
        other => panic!("unexpected pattern {other:?}"),
    }
}

#[test]
fn extension_function_resolves_both_ways() {
    let ext = "http://example.org/fn#similarity";
    let reg = Arc::new(BuiltinRegistry::sparql().with_function("ex:similarity", ext));
    let q = Query::ask(GraphPattern::filter(
        GraphPattern::group(Vec::new()),
        Expression::call("ex:similarity", vec![Expression::var("a"), Expression::var("b")]),
    ));
    let mut graph = Graph::new();
    let root = GraphEncoder::new(reg.clone()).encode(&q, &mut graph).unwrap();
    assert!(graph.iter().any(|t| t.predicate.is_iri(PROP_FUNCTION) && t.object.is_iri(ext)));
    assert_eq!(GraphDecoder::new(reg).decode(&graph, &root).unwrap(), q);

    // A decoder without the extension still reports the IRI as the name.
    let plain = GraphDecoder::new(registry()).decode(&graph, &root).unwrap();
    match plain.pattern {
        Some(GraphPattern::Filter {
            expression: Expression::FunctionCall { name, unresolved, .. },
            ..
        }) => {
            assert_eq!(name, ext);
            assert!(!unresolved);
        }
        other => panic!("unexpected pattern: {other:?}"),
    }
}

// ============================================================================
// Malformed input and limits
// ============================================================================

#[test]
fn list_looping_back_is_cyclic() {
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .encode(
            &Query::ask(GraphPattern::Union {
                branches: vec![GraphPattern::group(Vec::new()), GraphPattern::group(Vec::new())],
            }),
            &mut graph,
        )
        .unwrap();

    // Point the last cell of the union's element list back at its head.
    let union = one(&graph, &root, PROP_WHERE);
    let head = one(&graph, &union, PROP_ELEMENTS);
    let last = one(&graph, &head, RDF_REST_IRI);
    let rebuilt: Graph = graph
        .iter()
        .filter(|t| !(t.subject == last && t.predicate.is_iri(RDF_REST_IRI)))
        .cloned()
        .chain(std::iter::once(Triple::new(
            last.clone(),
            Node::named(RDF_REST_IRI),
            head.clone(),
        )))
        .collect();

    let err = GraphDecoder::new(registry())
        .decode(&rebuilt, &root)
        .unwrap_err();
    assert_eq!(err, DecodeError::CyclicReference { node: head });
}

#[test]
fn encoder_and_decoder_agree_on_depth() {
    // Ask > Optional x3 > BasicPattern > TriplePattern > Variable: 7 levels.
    let mut nested = GraphPattern::basic(vec![TriplePattern::new(
        TermPattern::var("s"),
        TermPattern::iri("http://example.org/p"),
        TermPattern::var("o"),
    )]);
    for _ in 0..3 {
        nested = GraphPattern::optional(nested);
    }
    let q = Query::ask(nested);

    for max_depth in 1..=9 {
        let config = CodecConfig {
            max_depth,
            ..CodecConfig::default()
        };
        let mut graph = Graph::new();
        let encoded = GraphEncoder::new(registry())
            .with_config(config.clone())
            .encode(&q, &mut graph);
        assert_eq!(encoded.is_ok(), max_depth >= 7, "encode at max_depth {max_depth}");
        if let Err(err) = encoded {
            assert!(matches!(err, EncodeError::ResourceLimitExceeded { limit: "max_depth", .. }));
            continue;
        }
        let root = encoded.unwrap();
        let decoded = GraphDecoder::new(registry()).with_config(config).decode(&graph, &root);
        assert_eq!(decoded.unwrap(), q, "decode at max_depth {max_depth}");
    }

    // The same graph fails to decode one level short of the limit.
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry()).encode(&q, &mut graph).unwrap();
    let short = GraphDecoder::new(registry()).with_config(CodecConfig {
        max_depth: 6,
        ..CodecConfig::default()
    });
    assert!(matches!(
        short.decode(&graph, &root),
        Err(DecodeError::ResourceLimitExceeded { limit: "max_depth", max: 6, .. })
    ));
}

#[test]
fn decoder_limits_are_enforced() {
    let mut nested = GraphPattern::group(Vec::new());
    for _ in 0..10 {
        nested = GraphPattern::optional(nested);
    }
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .encode(&Query::ask(nested), &mut graph)
        .unwrap();
    let shallow = GraphDecoder::new(registry()).with_config(CodecConfig {
        max_depth: 5,
        ..CodecConfig::default()
    });
    match shallow.decode(&graph, &root) {
        Err(DecodeError::ResourceLimitExceeded { limit, max, .. }) => {
            assert_eq!((limit, max), ("max_depth", 5));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let wide = Query::select(
        Some((0..20).map(|i| ProjectionItem::var(format!("v{i}"))).collect()),
        GraphPattern::group(Vec::new()),
    );
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry()).encode(&wide, &mut graph).unwrap();
    let short = GraphDecoder::new(registry()).with_config(CodecConfig {
        max_list_len: 10,
        ..CodecConfig::default()
    });
    assert!(matches!(
        short.decode(&graph, &root),
        Err(DecodeError::MalformedList { .. })
    ));
    let few = GraphDecoder::new(registry()).with_config(CodecConfig {
        max_nodes: 8,
        ..CodecConfig::default()
    });
    assert!(matches!(
        few.decode(&graph, &root),
        Err(DecodeError::ResourceLimitExceeded { limit: "max_nodes", .. })
    ));
}

#[test]
fn encoder_node_limit_leaves_sink_untouched() {
    let mut graph = Graph::new();
    let before = GraphEncoder::new(registry())
        .encode(&person_query(), &mut graph)
        .unwrap();
    let len = graph.len();

    let encoder = GraphEncoder::new(registry()).with_config(CodecConfig {
        max_nodes: 4,
        ..CodecConfig::default()
    });
    let err = encoder.encode(&person_query(), &mut graph).unwrap_err();
    assert!(matches!(
        err,
        EncodeError::ResourceLimitExceeded { limit: "max_nodes", max: 4, .. }
    ));
    assert_eq!(graph.len(), len);
    assert!(GraphDecoder::new(registry()).decode(&graph, &before).is_ok());
}

#[test]
fn strict_mode_is_the_default() {
    assert_eq!(CodecConfig::default().function_mode, FunctionMode::Strict);
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn concurrent_encodes_into_one_shared_graph() {
    let shared = SharedGraph::new();
    let encoder = GraphEncoder::new(registry());
    let queries: Vec<Query> = (0..32)
        .map(|i| {
            Query::select(
                Some(vec![ProjectionItem::var(format!("s{i}"))]),
                GraphPattern::basic(vec![TriplePattern::new(
                    TermPattern::var(format!("s{i}")),
                    TermPattern::iri(RDF_TYPE_IRI),
                    TermPattern::Constant(Constant::iri(format!("http://example.org/C{i}"))),
                )]),
            )
        })
        .collect();

    let roots: Vec<Node> = queries
        .par_iter()
        .map(|q| {
            let mut sink = shared.clone();
            encoder.encode(q, &mut sink).unwrap()
        })
        .collect();

    let mut unique = roots.clone();
    unique.sort_by_key(|n| n.to_string());
    unique.dedup();
    assert_eq!(unique.len(), roots.len());
    assert_eq!(shared.len(), 15 * queries.len());

    let decoder = GraphDecoder::new(registry());
    let snapshot = shared.snapshot();
    for (q, root) in queries.iter().zip(&roots) {
        assert_eq!(&decoder.decode(&*snapshot, root).unwrap(), q);
    }
}

#[test]
fn concurrent_encodes_claim_a_named_root_once() {
    let encoder = GraphEncoder::new(registry());
    for round in 0..50 {
        let shared = SharedGraph::new();
        let iri = format!("http://example.org/queries/{round}");
        let outcomes: Vec<Result<Node, EncodeError>> = (0..8)
            .into_par_iter()
            .map(|_| {
                let mut sink = shared.clone();
                encoder.encode_with_root(&person_query(), &iri, &mut sink)
            })
            .collect();

        let claimed = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(claimed, 1, "round {round}: {outcomes:?}");
        assert!(outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, EncodeError::NodeCollision { .. })));

        let snapshot = shared.snapshot();
        let root = Node::named(iri.as_str());
        assert_eq!(
            GraphDecoder::new(registry()).decode(&*snapshot, &root).unwrap(),
            person_query()
        );
    }
}

#[test]
fn named_root_must_be_fresh() {
    let mut graph = Graph::new();
    let root = GraphEncoder::new(registry())
        .encode_with_root(&person_query(), "http://example.org/queries/1", &mut graph)
        .unwrap();
    assert_eq!(root, Node::named("http://example.org/queries/1"));
    assert!(!graph.is_fresh(&root));

    let again = GraphEncoder::new(registry()).encode_with_root(
        &person_query(),
        "http://example.org/queries/1",
        &mut graph,
    );
    assert_eq!(again, Err(EncodeError::NodeCollision { node: root.clone() }));
    assert_eq!(
        GraphDecoder::new(registry()).decode(&graph, &root).unwrap(),
        person_query()
    );
}
