use proptest::prelude::*;
use spingraph_rdf::{Graph, GraphSink, Literal, Node, SharedGraph, Triple};

const MAX_SUBJECTS: usize = 8;
const MAX_PREDICATES: usize = 4;
const MAX_TRIPLES: usize = 60;

#[derive(Debug, Clone)]
struct GraphCase {
    triples: Vec<Triple>,
}

fn literal_strategy() -> impl Strategy<Value = Literal> {
    // Control characters, quotes, backslashes and non-ASCII text all need to
    // survive the text form.
    let lexical = || proptest::string::string_regex("[a-z \"\\\\\n\r\t\u{1}\u{7f}é€日😀]{0,10}").unwrap();
    prop_oneof![
        lexical().prop_map(Literal::simple),
        (lexical(), "[a-z]{2}").prop_map(|(l, tag)| Literal::lang(l, tag)),
        (lexical(), "[a-z]{1,5}")
            .prop_map(|(l, dt)| Literal::typed(l, format!("http://example.org/dt#{dt}"))),
        any::<u64>().prop_map(Literal::integer),
        any::<bool>().prop_map(Literal::boolean),
    ]
}

fn graph_case_strategy() -> impl Strategy<Value = GraphCase> {
    let subject = prop_oneof![
        (0usize..MAX_SUBJECTS).prop_map(|i| Node::named(format!("http://example.org/s{i}"))),
        (0usize..MAX_SUBJECTS).prop_map(|i| Node::anonymous(format!("b{i}"))),
    ];
    let predicate =
        (0usize..MAX_PREDICATES).prop_map(|i| Node::named(format!("http://example.org/p{i}")));
    let object = prop_oneof![
        (0usize..MAX_SUBJECTS).prop_map(|i| Node::named(format!("http://example.org/s{i}"))),
        (0usize..MAX_SUBJECTS).prop_map(|i| Node::anonymous(format!("b{i}"))),
        literal_strategy().prop_map(Node::Literal),
    ];
    prop::collection::vec(
        (subject, predicate, object).prop_map(|(s, p, o)| Triple::new(s, p, o)),
        0..=MAX_TRIPLES,
    )
    .prop_map(|triples| GraphCase { triples })
}

fn dedup_in_order(triples: &[Triple]) -> Vec<Triple> {
    let mut seen = std::collections::HashSet::new();
    triples
        .iter()
        .filter(|t| seen.insert((*t).clone()))
        .cloned()
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn graph_is_an_insertion_ordered_set(case in graph_case_strategy()) {
        let graph: Graph = case.triples.iter().cloned().collect();
        let expected = dedup_in_order(&case.triples);
        prop_assert_eq!(graph.len(), expected.len());
        prop_assert_eq!(graph.iter().cloned().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn subject_index_agrees_with_scan(case in graph_case_strategy()) {
        let graph: Graph = case.triples.iter().cloned().collect();
        for t in graph.iter() {
            let indexed: Vec<&Triple> = graph.subject_triples(&t.subject).collect();
            let scanned: Vec<&Triple> = graph.iter().filter(|u| u.subject == t.subject).collect();
            prop_assert_eq!(indexed, scanned);
            prop_assert!(graph.mentions(&t.object));
            prop_assert!(!graph.is_fresh(&t.predicate));
        }
        prop_assert!(graph.is_fresh(&Node::anonymous("never-used")));
    }

    #[test]
    fn ntriples_text_round_trips(case in graph_case_strategy()) {
        let graph: Graph = case.triples.iter().cloned().collect();
        let text = graph.to_ntriples();
        let reparsed = Graph::from_ntriples(&text).unwrap();
        prop_assert_eq!(
            reparsed.iter().cloned().collect::<Vec<_>>(),
            graph.iter().cloned().collect::<Vec<_>>()
        );
        prop_assert_eq!(reparsed.to_ntriples(), text);
    }

    #[test]
    fn shared_graph_batches_match_plain_graph(case in graph_case_strategy()) {
        let plain: Graph = case.triples.iter().cloned().collect();
        let mut shared = SharedGraph::new();
        let added = shared.insert_all(case.triples.clone());
        prop_assert_eq!(added, plain.len());
        prop_assert_eq!(shared.to_graph().to_ntriples(), plain.to_ntriples());
    }
}
