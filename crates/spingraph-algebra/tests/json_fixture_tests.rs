use std::path::PathBuf;

use spingraph_algebra::{
    query_digest_v1, Expression, GraphPattern, OperatorKind, OrderDirection, ProjectionItem,
    Query, QueryForm,
};

fn load(name: &str) -> Query {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name);
    let text = std::fs::read_to_string(&path).expect("read demo");
    serde_json::from_str(&text).expect("parse demo")
}

#[test]
fn demo_select_parses_into_the_expected_tree() {
    let q = load("select_person.json");

    let projection = match &q.form {
        QueryForm::Select {
            projection: Some(items),
        } => items.clone(),
        other => panic!("unexpected form {other:?}"),
    };
    assert_eq!(projection[0], ProjectionItem::var("s"));
    match &projection[1] {
        ProjectionItem::Expression { expression, alias } => {
            assert_eq!(alias.name(), "len");
            assert_eq!(
                expression,
                &Expression::call("STRLEN", vec![Expression::var("name")])
            );
        }
        other => panic!("unexpected projection {other:?}"),
    }

    match q.pattern.as_ref() {
        Some(GraphPattern::Filter {
            pattern,
            expression: Expression::Operator { op, operands },
        }) => {
            assert_eq!(*op, OperatorKind::Gt);
            assert_eq!(operands.len(), 2);
            assert!(matches!(**pattern, GraphPattern::BasicPattern { ref triples } if triples.len() == 2));
        }
        other => panic!("unexpected pattern {other:?}"),
    }

    assert_eq!(q.modifiers.limit, Some(10));
    assert_eq!(q.modifiers.order_by[0].direction, OrderDirection::Descending);
    assert!(q.dataset.is_empty());
    assert!(q.values.is_none());
}

#[test]
fn digest_ignores_json_layout() {
    let q = load("select_person.json");
    let compact = serde_json::to_string(&q).unwrap();
    let pretty = serde_json::to_string_pretty(&q).unwrap();
    let a: Query = serde_json::from_str(&compact).unwrap();
    let b: Query = serde_json::from_str(&pretty).unwrap();
    assert_eq!(query_digest_v1(&a).unwrap(), query_digest_v1(&b).unwrap());
    assert_eq!(query_digest_v1(&a).unwrap(), query_digest_v1(&q).unwrap());
}
