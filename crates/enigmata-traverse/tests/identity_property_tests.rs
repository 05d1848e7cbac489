use enigmata_traverse::{parse_document, render_document, transform, Identity};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::from(n)),
        "[a-z.:@$#/ ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z_]{1,6}", inner), 0..6)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn identity_visitor_is_structure_preserving(doc in value_strategy()) {
        let out = transform(&mut Identity, doc.clone(), &()).unwrap();
        prop_assert_eq!(out, doc);
    }

    #[test]
    fn rendered_documents_parse_back(doc in value_strategy()) {
        let text = render_document(&doc);
        prop_assert_eq!(parse_document(&text).unwrap(), doc);
    }
}
