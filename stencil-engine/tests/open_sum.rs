//! Structural open sums: inclusion, probes, shadowing.

mod common;

use serde_json::json;
use stencil_engine::{Derive, EvalError, Value};
use stencil_reflect::raw::{RawBody, RawDecl, RawField, RawPolyCase, RawTypeExpr};

use common::{checker, derive_and_link, of_json, of_json_by_match, to_json};

fn open_sum(name: &str, cases: Vec<RawPolyCase>) -> RawDecl {
    RawDecl::new(name, RawBody::Alias(RawTypeExpr::closed_polyvariant(cases)))
}

fn color_decls() -> Vec<RawDecl> {
    vec![
        open_sum(
            "other_color",
            vec![
                RawPolyCase::construct("Cyan", vec![]),
                RawPolyCase::construct("Magenta", vec![]),
            ],
        ),
        open_sum(
            "color",
            vec![
                RawPolyCase::construct("Red", vec![]),
                RawPolyCase::construct("Green", vec![]),
                RawPolyCase::inherit("other_color", vec![]),
            ],
        ),
    ]
}

#[test]
fn test_inclusion_encodes_like_the_included_sum() {
    let linked = derive_and_link(&to_json(), &color_decls());
    let direct = linked
        .call("to_json_other_color", vec![Value::poly("Cyan", vec![])])
        .unwrap();
    let via_color = linked
        .call("to_json_color", vec![Value::poly("Cyan", vec![])])
        .unwrap();
    assert_eq!(direct, via_color);
    assert_eq!(via_color.as_json().unwrap(), &json!("Cyan"));
}

#[test]
fn test_inclusion_decodes_inherited_tags() {
    let linked = derive_and_link(&of_json(), &color_decls());
    let own = linked
        .call("of_json_color", vec![Value::Json(json!("Red"))])
        .unwrap();
    assert_eq!(own, Value::poly("Red", vec![]));
    let inherited = linked
        .call("of_json_color", vec![Value::Json(json!("Magenta"))])
        .unwrap();
    assert_eq!(inherited, Value::poly("Magenta", vec![]));
}

#[test]
fn test_probe_returns_options() {
    let linked = derive_and_link(&of_json(), &color_decls());
    let hit = linked
        .call("of_json_poly_color", vec![Value::Json(json!("Green"))])
        .unwrap();
    assert_eq!(hit, Value::some(Value::poly("Green", vec![])));
    let miss = linked
        .call("of_json_poly_color", vec![Value::Json(json!("Blue"))])
        .unwrap();
    assert_eq!(miss, Value::none());
}

#[test]
fn test_unknown_tag_is_decode_error_not_fault() {
    let linked = derive_and_link(&of_json(), &color_decls());
    let err = linked
        .call("of_json_color", vec![Value::Json(json!("Blue"))])
        .unwrap_err();
    assert!(matches!(err, EvalError::Decode(msg) if msg.contains("color")));
}

#[test]
fn test_payload_constructs_round_trip() {
    let decls = vec![open_sum(
        "msg",
        vec![
            RawPolyCase::construct("Ping", vec![]),
            RawPolyCase::construct("Text", vec![RawTypeExpr::name("string", vec![])]),
        ],
    )];
    let value = Value::poly("Text", vec![Value::str("hi")]);
    let encoded = derive_and_link(&to_json(), &decls)
        .call("to_json_msg", vec![value.clone()])
        .unwrap();
    assert_eq!(encoded.as_json().unwrap(), &json!(["Text", "hi"]));
    let decoded = derive_and_link(&of_json(), &decls)
        .call("of_json_msg", vec![encoded])
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_first_matching_entry_wins_on_shadowed_tag() {
    // "Dup" appears both locally (int payload) and in the included sum
    // (string payload). Declared order decides: the local entry comes first,
    // so encoding routes to the local arm.
    let decls = vec![
        open_sum(
            "other",
            vec![RawPolyCase::construct(
                "Dup",
                vec![RawTypeExpr::name("string", vec![])],
            )],
        ),
        open_sum(
            "main",
            vec![
                RawPolyCase::construct("Dup", vec![RawTypeExpr::name("int", vec![])]),
                RawPolyCase::inherit("other", vec![]),
            ],
        ),
    ];
    let encoded = derive_and_link(&to_json(), &decls)
        .call("to_json_main", vec![Value::poly("Dup", vec![Value::Int(1)])])
        .unwrap();
    assert_eq!(encoded.as_json().unwrap(), &json!(["Dup", 1]));

    let decoded = derive_and_link(&of_json(), &decls)
        .call("of_json_main", vec![Value::Json(json!(["Dup", 2]))])
        .unwrap();
    assert_eq!(decoded, Value::poly("Dup", vec![Value::Int(2)]));
}

#[test]
fn test_external_inclusion_never_swallows_local_tags() {
    // "external" is not in the batch, so its tag set is unknowable at
    // generation time. The inclusion arm still must not capture tags the
    // sum declares itself, even when the inclusion comes first.
    let decls = vec![open_sum(
        "main",
        vec![
            RawPolyCase::inherit("external", vec![]),
            RawPolyCase::construct("Mine", vec![]),
        ],
    )];
    let items = to_json().derive_batch(&decls).unwrap();
    let linked = checker()
        .native("to_json_external", |args| match &args[0] {
            Value::Poly { tag, .. } => Ok(Value::Json(json!(["external", tag]))),
            other => Err(EvalError::Type(format!(
                "expected an open-sum value, got {other:?}"
            ))),
        })
        .link(&items)
        .unwrap();
    let local = linked
        .call("to_json_main", vec![Value::poly("Mine", vec![])])
        .unwrap();
    assert_eq!(local.as_json().unwrap(), &json!(["Mine"]));
    let external = linked
        .call("to_json_main", vec![Value::poly("Theirs", vec![])])
        .unwrap();
    assert_eq!(external.as_json().unwrap(), &json!(["external", "Theirs"]));
}

#[test]
fn test_inclusion_first_delegates_before_local_entries() {
    let decls = vec![
        open_sum(
            "other",
            vec![RawPolyCase::construct(
                "Dup",
                vec![RawTypeExpr::name("string", vec![])],
            )],
        ),
        open_sum(
            "main",
            vec![
                RawPolyCase::inherit("other", vec![]),
                RawPolyCase::construct("Dup", vec![RawTypeExpr::name("int", vec![])]),
            ],
        ),
    ];
    let decoded = derive_and_link(&of_json(), &decls)
        .call("of_json_main", vec![Value::Json(json!(["Dup", "x"]))])
        .unwrap();
    assert_eq!(decoded, Value::poly("Dup", vec![Value::str("x")]));
}

#[test]
fn test_two_inclusions_probe_in_order() {
    let decls = vec![
        open_sum("a", vec![RawPolyCase::construct("A", vec![])]),
        open_sum("b", vec![RawPolyCase::construct("B", vec![])]),
        open_sum(
            "both",
            vec![
                RawPolyCase::inherit("a", vec![]),
                RawPolyCase::inherit("b", vec![]),
            ],
        ),
    ];
    let linked = derive_and_link(&of_json(), &decls);
    assert_eq!(
        linked
            .call("of_json_both", vec![Value::Json(json!("B"))])
            .unwrap(),
        Value::poly("B", vec![])
    );
    assert_eq!(
        linked
            .call("of_json_both", vec![Value::Json(json!("A"))])
            .unwrap(),
        Value::poly("A", vec![])
    );
}

#[test]
fn test_match_decoder_preserves_interleaving() {
    let decls = vec![
        open_sum("base", vec![RawPolyCase::construct("B", vec![])]),
        open_sum(
            "full",
            vec![
                RawPolyCase::construct("F1", vec![]),
                RawPolyCase::inherit("base", vec![]),
                RawPolyCase::construct("F2", vec![]),
            ],
        ),
    ];
    let linked = derive_and_link(&of_json_by_match(), &decls);
    for tag in ["F1", "B", "F2"] {
        assert_eq!(
            linked
                .call("of_json_full", vec![Value::Json(json!(tag))])
                .unwrap(),
            Value::poly(tag, vec![]),
        );
    }
}

#[test]
fn test_inline_open_sum_literal_needs_no_probe_unit() {
    let decls = vec![RawDecl::new(
        "wrapper",
        RawBody::Record(vec![RawField::new(
            "state",
            RawTypeExpr::closed_polyvariant(vec![
                RawPolyCase::construct("On", vec![]),
                RawPolyCase::construct("Off", vec![]),
            ]),
        )]),
    )];
    let items = of_json().derive_batch(&decls).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ident(), "of_json_wrapper");
    let linked = checker().link(&items).unwrap();
    let decoded = linked
        .call(
            "of_json_wrapper",
            vec![Value::Json(json!({"state": "Off"}))],
        )
        .unwrap();
    assert_eq!(
        decoded,
        Value::record(vec![("state", Value::poly("Off", vec![]))])
    );
}

#[test]
fn test_bare_open_sum_expression() {
    let raw = RawTypeExpr::closed_polyvariant(vec![
        RawPolyCase::construct("Yes", vec![]),
        RawPolyCase::construct("No", vec![]),
    ]);
    let items = of_json().derive_expr(&raw).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].ident(), "of_json");
    let linked = checker().link(&items).unwrap();
    assert_eq!(
        linked
            .call("of_json", vec![Value::Json(json!("No"))])
            .unwrap(),
        Value::poly("No", vec![])
    );
}
