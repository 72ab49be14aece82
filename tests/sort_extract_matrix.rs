use jsonpath_engine::{compile, search, JsonPathError};
use serde_json::json;

#[test]
fn sort_ascending_by_single_key() {
    let data = json!([{"price": 3}, {"price": 1}, {"price": 2}]);
    let compiled = compile("$[/(price)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"price": 1}), json!({"price": 2}), json!({"price": 3})]);
}

#[test]
fn sort_descending_with_tilde_prefix() {
    let data = json!([{"price": 3}, {"price": 1}, {"price": 2}]);
    let compiled = compile("$[/(~price)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"price": 3}), json!({"price": 2}), json!({"price": 1})]);
}

#[test]
fn sort_by_multiple_keys_breaks_ties() {
    let data = json!([
        {"category": "fiction", "title": "b"},
        {"category": "fiction", "title": "a"},
        {"category": "reference", "title": "c"}
    ]);
    let compiled = compile("$[/(category, title)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(
        out,
        vec![
            json!({"category": "fiction", "title": "a"}),
            json!({"category": "fiction", "title": "b"}),
            json!({"category": "reference", "title": "c"}),
        ]
    );
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let data = json!([
        {"k": 1, "id": "first"},
        {"k": 1, "id": "second"},
        {"k": 0, "id": "third"}
    ]);
    let compiled = compile("$[/(k)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(
        out,
        vec![
            json!({"k": 0, "id": "third"}),
            json!({"k": 1, "id": "first"}),
            json!({"k": 1, "id": "second"}),
        ]
    );
}

#[test]
fn sort_missing_key_orders_first() {
    let data = json!([{"p": 2}, {"other": true}, {"p": 1}]);
    let compiled = compile("$[/(p)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out[0], json!({"other": true}));
    assert_eq!(out[1], json!({"p": 1}));
    assert_eq!(out[2], json!({"p": 2}));
}

#[test]
fn sort_type_mismatch_across_elements_is_a_type_error() {
    let data = json!([{"p": 1}, {"p": "x"}]);
    let compiled = compile("$[/(p)]").unwrap();
    let err = search(&compiled, &data).unwrap_err();
    assert!(matches!(err, JsonPathError::Type(_)));
}

#[test]
fn sort_on_object_collects_values_into_an_array() {
    let data = json!({"a": {"p": 2}, "b": {"p": 1}});
    let compiled = compile("$[/(p)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"p": 1}), json!({"p": 2})]);
}

#[test]
fn extract_projects_requested_fields_only() {
    let data = json!([
        {"title": "A", "price": 1, "isbn": "x"},
        {"title": "B", "price": 2}
    ]);
    let compiled = compile("$[(title, price)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"title": "A", "price": 1}), json!({"title": "B", "price": 2})]);
}

#[test]
fn extract_silently_drops_missing_keys() {
    let data = json!([{"title": "A"}]);
    let compiled = compile("$[(title, missing)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"title": "A"})]);
}

#[test]
fn sort_then_extract_compose() {
    let data = json!([
        {"price": 3, "title": "c"},
        {"price": 1, "title": "a"},
        {"price": 2, "title": "b"}
    ]);
    let compiled = compile("$[/(price)][(title)]").unwrap();
    let out = search(&compiled, &data).unwrap();
    assert_eq!(out, vec![json!({"title": "a"}), json!({"title": "b"}), json!({"title": "c"})]);
}

#[test]
fn extract_and_sort_keys_accept_bracketed_quoted_names() {
    let compiled = compile("$.books[/('title')]").unwrap();
    let data = json!([{"title": "b"}, {"title": "a"}]);
    let doc = json!({"books": data});
    let out = search(&compiled, &doc).unwrap();
    assert_eq!(out, vec![json!({"title": "a"}), json!({"title": "b"})]);
}
