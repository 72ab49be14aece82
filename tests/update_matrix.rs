use jsonpath_engine::{compile, update, Replacement};
use serde_json::json;

#[test]
fn update_replaces_every_matched_leaf() {
    let compiled = compile("$.store.book[*].price").unwrap();
    let mut doc = json!({
        "store": {"book": [{"price": 10}, {"price": 20}, {"price": 30}]}
    });
    update(&compiled, &mut doc, Replacement::value(0)).unwrap();
    assert_eq!(
        doc,
        json!({"store": {"book": [{"price": 0}, {"price": 0}, {"price": 0}]}})
    );
}

#[test]
fn update_transform_receives_the_prior_value() {
    let compiled = compile("$.prices[*]").unwrap();
    let mut doc = json!({"prices": [1, 2, 3]});
    update(&compiled, &mut doc, Replacement::transform(|old| {
        json!(old.as_i64().unwrap_or(0) * 10)
    }))
    .unwrap();
    assert_eq!(doc, json!({"prices": [10, 20, 30]}));
}

#[test]
fn update_through_a_filter_selector() {
    let compiled = compile("$.book[?(@.price < 10)].category").unwrap();
    let mut doc = json!({
        "book": [
            {"category": "reference", "price": 8.95},
            {"category": "fiction", "price": 20}
        ]
    });
    update(&compiled, &mut doc, Replacement::value("cheap")).unwrap();
    assert_eq!(doc["book"][0]["category"], json!("cheap"));
    assert_eq!(doc["book"][1]["category"], json!("fiction"));
}

#[test]
fn update_on_bare_root_replaces_the_whole_document() {
    let compiled = compile("$").unwrap();
    let mut doc = json!({"a": 1});
    update(&compiled, &mut doc, Replacement::value(json!({"b": 2}))).unwrap();
    assert_eq!(doc, json!({"b": 2}));
}

#[test]
fn update_with_no_matches_leaves_document_untouched() {
    let compiled = compile("$.nonexistent.path").unwrap();
    let mut doc = json!({"a": 1});
    update(&compiled, &mut doc, Replacement::value(0)).unwrap();
    assert_eq!(doc, json!({"a": 1}));
}

#[test]
fn update_skips_a_match_whose_parent_was_reshaped_by_an_earlier_update() {
    // `$..*` yields both a container match ($.a) and a descendant match ($.a.b).
    // Replacing the container with a scalar first leaves the descendant's parent
    // locator pointing into a value that is no longer an object; that later write
    // must be skipped rather than panicking.
    let compiled = compile("$..*").unwrap();
    let mut doc = json!({"a": {"b": 1}});
    update(&compiled, &mut doc, Replacement::value("X")).unwrap();
    assert_eq!(doc, json!({"a": "X"}));
}

#[test]
fn update_on_array_index_out_of_original_bounds_is_silently_skipped() {
    let compiled = compile("$[5]").unwrap();
    let mut doc = json!([1, 2, 3]);
    update(&compiled, &mut doc, Replacement::value(0)).unwrap();
    assert_eq!(doc, json!([1, 2, 3]));
}
