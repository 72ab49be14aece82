use jsonpath_engine::{compile, parse, Mode, ParseOutput};
use serde_json::json;

fn paths_for(expr: &str, doc: &serde_json::Value) -> Vec<String> {
    let compiled = compile(expr).unwrap();
    parse(&compiled, doc, Mode::Path)
        .unwrap()
        .into_iter()
        .map(|o| match o {
            ParseOutput::Path(p) => p,
            ParseOutput::Value(_) => panic!("expected Path output"),
        })
        .collect()
}

#[test]
fn root_canonicalizes_to_bare_dollar() {
    let doc = json!({"a": 1});
    assert_eq!(paths_for("$", &doc), vec!["$".to_string()]);
}

#[test]
fn dotted_and_bracketed_access_canonicalize_the_same_way() {
    let doc = json!({"store": {"book": [{"title": "A"}]}});
    let dotted = paths_for("$.store.book[0].title", &doc);
    let bracketed = paths_for("$['store']['book'][0]['title']", &doc);
    assert_eq!(dotted, bracketed);
    assert_eq!(dotted, vec!["$['store']['book'][0]['title']".to_string()]);
}

#[test]
fn wildcard_over_an_array_yields_one_path_per_element() {
    let doc = json!({"items": ["x", "y", "z"]});
    let paths = paths_for("$.items[*]", &doc);
    assert_eq!(
        paths,
        vec![
            "$['items'][0]".to_string(),
            "$['items'][1]".to_string(),
            "$['items'][2]".to_string(),
        ]
    );
}

#[test]
fn recursive_descent_paths_reflect_actual_document_depth() {
    let doc = json!({"a": {"x": 1}, "b": [{"x": 2}]});
    let mut paths = paths_for("$..x", &doc);
    paths.sort();
    assert_eq!(paths, vec!["$['a']['x']".to_string(), "$['b'][0]['x']".to_string()]);
}

#[test]
fn keys_needing_escapes_round_trip_through_quoting() {
    let doc = json!({"a'b\\c": 1});
    let paths = paths_for("$.*", &doc);
    assert_eq!(paths, vec!["$['a\\'b\\\\c']".to_string()]);
}

#[test]
fn every_canonical_path_re_selects_its_own_value() {
    let doc = json!({"store": {"book": [{"price": 1}, {"price": 2}]}});
    let values_expr = compile("$..price").unwrap();
    let values = jsonpath_engine::search(&values_expr, &doc).unwrap();
    let paths = paths_for("$..price", &doc);
    assert_eq!(values.len(), paths.len());
    for (path, value) in paths.iter().zip(values.iter()) {
        let reselected = compile(path).unwrap();
        assert_eq!(&jsonpath_engine::search(&reselected, &doc).unwrap()[0], value);
    }
}
