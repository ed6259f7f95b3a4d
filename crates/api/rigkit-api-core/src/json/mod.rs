use serde_json::{json, Value as JsonValue};
use thiserror::Error;

use crate::value::IDENTITY_MATRIX;
use crate::Value;

/// Errors produced while normalizing graph or stage JSON.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("graph json parse error: {0}")]
    GraphParse(String),
    #[error("value json error: {0}")]
    Value(#[from] serde_json::Error),
}

fn numbers(arr: &[JsonValue]) -> Option<Vec<f64>> {
    arr.iter().map(|x| x.as_f64()).collect()
}

fn translation_json(t: &[f64]) -> JsonValue {
    let mut m = IDENTITY_MATRIX;
    m[12..15].copy_from_slice(&t[..3]);
    json!({ "type": "matrix", "data": m.to_vec() })
}

/// Rows of a row-vector host matrix (translation in the last row) flatten directly into our
/// column-major layout.
fn rows_json(rows: &[JsonValue]) -> Option<JsonValue> {
    if rows.len() != 4 {
        return None;
    }
    let mut flat = Vec::with_capacity(16);
    for row in rows {
        let row = numbers(row.as_array()?)?;
        if row.len() != 4 {
            return None;
        }
        flat.extend(row);
    }
    Some(json!({ "type": "matrix", "data": flat }))
}

/// Normalize shorthand value JSON into the canonical `{ "type": ..., "data": ... }` form
/// understood by the serde derives on [`Value`].
///
/// Accepted shorthands:
/// - `1.5`, `true`
/// - `[x, y, z]` (vec3), sixteen numbers (column-major matrix), four rows of four (host rows)
/// - `{ "float": .. }`, `{ "bool": .. }`, `{ "vec3": [..] }`, `{ "matrix": [..] }`,
///   `{ "translate": [x, y, z] }`, `{ "rows": [[..], ..] }`
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => json!({ "type": "float", "data": n }),
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::Array(arr) => {
            if let Some(nums) = numbers(&arr) {
                return match nums.len() {
                    3 => json!({ "type": "vec3", "data": nums }),
                    16 => json!({ "type": "matrix", "data": nums }),
                    _ => JsonValue::Array(arr),
                };
            }
            rows_json(&arr).unwrap_or(JsonValue::Array(arr))
        }
        JsonValue::Object(obj) => {
            if obj.contains_key("type") && obj.contains_key("data") {
                return JsonValue::Object(obj);
            }
            if let Some(f) = obj.get("float").and_then(|x| x.as_f64()) {
                return json!({ "type": "float", "data": f });
            }
            if let Some(b) = obj.get("bool").and_then(|x| x.as_bool()) {
                return json!({ "type": "bool", "data": b });
            }
            if let Some(arr) = obj.get("vec3").and_then(|x| x.as_array()) {
                return json!({ "type": "vec3", "data": arr });
            }
            if let Some(arr) = obj.get("matrix").and_then(|x| x.as_array()) {
                return json!({ "type": "matrix", "data": arr });
            }
            if let Some(t) = obj
                .get("translate")
                .and_then(|x| x.as_array())
                .and_then(|a| numbers(a))
                .filter(|t| t.len() == 3)
            {
                return translation_json(&t);
            }
            if let Some(rows) = obj
                .get("rows")
                .and_then(|x| x.as_array())
                .and_then(|rows| rows_json(rows))
            {
                return rows;
            }
            JsonValue::Object(obj)
        }
        other => other,
    }
}

/// Normalize then deserialize shorthand JSON into a [`Value`].
pub fn parse_value(value: JsonValue) -> Result<Value, JsonError> {
    Ok(serde_json::from_value(normalize_value_json(value))?)
}

/// Normalize a graph specification JSON value in-place: lower-case node types and expand
/// shorthand `params.value` entries.
pub fn normalize_graph_spec_value(root: &mut JsonValue) {
    let Some(nodes) = root.get_mut("nodes").and_then(|n| n.as_array_mut()) else {
        return;
    };
    for node in nodes.iter_mut() {
        if let Some(kind) = node.get("kind").cloned() {
            if node.get("type").is_none() {
                node["type"] = kind;
            }
        }

        if let Some(ty) = node
            .get("type")
            .and_then(|v| v.as_str())
            .map(|s| s.to_lowercase())
        {
            node["type"] = JsonValue::String(ty);
        }

        if let Some(value) = node
            .get_mut("params")
            .and_then(|p| p.as_object_mut())
            .and_then(|params| params.get_mut("value"))
        {
            let taken = std::mem::take(value);
            *value = normalize_value_json(taken);
        }
    }
}

/// Parse a graph JSON string and normalize it.
pub fn normalize_graph_spec_json(json_str: &str) -> Result<JsonValue, JsonError> {
    let mut root: JsonValue =
        serde_json::from_str(json_str).map_err(|e| JsonError::GraphParse(e.to_string()))?;
    normalize_graph_spec_value(&mut root);
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_triples_become_vec3() {
        let parsed = parse_value(json!([1, 2, 3])).unwrap();
        assert_eq!(parsed, Value::vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn translate_shorthand_builds_matrix() {
        let parsed = parse_value(json!({ "translate": [0, 10, 0] })).unwrap();
        assert_eq!(parsed, Value::translation(0.0, 10.0, 0.0));
    }

    #[test]
    fn host_rows_keep_translation() {
        let parsed = parse_value(json!({
            "rows": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [3, 4, 5, 1]]
        }))
        .unwrap();
        assert_eq!(parsed, Value::translation(3.0, 4.0, 5.0));
    }

    #[test]
    fn canonical_form_passes_through() {
        let canonical = json!({ "type": "float", "data": 2.5 });
        assert_eq!(normalize_value_json(canonical.clone()), canonical);
    }

    #[test]
    fn graph_spec_normalization_lowercases_type() {
        let mut root = json!({
            "nodes": [
                { "id": "c", "kind": "Constant", "params": { "value": 2.0 } }
            ]
        });
        normalize_graph_spec_value(&mut root);
        assert_eq!(root["nodes"][0]["type"], "constant");
        assert_eq!(root["nodes"][0]["params"]["value"]["type"], "float");
    }
}
