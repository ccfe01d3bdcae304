use oracle_core::schema::outbreak_analysis_schema;
use serde_json::Value;

/// Walk every object node and check `required` names exactly its properties.
fn assert_all_required(node: &Value, path: &str) {
    match node.get("type").and_then(Value::as_str) {
        Some("object") => {
            let props = node["properties"]
                .as_object()
                .unwrap_or_else(|| panic!("{path}: object without properties"));
            let mut required: Vec<&str> = node["required"]
                .as_array()
                .unwrap_or_else(|| panic!("{path}: object without required"))
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            let mut keys: Vec<&str> = props.keys().map(String::as_str).collect();
            required.sort();
            keys.sort();
            assert_eq!(required, keys, "{path}: required list incomplete");

            for (name, child) in props {
                assert_all_required(child, &format!("{path}.{name}"));
            }
        }
        Some("array") => assert_all_required(&node["items"], &format!("{path}[]")),
        Some("string") | Some("integer") => {}
        other => panic!("{path}: unexpected node type {other:?}"),
    }
}

#[test]
fn every_object_requires_all_properties() {
    assert_all_required(&outbreak_analysis_schema(), "$");
}

#[test]
fn top_level_declares_all_eight_fields() {
    let schema = outbreak_analysis_schema();
    let required = schema["required"].as_array().unwrap();
    assert_eq!(required.len(), 8);
    for field in [
        "alertLevel",
        "riskScore",
        "diseaseName",
        "location",
        "signals",
        "analysis",
        "recommendations",
        "predictiveModel",
    ] {
        assert!(required.iter().any(|v| v == field), "missing {field}");
    }
}

#[test]
fn alert_level_is_a_closed_enum() {
    let schema = outbreak_analysis_schema();
    let alert = &schema["properties"]["alertLevel"];
    assert_eq!(alert["type"], "string");
    assert_eq!(
        alert["enum"],
        serde_json::json!(["CRITICAL", "HIGH", "MODERATE", "LOW", "MINIMAL"])
    );
    assert_eq!(schema["properties"]["riskScore"]["type"], "integer");
}

#[test]
fn projection_keys_use_wire_names() {
    let schema = outbreak_analysis_schema();
    let props = schema["properties"]["predictiveModel"]["properties"]
        .as_object()
        .unwrap();
    assert!(props.contains_key("7dayProjection"));
    assert!(props.contains_key("30dayProjection"));
    assert_eq!(props["affectedRegions"]["items"]["type"], "string");
}
