use dispatch_utils::{compress_obj, decompress_obj, dejsonify, jsonify, jsonify_pretty};
use serde_json::{json, Value};

#[test]
fn test_jsonify_sorts_keys_recursively() {
    let value = json!({"b": 1, "a": {"d": [ {"z": 1, "y": 2} ], "c": 3}});
    assert_eq!(
        jsonify(&value).unwrap(),
        r#"{"a":{"c":3,"d":[{"y":2,"z":1}]},"b":1}"#
    );
}

#[test]
fn test_jsonify_pretty_is_sorted_and_readable() {
    let value = json!({"orders": [{"weight": 2, "id": 1}], "capacity": 9});
    let pretty = jsonify_pretty(&value).unwrap();
    assert!(pretty.contains('\n'));
    assert!(pretty.find("capacity").unwrap() < pretty.find("orders").unwrap());
    assert!(pretty.find("\"id\"").unwrap() < pretty.find("weight").unwrap());
    assert_eq!(dejsonify::<Value>(&pretty).unwrap(), value);
}

#[test]
fn test_dejsonify_parses() {
    let value: Value = dejsonify(r#"{"capacity": 9}"#).unwrap();
    assert_eq!(value["capacity"], json!(9));
    assert!(dejsonify::<Value>("{not json").is_err());
}

#[test]
fn test_compressed_payload_restores_value() {
    let value = json!({"robot_id": "r1", "orders": [{"id": 1, "weight": 2, "value": 3}]});
    let bytes = compress_obj(&value).unwrap();
    let restored: Value = decompress_obj(&bytes).unwrap();
    assert_eq!(restored, value);
    assert!(decompress_obj::<Value>(b"plainly not zlib").is_err());
}
