use casewise::datatype::Value;
use casewise::schema::{Measure, Schema, Variable, VariableType};
use casewise::select::{RandomSampleConfig, RangeConfig};

#[test]
fn schema_rejects_duplicate_names() {
    let err = Schema::new(vec![
        Variable::new("age", 0, VariableType::Numeric, Measure::Scale),
        Variable::new("age", 1, VariableType::Numeric, Measure::Scale),
    ])
    .unwrap_err();
    assert!(format!("{err}").contains("duplicate variable name"));
}

#[test]
fn schema_rejects_duplicate_column_indices() {
    let err = Schema::new(vec![
        Variable::new("age", 0, VariableType::Numeric, Measure::Scale),
        Variable::new("height", 0, VariableType::Numeric, Measure::Scale),
    ])
    .unwrap_err();
    assert!(format!("{err}").contains("duplicate column index"));
}

#[test]
fn schema_rejects_empty_names() {
    let err = Schema::new(vec![Variable::new(
        "",
        0,
        VariableType::Numeric,
        Measure::Scale,
    )])
    .unwrap_err();
    assert!(format!("{err}").contains("empty"));
}

#[test]
fn variable_wire_shape() {
    let variable: Variable = serde_json::from_str(
        r#"{"name": "age", "columnIndex": 2, "type": "numeric", "measure": "scale"}"#,
    )
    .unwrap();
    assert_eq!(variable.name, "age");
    assert_eq!(variable.column_index, 2);
    assert_eq!(variable.variable_type, VariableType::Numeric);
    assert_eq!(variable.measure, Measure::Scale);
}

#[test]
fn row_wire_shape() {
    let row: Vec<Value> = serde_json::from_str(r#"[30, "M", null, true]"#).unwrap();
    assert_eq!(
        row,
        vec![
            Value::Number(30.0),
            Value::from("M"),
            Value::Missing,
            Value::Bool(true)
        ]
    );
}

#[test]
fn sample_config_wire_shape() {
    let approximate: RandomSampleConfig =
        serde_json::from_str(r#"{"sampleType": "approximate", "percentage": 50}"#).unwrap();
    match approximate {
        RandomSampleConfig::Approximate { percentage } => assert_eq!(percentage, 50.0),
        other => panic!("unexpected config: {other:?}"),
    }
    let exact: RandomSampleConfig =
        serde_json::from_str(r#"{"sampleType": "exact", "exactCount": 10, "fromFirstCount": 40}"#)
            .unwrap();
    match exact {
        RandomSampleConfig::Exact {
            exact_count,
            from_first_count,
        } => {
            assert_eq!(exact_count, 10);
            assert_eq!(from_first_count, Some(40));
        }
        other => panic!("unexpected config: {other:?}"),
    }
}

#[test]
fn range_config_wire_shape() {
    let range: RangeConfig =
        serde_json::from_str(r#"{"firstCase": "2", "lastCase": "4"}"#).unwrap();
    assert_eq!(range.first_case.as_deref(), Some("2"));
    assert_eq!(range.last_case.as_deref(), Some("4"));
    let open: RangeConfig = serde_json::from_str(r#"{}"#).unwrap();
    assert!(open.first_case.is_none());
    assert!(open.last_case.is_none());
}

#[test]
fn value_map_covers_all_variables() {
    let schema = Schema::new(vec![
        Variable::new("a", 0, VariableType::Numeric, Measure::Scale),
        Variable::new("b", 2, VariableType::Text, Measure::Nominal),
    ])
    .unwrap();
    let row = vec![Value::Number(1.0), Value::from("skipped"), Value::from("x")];
    let map = schema.value_map(&row);
    assert_eq!(map.get("a"), Some(&&Value::Number(1.0)));
    assert_eq!(map.get("b"), Some(&&Value::from("x")));
    assert!(map.get("skipped").is_none());
}
