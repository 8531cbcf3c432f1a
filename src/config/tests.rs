use super::*;
use crate::error::ConfigError;

const CONFIG: &str = r#"
YetAnotherTree:
  input:
    - TupleB0/DecayTree
  keep:
    - Y_P.*
    - "Z_PY"
  drop:
    - Y_PT
  rename:
    Z_PY: z_py
  selection:
    Y_PX: "> 0"
  calculation:
    RandStuff: "abs_val(Y_PT)"
  headers:
    - TMath.h
  force_lowercase: true
Minimal:
  input: [T]
"#;

#[test]
fn test_load_config_preserves_order() {
    let config = GeneratorConfig::from_yaml_str(CONFIG).unwrap();
    let names: Vec<_> = config.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["YetAnotherTree", "Minimal"]);
}

#[test]
fn test_load_config_fields() {
    let config = GeneratorConfig::from_yaml_str(CONFIG).unwrap();
    let spec = config.get("YetAnotherTree").unwrap();
    assert_eq!(spec.input, vec!["TupleB0/DecayTree"]);
    assert_eq!(spec.keep.sources(), ["Y_P.*", "Z_PY"]);
    assert_eq!(spec.drop.sources(), ["Y_PT"]);
    assert_eq!(spec.rename.get("Z_PY").map(String::as_str), Some("z_py"));
    assert_eq!(spec.selection.get("Y_PX").map(String::as_str), Some("> 0"));
    assert_eq!(spec.headers, vec!["TMath.h"]);
    assert!(spec.force_lowercase);
}

#[test]
fn test_missing_fields_default_to_empty() {
    let config = GeneratorConfig::from_yaml_str(CONFIG).unwrap();
    let spec = config.get("Minimal").unwrap();
    assert!(spec.keep.is_empty());
    assert!(spec.drop.is_empty());
    assert!(spec.rename.is_empty());
    assert!(spec.selection.is_empty());
    assert!(spec.calculation.is_empty());
    assert!(spec.headers.is_empty());
    assert!(spec.user_headers.is_empty());
    assert!(!spec.force_lowercase);
}

#[test]
fn test_output_name_rename_then_lowercase() {
    let config = GeneratorConfig::from_yaml_str(CONFIG).unwrap();
    let spec = config.get("YetAnotherTree").unwrap();
    assert_eq!(spec.output_name("Z_PY"), "z_py");
    assert_eq!(spec.output_name("X_PX"), "x_px");
}

#[test]
fn test_output_name_without_lowercase() {
    let config = GeneratorConfig::from_yaml_str("Out:\n  rename: {A: Renamed}\n").unwrap();
    let spec = config.get("Out").unwrap();
    assert_eq!(spec.output_name("A"), "Renamed");
    assert_eq!(spec.output_name("B_PT"), "B_PT");
}

#[test]
fn test_invalid_pattern_is_load_error() {
    let err = GeneratorConfig::from_yaml_str("Out:\n  keep: ['(unclosed']\n").unwrap_err();
    match err {
        ConfigError::InvalidPattern {
            output_tree,
            field,
            pattern,
            ..
        } => {
            assert_eq!(output_tree, "Out");
            assert_eq!(field, "keep");
            assert_eq!(pattern, "(unclosed");
        }
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_unknown_field_is_rejected() {
    let err = GeneratorConfig::from_yaml_str("Out:\n  kep: [A]\n").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn test_load_missing_file_names_path() {
    let err = GeneratorConfig::load(std::path::Path::new("/nonexistent/babymaker.yml"))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/babymaker.yml"));
}

#[test]
fn test_schema_from_yaml_keeps_branch_order() {
    let schema = BranchSchema::from_yaml_str(
        "TupleB0/DecayTree:\n  Y_PT: double\n  Y_PX: double\n  Y_PY: float\n",
    )
    .unwrap();
    let tree = schema.tree("TupleB0/DecayTree").unwrap();
    let branches: Vec<_> = tree.keys().map(String::as_str).collect();
    assert_eq!(branches, vec!["Y_PT", "Y_PX", "Y_PY"]);
    assert_eq!(schema.datatype("TupleB0/DecayTree", "Y_PY"), Some("float"));
    assert_eq!(schema.datatype("TupleB0/DecayTree", "nope"), None);
    assert_eq!(schema.datatype("Ghost", "Y_PY"), None);
}

#[test]
fn test_schema_accepts_json() {
    let schema = BranchSchema::from_yaml_str(r#"{"T": {"A": "float", "B": "vector<float>"}}"#)
        .unwrap();
    assert_eq!(schema.datatype("T", "B"), Some("vector<float>"));
}

#[test]
fn test_schema_builder_matches_parsed() {
    let built = BranchSchema::new().with_tree("T", [("A", "float"), ("B", "float")]);
    let parsed = BranchSchema::from_yaml_str("T: {A: float, B: float}").unwrap();
    assert_eq!(built, parsed);
    assert_eq!(built.len(), 1);
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("babymaker.yml");
    std::fs::write(&path, CONFIG).unwrap();
    let config = GeneratorConfig::load(&path).unwrap();
    assert_eq!(config.len(), 2);
}
