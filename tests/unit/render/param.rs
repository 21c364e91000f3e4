use super::*;
use std::collections::hash_map::DefaultHasher;

fn hash_of(v: &ParamValue) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

fn is_int(v: &ParamValue) -> bool {
    matches!(v, ParamValue::Int(_))
}

fn is_positive(v: &ParamValue) -> bool {
    v.as_int().is_some_and(|n| n > 0)
}

const WIDTH: RenderParam = RenderParam::checked(
    "width",
    ParamValue::Int(1),
    Some((is_int, "width must be an int")),
    Some((is_positive, "width must be positive")),
);

#[test]
fn type_check_runs_before_value_check() {
    let err = WIDTH.check("Box", &ParamValue::str("wide")).unwrap_err();
    assert!(matches!(err, TesseraError::Param(_)));
    assert!(err.to_string().contains("Box.width: width must be an int"));

    let err = WIDTH.check("Box", &ParamValue::Int(0)).unwrap_err();
    assert!(err.to_string().contains("width must be positive"));

    assert!(WIDTH.check("Box", &ParamValue::Int(3)).is_ok());
}

#[test]
fn unchecked_param_accepts_anything() {
    let p = RenderParam::new("any", ParamValue::None);
    assert!(p.check("X", &ParamValue::Float(1.5)).is_ok());
    assert!(p.check("X", &ParamValue::None).is_ok());
}

#[test]
fn floats_compare_and_hash_by_bits() {
    let a = ParamValue::Float(f64::NAN);
    let b = ParamValue::Float(f64::NAN);
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_ne!(ParamValue::Float(0.0), ParamValue::Float(-0.0));
}

#[test]
fn borrowed_and_owned_strings_are_equal() {
    let a = ParamValue::str("x");
    let b = ParamValue::from(String::from("x"));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn typed_extraction() {
    assert!(bool::try_from(&ParamValue::Bool(true)).unwrap());
    assert_eq!(u32::try_from(&ParamValue::Int(7)).unwrap(), 7);
    assert!(u32::try_from(&ParamValue::Int(-1)).is_err());
    assert_eq!(char::try_from(&ParamValue::str("#")).unwrap(), '#');
    assert!(char::try_from(&ParamValue::str("##")).is_err());
    assert_eq!(f64::try_from(&ParamValue::Int(2)).unwrap(), 2.0);
}

#[test]
fn json_values_map_to_variants() {
    let v: Vec<ParamValue> = serde_json::from_str(r#"[null, true, 3, 2.5, "s"]"#).unwrap();
    assert_eq!(
        v,
        vec![
            ParamValue::None,
            ParamValue::Bool(true),
            ParamValue::Int(3),
            ParamValue::Float(2.5),
            ParamValue::str("s"),
        ]
    );
}
