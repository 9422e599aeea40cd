//! End-to-end scenarios through the public API.

use std::sync::Arc;

use paramguard_core::prelude::*;
use paramguard_core::{
    ConfigurationErrorKind, ConversionError, EnumDefinition, EnumType, ParseError, TypeDefinition,
    TypeRegistry, ValidationError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// NOTATION
// ============================================================================

#[derive(Debug, Default)]
struct Dummy {
    params: Vec<String>,
}

impl CustomConstraint for Dummy {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn supports(&self, _data_type: ParameterDataType) -> bool {
        true
    }

    fn set_parameters(
        &mut self,
        params: &[String],
        _data_type: ParameterDataType,
    ) -> Result<(), ConfigurationErrorKind> {
        self.params = params.to_vec();
        Ok(())
    }

    fn parameters(&self) -> Vec<String> {
        self.params.clone()
    }
}

#[test]
fn custom_constraint_keeps_seven_parameters() {
    let parser = ConstraintParser::new().register("Dummy", || Box::new(Dummy::default()));
    let list = parser
        .parse(
            "[Dummy(abc,'def','g,hi', jkl,'m''no',pqr,'s tu')]",
            ParameterDataType::String,
        )
        .unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(
        list[0].parameters(),
        vec!["abc", "def", "g,hi", "jkl", "m'no", "pqr", "s tu"]
    );

    // custom constraints without a validate override never fail
    let results = ParameterValidator::default()
        .validate(
            Some(&Value::String("x".into())),
            ParameterDataType::String,
            &list,
            "code",
            None,
        )
        .unwrap();
    assert!(results.is_empty());
}

#[rstest]
#[case("[MinValue(18)][MaxValue(88)]", ParameterDataType::Int32)]
#[case("[Null][Encrypted][Password][Length(2)]", ParameterDataType::String)]
#[case("[CharSet(Ascii)][Regex(^[a-z]+$)]", ParameterDataType::String)]
#[case("[Values(Int32,Flags,ReadOnly=1,Hidden=2,System=4)]", ParameterDataType::Enum)]
#[case("[AllowedScheme(http,https)]", ParameterDataType::Uri)]
#[case("[MinValue(1.5)][DecimalPlaces(2)]", ParameterDataType::Decimal)]
fn canonical_text_round_trips(#[case] text: &str, #[case] data_type: ParameterDataType) {
    let list = parse(text, data_type).unwrap();
    assert_eq!(concat_constraints(Some(&list)).as_deref(), Some(text));
    assert_eq!(parse(list.to_string().as_str(), data_type).unwrap(), list);
}

#[test]
fn concatenation_ignores_separators() {
    let a = parse("[Null] [Encrypted]\n\t[Password] [Length(2)]", ParameterDataType::String).unwrap();
    let b = parse("[Null][Encrypted][Password][Length(2)]", ParameterDataType::String).unwrap();
    assert_eq!(a, b);
    assert_eq!(concat_constraints(None), None);
}

#[test]
fn blank_brackets_and_unknown_names() {
    assert_eq!(
        parse("[   ]", ParameterDataType::String).unwrap_err(),
        ParseError::EmptyName { position: 4 }
    );
    assert!(matches!(
        parse("[YouThinkYouKnowMe]", ParameterDataType::Int32),
        Err(ParseError::UnknownConstraintName { ref name, .. }) if name == "YouThinkYouKnowMe"
    ));
}

#[test]
fn negative_length_is_a_configuration_error() {
    let err = parse("[Length(-1)]", ParameterDataType::String).unwrap_err();
    let ParseError::Configuration { source, .. } = err else {
        panic!("expected a configuration error");
    };
    assert_eq!(
        source.kind,
        ConfigurationErrorKind::NegativeNotAllowed {
            index: 0,
            value: "-1".into()
        }
    );
}

#[rstest]
#[case("[MaxValue(42)]", ParameterDataType::String)]
#[case("[Uppercase]", ParameterDataType::Int32)]
#[case("[Password]", ParameterDataType::Int32)]
#[case("[AllowedScheme(http)]", ParameterDataType::String)]
fn constraints_are_gated_by_data_type(#[case] text: &str, #[case] data_type: ParameterDataType) {
    let err = parse(text, data_type).unwrap_err();
    assert_eq!(err.code(), "CFG:DATA_TYPE_NOT_SUPPORTED");
}

// ============================================================================
// VALIDATION
// ============================================================================

#[rstest]
#[case(17, &["Age must be at least 18."])]
#[case(18, &[])]
#[case(88, &[])]
#[case(89, &["Age must be at most 88."])]
fn bounds_end_to_end(#[case] age: i32, #[case] expected: &[&str]) {
    let constraints = parse("[MinValue(18)][MaxValue(88)][Step(10)]", ParameterDataType::Int32).unwrap();
    let results = ParameterValidator::default()
        .validate(
            Some(&Value::Int32(age)),
            ParameterDataType::Int32,
            &constraints,
            "age",
            Some("Age"),
        )
        .unwrap();

    let messages: Vec<&str> = results.iter().map(ParameterValidationResult::message).collect();
    assert_eq!(messages, expected);
    for result in &results {
        assert_eq!(result.member_name(), "age");
        assert_eq!(result.value(), Some(&Value::Int32(age)));
    }
}

#[test]
fn flags_report_undefined_bits() {
    let constraints = parse(
        "[Values(Flags,ReadOnly=1,Hidden=2,System=4)]",
        ParameterDataType::Enum,
    )
    .unwrap();
    let validator = ParameterValidator::default();

    let results = validator
        .validate(
            Some(&Value::Enum(EnumValue::new(64 | 1024))),
            ParameterDataType::Enum,
            &constraints,
            "attributes",
            None,
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message_id(), Some(MessageId::EnumInvalidFlag));

    let results = validator
        .validate(
            Some(&Value::Enum(EnumValue::new(1 | 4))),
            ParameterDataType::Enum,
            &constraints,
            "attributes",
            None,
        )
        .unwrap();
    assert!(results.is_empty());

    // bit 32 lies outside Int32 and must not be masked away
    let results = validator
        .validate(
            Some(&Value::Enum(EnumValue::new(1_i64 << 32))),
            ParameterDataType::Enum,
            &constraints,
            "attributes",
            None,
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message_id(), Some(MessageId::EnumInvalidFlag));

    let codec = ValueCodec::new();
    let text = codec
        .encode(&Value::Enum(EnumValue::new(5)), ParameterDataType::Enum, &constraints)
        .unwrap();
    assert_eq!(text, "ReadOnly, System");
    assert_eq!(
        codec.decode("System, ReadOnly", ParameterDataType::Enum, &constraints).unwrap(),
        Value::Enum(EnumValue::new(5))
    );
}

#[test]
fn none_data_type_is_rejected_everywhere() {
    let validator = ParameterValidator::default();
    assert!(matches!(
        validator.validate(None, ParameterDataType::None, &[], "x", None),
        Err(ValidationError::NoneDataType)
    ));
    assert!(matches!(
        ValueCodec::new().to_string(None, ParameterDataType::None, &[]),
        Err(ConversionError::NoneDataType)
    ));
}

#[test]
fn null_values_pass_every_constraint() {
    let constraints = parse("[MinLength(3)][Regex('^a')]", ParameterDataType::String).unwrap();
    let results = ParameterValidator::default()
        .validate(None, ParameterDataType::String, &constraints, "name", None)
        .unwrap();
    assert!(results.is_empty());
}

// ============================================================================
// NAMED TYPES
// ============================================================================

fn registry() -> Arc<TypeRegistry> {
    let definitions: Vec<TypeDefinition> = serde_json::from_str(
        r#"[
            {"kind": "enum", "name": "Acme.Color", "members": {"Red": 1, "Green": 2, "Blue": 3}},
            {"kind": "xml", "name": "Acme.Address"}
        ]"#,
    )
    .unwrap();
    Arc::new(TypeRegistry::from_definitions(&definitions).unwrap())
}

#[test]
fn named_enum_types_resolve_through_the_registry() {
    let parser = ConstraintParser::new().with_type_resolver(registry());
    let constraints = parser.parse("[Type(Acme.Color)]", ParameterDataType::Enum).unwrap();
    let codec = ValueCodec::new();

    let value = codec.decode("Green", ParameterDataType::Enum, &constraints).unwrap();
    assert_eq!(value, Value::Enum(EnumValue::typed("Acme.Color", 2)));
    assert_eq!(
        codec.encode(&value, ParameterDataType::Enum, &constraints).unwrap(),
        "Green"
    );

    let results = ParameterValidator::default()
        .validate(
            Some(&Value::Enum(EnumValue::typed("Acme.Color", 9))),
            ParameterDataType::Enum,
            &constraints,
            "color",
            Some("Color"),
        )
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message_id(), Some(MessageId::EnumNotDefined));
}

#[test]
fn xml_values_round_trip_with_their_type() {
    let parser = ConstraintParser::new().with_type_resolver(registry());
    let constraints = parser.parse("[Type(Acme.Address)]", ParameterDataType::Xml).unwrap();
    let codec = ValueCodec::new();

    let value = codec
        .decode(
            "<Address><City>Oslo</City></Address>",
            ParameterDataType::Xml,
            &constraints,
        )
        .unwrap();
    let Value::Xml(xml) = &value else {
        panic!("expected an xml value");
    };
    assert_eq!(xml.type_name(), "Acme.Address");

    let text = codec.encode(&value, ParameterDataType::Xml, &constraints).unwrap();
    assert_eq!(
        codec.decode(&text, ParameterDataType::Xml, &constraints).unwrap(),
        value
    );

    assert!(matches!(
        codec.decode("<Person/>", ParameterDataType::Xml, &constraints),
        Err(ConversionError::XmlTypeMismatch { .. })
    ));
}

#[test]
fn enum_registered_at_runtime_is_seen_by_existing_parsers() {
    let registry = Arc::new(TypeRegistry::new());
    let parser = ConstraintParser::new().with_type_resolver(registry.clone());

    let mut definition = EnumDefinition::new(ParameterDataType::Byte, false).unwrap();
    definition.add_member("Low", 0).unwrap();
    definition.add_member("High", 255).unwrap();
    registry.register_enum(EnumType::new("Acme.Level", definition));

    let constraints = parser.parse("[Type(Acme.Level)]", ParameterDataType::Enum).unwrap();
    assert_eq!(
        ValueCodec::new()
            .decode("High", ParameterDataType::Enum, &constraints)
            .unwrap(),
        Value::Enum(EnumValue::typed("Acme.Level", 255))
    );
}

// ============================================================================
// SETTINGS
// ============================================================================

#[test]
fn encrypted_setting_stores_ciphertext() {
    let cipher = paramguard_core::AesGcmCipher::new(&[3_u8; 32]).unwrap();
    let ctx = ParameterContext::default().with_codec(ValueCodec::new().with_cipher(Arc::new(cipher)));
    let mut setting = Setting::new("password", ParameterDataType::String)
        .with_constraints("[Encrypted][Password][MinLength(8)]");

    let results = setting
        .set_value(&ctx, Some(Value::String("hunter2".into())))
        .unwrap();
    assert_eq!(results.len(), 1);

    let results = setting
        .set_value(&ctx, Some(Value::String("correct horse".into())))
        .unwrap();
    assert!(results.is_empty());

    let stored = setting.serialized_value(&ctx).unwrap().unwrap().to_owned();
    assert!(!stored.contains("horse"));

    let mut reloaded = Setting::new("password", ParameterDataType::String)
        .with_constraints("[Encrypted][Password][MinLength(8)]")
        .with_serialized_value(stored);
    assert_eq!(
        reloaded.value(&ctx).unwrap(),
        Some(&Value::String("correct horse".into()))
    );
}
