//! Value <-> string conversion.
//!
//! [`ValueCodec`] produces and reads the stored form of a parameter value.
//! Primitive types use their canonical invariant text. Enum and XML values
//! are described by a constraint in the list, and an `Encrypted` marker
//! wraps the text in the configured [`Cipher`] and base64.

pub(crate) mod primitive;

use std::borrow::Cow;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::cipher::Cipher;
use crate::constraint::Constraint;
use crate::data_type::ParameterDataType;
use crate::error::ConversionError;
use crate::resolver::XmlType;
use crate::value::{EnumDefinition, EnumValue, Value, XmlElement, XmlValue};

/// Enum members known to the codec, with the enum name when it is a named
/// type.
struct EnumSource<'a> {
    definition: &'a EnumDefinition,
    type_name: Option<&'a str>,
}

impl EnumSource<'_> {
    fn display_name(&self) -> &str {
        self.type_name.unwrap_or("the allowed values")
    }
}

/// Converts values to and from their stored string form.
#[derive(Debug, Clone, Default)]
pub struct ValueCodec {
    cipher: Option<Arc<dyn Cipher>>,
}

impl ValueCodec {
    /// Codec without a cipher; encrypted parameters fail with
    /// `CipherUnavailable`.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn has_cipher(&self) -> bool {
        self.cipher.is_some()
    }

    /// Serializes `value`; `None` stays `None`.
    pub fn to_string(
        &self,
        value: Option<&Value>,
        data_type: ParameterDataType,
        constraints: &[Constraint],
    ) -> Result<Option<String>, ConversionError> {
        if data_type == ParameterDataType::None {
            return Err(ConversionError::NoneDataType);
        }
        value
            .map(|value| self.encode(value, data_type, constraints))
            .transpose()
    }

    /// Deserializes `text`; `None` stays `None`.
    pub fn to_data_type(
        &self,
        text: Option<&str>,
        data_type: ParameterDataType,
        constraints: &[Constraint],
    ) -> Result<Option<Value>, ConversionError> {
        if data_type == ParameterDataType::None {
            return Err(ConversionError::NoneDataType);
        }
        text.map(|text| self.decode(text, data_type, constraints))
            .transpose()
    }

    /// Serializes a value of `data_type`, converting numeric values first.
    pub fn encode(
        &self,
        value: &Value,
        data_type: ParameterDataType,
        constraints: &[Constraint],
    ) -> Result<String, ConversionError> {
        if data_type == ParameterDataType::None {
            return Err(ConversionError::NoneDataType);
        }
        let value = value.convert_to(data_type)?;

        let plain = match &value {
            Value::Enum(member) => {
                let source = enum_source(constraints)?;
                if !source.definition.fits(member.value()) {
                    return Err(ConversionError::out_of_range(
                        source.definition.underlying(),
                        member.value(),
                    ));
                }
                source.definition.format(member.value())
            }
            Value::Xml(xml) => {
                let ty = xml_type(constraints)?;
                if xml.type_name() != ty.name() {
                    return Err(ConversionError::XmlTypeMismatch {
                        expected: ty.name().to_owned(),
                        actual: xml.type_name().to_owned(),
                    });
                }
                check_root(ty, xml.root())?;
                xml.root().to_xml_string()?
            }
            other => primitive::format(other)?,
        };

        if is_encrypted(constraints) {
            self.encrypt(&plain)
        } else {
            Ok(plain)
        }
    }

    /// Deserializes the stored form of a `data_type` value.
    pub fn decode(
        &self,
        text: &str,
        data_type: ParameterDataType,
        constraints: &[Constraint],
    ) -> Result<Value, ConversionError> {
        let plain = if is_encrypted(constraints) {
            Cow::Owned(self.decrypt(text)?)
        } else {
            Cow::Borrowed(text)
        };

        match data_type {
            ParameterDataType::Enum => {
                let source = enum_source(constraints)?;
                let value = source.definition.parse(&plain, source.display_name())?;
                Ok(Value::Enum(match source.type_name {
                    Some(name) => EnumValue::typed(name, value),
                    None => EnumValue::new(value),
                }))
            }
            ParameterDataType::Xml => {
                let ty = xml_type(constraints)?;
                let root = XmlElement::parse(&plain)?;
                check_root(ty, &root)?;
                Ok(Value::Xml(XmlValue::new(ty.name(), root)))
            }
            other => primitive::parse(&plain, other),
        }
    }

    fn cipher(&self) -> Result<&dyn Cipher, ConversionError> {
        self.cipher
            .as_deref()
            .ok_or(ConversionError::CipherUnavailable)
    }

    fn encrypt(&self, plain: &str) -> Result<String, ConversionError> {
        let payload = self
            .cipher()?
            .encrypt(plain.as_bytes())
            .map_err(|err| ConversionError::EncryptionFailed {
                reason: err.to_string(),
            })?;
        Ok(STANDARD.encode(payload))
    }

    fn decrypt(&self, text: &str) -> Result<String, ConversionError> {
        let cipher = self.cipher()?;
        let failed = |reason: String| ConversionError::DecryptionFailed { reason };

        let payload = STANDARD
            .decode(text)
            .map_err(|err| failed(format!("payload is not base64: {err}")))?;
        let plain = cipher
            .decrypt(&payload)
            .map_err(|err| failed(err.to_string()))?;
        String::from_utf8(plain).map_err(|err| failed(err.to_string()))
    }
}

fn is_encrypted(constraints: &[Constraint]) -> bool {
    constraints
        .iter()
        .any(|c| matches!(c, Constraint::Encrypted(_)))
}

/// The single enum-describing constraint of the list.
fn enum_source(constraints: &[Constraint]) -> Result<EnumSource<'_>, ConversionError> {
    let mut describing = constraints
        .iter()
        .filter(|c| matches!(c, Constraint::Values(_) | Constraint::EnumType(_)));
    let Some(first) = describing.next() else {
        return Err(ConversionError::NoTypeConstraint {
            data_type: ParameterDataType::Enum,
        });
    };
    if describing.next().is_some() {
        return Err(ConversionError::AmbiguousEnum);
    }

    match first {
        Constraint::Values(values) => Ok(EnumSource {
            definition: values.definition(),
            type_name: None,
        }),
        Constraint::EnumType(named) => match named.resolved() {
            Some(ty) => Ok(EnumSource {
                definition: ty.definition(),
                type_name: Some(ty.name()),
            }),
            None => Err(ConversionError::TypeResolutionFailed {
                type_name: named.type_name().to_owned(),
            }),
        },
        _ => Err(ConversionError::NoTypeConstraint {
            data_type: ParameterDataType::Enum,
        }),
    }
}

fn xml_type(constraints: &[Constraint]) -> Result<&XmlType, ConversionError> {
    let named = constraints
        .iter()
        .find_map(|c| match c {
            Constraint::XmlType(named) => Some(named),
            _ => None,
        })
        .ok_or(ConversionError::NoTypeConstraint {
            data_type: ParameterDataType::Xml,
        })?;
    named
        .resolved()
        .map(Arc::as_ref)
        .ok_or_else(|| ConversionError::TypeResolutionFailed {
            type_name: named.type_name().to_owned(),
        })
}

fn check_root(ty: &XmlType, root: &XmlElement) -> Result<(), ConversionError> {
    if root.name() == ty.element() {
        Ok(())
    } else {
        Err(ConversionError::XmlTypeMismatch {
            expected: ty.element().to_owned(),
            actual: root.name().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::CipherError;
    use crate::constraint::{
        ConfigureContext, ConstraintKind, EncryptedConstraint, EnumTypeConstraint,
        XmlTypeConstraint,
    };
    use crate::resolver::{EnumType, TypeRegistry};
    use pretty_assertions::assert_eq;

    /// Reverses the bytes; enough to tell ciphertext from plaintext.
    #[derive(Debug)]
    struct Reverse;

    impl Cipher for Reverse {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
            Ok(plaintext.iter().rev().copied().collect())
        }

        fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, CipherError> {
            if payload.is_empty() {
                return Err(CipherError::Authentication);
            }
            Ok(payload.iter().rev().copied().collect())
        }
    }

    fn values(params: &[&str]) -> Constraint {
        let owned: Vec<String> = params.iter().map(|p| (*p).to_owned()).collect();
        Constraint::configure(
            ConstraintKind::Values,
            &owned,
            &ConfigureContext::unresolved(ParameterDataType::Enum),
        )
        .unwrap()
    }

    #[test]
    fn null_round_trips() {
        let codec = ValueCodec::new();
        assert_eq!(codec.to_string(None, ParameterDataType::Int32, &[]).unwrap(), None);
        assert_eq!(codec.to_data_type(None, ParameterDataType::Int32, &[]).unwrap(), None);
        assert_eq!(
            codec.to_string(None, ParameterDataType::None, &[]),
            Err(ConversionError::NoneDataType)
        );
    }

    #[test]
    fn numeric_values_are_converted_before_encoding() {
        let codec = ValueCodec::new();
        assert_eq!(
            codec.encode(&Value::Int32(7), ParameterDataType::Decimal, &[]).unwrap(),
            "7"
        );
        assert!(matches!(
            codec.encode(&Value::Int32(300), ParameterDataType::Byte, &[]),
            Err(ConversionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn inline_flags_enum() {
        let codec = ValueCodec::new();
        let list = [values(&["Flags", "Read=1", "Write=2", "Execute=4"])];

        let text = codec
            .encode(&Value::Enum(EnumValue::new(5)), ParameterDataType::Enum, &list)
            .unwrap();
        assert_eq!(text, "Read, Execute");
        assert_eq!(
            codec.decode(&text, ParameterDataType::Enum, &list).unwrap(),
            Value::Enum(EnumValue::new(5))
        );
        assert_eq!(
            codec.decode("0x6", ParameterDataType::Enum, &list).unwrap(),
            Value::Enum(EnumValue::new(6))
        );
        assert!(matches!(
            codec.decode("Delete", ParameterDataType::Enum, &list),
            Err(ConversionError::UndefinedEnumMember { .. })
        ));
    }

    #[test]
    fn enum_needs_exactly_one_definition() {
        let codec = ValueCodec::new();
        assert_eq!(
            codec.decode("1", ParameterDataType::Enum, &[]),
            Err(ConversionError::NoTypeConstraint {
                data_type: ParameterDataType::Enum
            })
        );
        let twice = [values(&["A=1"]), values(&["B=2"])];
        assert_eq!(
            codec.decode("1", ParameterDataType::Enum, &twice),
            Err(ConversionError::AmbiguousEnum)
        );
        let unresolved = [Constraint::from(EnumTypeConstraint::new("Missing.Kind", None))];
        assert_eq!(
            codec.decode("1", ParameterDataType::Enum, &unresolved),
            Err(ConversionError::TypeResolutionFailed {
                type_name: "Missing.Kind".into()
            })
        );
    }

    #[test]
    fn named_enum_tags_decoded_values() {
        let registry = TypeRegistry::new();
        let mut definition = EnumDefinition::new(ParameterDataType::Byte, false).unwrap();
        definition.add_member("Low", 1).unwrap();
        definition.add_member("High", 9).unwrap();
        registry.register_enum(EnumType::new("App.Priority", definition));

        let owned = vec!["App.Priority".to_owned()];
        let list = [Constraint::configure(
            ConstraintKind::EnumType,
            &owned,
            &ConfigureContext::new(ParameterDataType::Enum, &registry),
        )
        .unwrap()];

        let codec = ValueCodec::new();
        assert_eq!(
            codec.decode("High", ParameterDataType::Enum, &list).unwrap(),
            Value::Enum(EnumValue::typed("App.Priority", 9))
        );
        assert!(matches!(
            codec.encode(&Value::Enum(EnumValue::new(256)), ParameterDataType::Enum, &list),
            Err(ConversionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn xml_checks_type_and_root() {
        let registry = TypeRegistry::new();
        registry.register_xml(XmlType::new("App.Layout", "layout"));
        let owned = vec!["App.Layout".to_owned()];
        let list = [Constraint::configure(
            ConstraintKind::XmlType,
            &owned,
            &ConfigureContext::new(ParameterDataType::Xml, &registry),
        )
        .unwrap()];
        let codec = ValueCodec::new();

        let value = codec
            .decode(r#"<layout cols="2"><pane>left</pane></layout>"#, ParameterDataType::Xml, &list)
            .unwrap();
        let text = codec.encode(&value, ParameterDataType::Xml, &list).unwrap();
        assert_eq!(codec.decode(&text, ParameterDataType::Xml, &list).unwrap(), value);

        assert!(matches!(
            codec.decode("<theme/>", ParameterDataType::Xml, &list),
            Err(ConversionError::XmlTypeMismatch { .. })
        ));
        assert_eq!(
            codec.decode("<layout/>", ParameterDataType::Xml, &[]),
            Err(ConversionError::NoTypeConstraint {
                data_type: ParameterDataType::Xml
            })
        );

        let unresolved = [Constraint::from(XmlTypeConstraint::new("App.Other", None))];
        assert!(matches!(
            codec.decode("<layout/>", ParameterDataType::Xml, &unresolved),
            Err(ConversionError::TypeResolutionFailed { .. })
        ));
    }

    #[test]
    fn encrypted_values_go_through_the_cipher() {
        let list = [Constraint::from(EncryptedConstraint)];
        let codec = ValueCodec::new().with_cipher(Arc::new(Reverse));

        let stored = codec.encode(&Value::from("secret"), ParameterDataType::String, &list).unwrap();
        assert_eq!(stored, STANDARD.encode("terces"));
        assert_eq!(
            codec.decode(&stored, ParameterDataType::String, &list).unwrap(),
            Value::from("secret")
        );

        assert!(matches!(
            codec.decode("", ParameterDataType::String, &list),
            Err(ConversionError::DecryptionFailed { .. })
        ));
        assert_eq!(
            ValueCodec::new().encode(&Value::from("x"), ParameterDataType::String, &list),
            Err(ConversionError::CipherUnavailable)
        );
    }
}
