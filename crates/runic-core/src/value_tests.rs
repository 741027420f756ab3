use crate::{Value, ValueError, ValueType};

#[test]
fn tag_byte_roundtrip() {
    for tag in [
        ValueType::Unknown,
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Float,
        ValueType::String,
        ValueType::Array,
        ValueType::Range,
    ] {
        assert_eq!(ValueType::from_u8(tag.as_u8()), Some(tag));
    }
    assert_eq!(ValueType::from_u8(7), None);
    assert_eq!(ValueType::from_u8(0xFF), None);
}

#[test]
fn reserved_tags_are_unsupported() {
    assert!(!ValueType::Array.is_supported());
    assert!(!ValueType::Range.is_supported());
    assert!(!ValueType::Unknown.is_supported());
    assert!(ValueType::String.is_supported());

    assert_eq!(
        Value::zero(ValueType::Array),
        Err(ValueError::Unsupported(ValueType::Array))
    );
    assert_eq!(
        Value::decode_payload(ValueType::Range, &[0; 8]),
        Err(ValueError::Unsupported(ValueType::Range))
    );
}

#[test]
fn payload_roundtrip() {
    let values = [
        Value::Boolean(true),
        Value::Boolean(false),
        Value::Integer(-123_456_789),
        Value::Float(2.5),
        Value::String("hello world".to_owned()),
        Value::String(String::new()),
    ];
    for value in values {
        let bytes = value.encode_payload();
        let decoded = Value::decode_payload(value.value_type(), &bytes).unwrap();
        assert_eq!(decoded, value);
    }
}

#[test]
fn payload_sizes() {
    assert_eq!(Value::Boolean(true).encode_payload(), vec![1]);
    assert_eq!(Value::Integer(1).encode_payload().len(), 8);
    assert_eq!(Value::Float(1.0).encode_payload().len(), 8);
    assert_eq!(Value::String("abc".to_owned()).encode_payload().len(), 3);
}

#[test]
fn bad_payloads_are_rejected() {
    assert_eq!(
        Value::decode_payload(ValueType::Boolean, &[2]),
        Err(ValueError::InvalidBoolean(2))
    );
    assert_eq!(
        Value::decode_payload(ValueType::Integer, &[0; 4]),
        Err(ValueError::PayloadSize {
            tag: ValueType::Integer,
            expected: 8,
            actual: 4,
        })
    );
    assert_eq!(
        Value::decode_payload(ValueType::String, &[0xFF, 0xFE]),
        Err(ValueError::InvalidUtf8)
    );

    assert!(Value::validate_payload(ValueType::Boolean, &[1]).is_ok());
    assert!(Value::validate_payload(ValueType::Float, &[0; 7]).is_err());
    assert!(Value::validate_payload(ValueType::String, b"ok").is_ok());
}

#[test]
fn zero_values() {
    assert_eq!(Value::zero(ValueType::Boolean).unwrap(), Value::Boolean(false));
    assert_eq!(Value::zero(ValueType::Integer).unwrap(), Value::Integer(0));
    assert_eq!(Value::zero(ValueType::Float).unwrap(), Value::Float(0.0));
    assert_eq!(
        Value::zero(ValueType::String).unwrap(),
        Value::String(String::new())
    );
}

#[test]
fn rendering() {
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::Boolean(false).to_string(), "false");
    assert_eq!(Value::Integer(-42).to_string(), "-42");
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(0.1).to_string(), "0.1");
    assert_eq!(Value::String("raw".to_owned()).to_string(), "raw");
}

#[test]
fn from_impls() {
    assert_eq!(Value::from(true), Value::Boolean(true));
    assert_eq!(Value::from(7_i64), Value::Integer(7));
    assert_eq!(Value::from(1.5), Value::Float(1.5));
    assert_eq!(Value::from("s"), Value::String("s".to_owned()));
}
