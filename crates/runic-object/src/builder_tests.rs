use runic_core::{Value, ValueType};

use crate::{
    DESCRIPTOR_SIZE, EncodeError, HEADER_SIZE, Header, MAX_VARIABLES, Op, ObjectBuilder, Opcode,
    Slot,
};

#[test]
fn empty_object_geometry() {
    let bytes = ObjectBuilder::new().finish().unwrap();

    // header + the implicit terminating halt
    assert_eq!(bytes.len(), HEADER_SIZE + 8);

    let header = Header::from_bytes(&bytes);
    assert!(header.validate_magic());
    assert_eq!(header.variable_count, 0);
    assert_eq!(header.variable_table_offset, HEADER_SIZE as u32);
    assert_eq!(header.code_start, HEADER_SIZE as u32);
    assert_eq!(header.file_size as usize, bytes.len());
}

#[test]
fn inline_variable_descriptor() {
    let mut builder = ObjectBuilder::new();
    builder
        .add_extern_variable("count", ValueType::Integer, None)
        .unwrap();
    let bytes = builder.finish().unwrap();

    let desc = crate::Descriptor::from_bytes(&bytes[HEADER_SIZE..HEADER_SIZE + DESCRIPTOR_SIZE]);
    assert_eq!(desc.name_size, 5);
    assert_eq!(desc.name(), Slot::Inline(b"count".as_slice()));
    assert_eq!(desc.type_tag, ValueType::Integer.as_u8());
    assert_eq!(desc.data_size, 8);
    assert_eq!(desc.data(), Slot::Inline(0_i64.to_le_bytes().as_slice()));
}

#[test]
fn eight_byte_payload_stays_inline() {
    let mut builder = ObjectBuilder::new();
    builder
        .add_extern_variable("exactly8", ValueType::String, Some(Value::from("12345678")))
        .unwrap();
    let bytes = builder.finish().unwrap();

    let desc = crate::Descriptor::from_bytes(&bytes[HEADER_SIZE..]);
    assert!(desc.name().is_inline());
    assert!(desc.data().is_inline());
    assert_eq!(desc.data(), Slot::Inline(b"12345678".as_slice()));
}

#[test]
fn nine_byte_payload_goes_to_pool() {
    let mut builder = ObjectBuilder::new();
    builder
        .add_extern_variable("nine_char", ValueType::String, Some(Value::from("123456789")))
        .unwrap();
    let bytes = builder.finish().unwrap();

    let header = Header::from_bytes(&bytes);
    let desc = crate::Descriptor::from_bytes(&bytes[HEADER_SIZE..]);

    // name is 9 bytes too, so it leads the pool, right after the code
    let pool_base = (header.code_start + 8) as u64;
    assert_eq!(
        desc.name(),
        Slot::Pooled {
            offset: pool_base,
            size: 9
        }
    );
    assert_eq!(
        desc.data(),
        Slot::Pooled {
            offset: pool_base + 9,
            size: 9
        }
    );
    assert_eq!(&bytes[pool_base as usize..pool_base as usize + 9], b"nine_char");
    assert_eq!(
        &bytes[pool_base as usize + 9..pool_base as usize + 18],
        b"123456789"
    );
}

#[test]
fn constants_are_deduplicated() {
    let mut builder = ObjectBuilder::new();
    let a = builder.add_constant(&Value::Integer(7)).unwrap();
    let b = builder.add_constant(&Value::Integer(7)).unwrap();
    let c = builder.add_constant(&Value::Integer(8)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn const_references_are_patched() {
    let mut builder = ObjectBuilder::new();
    let id = builder.add_constant(&Value::Integer(7)).unwrap();
    builder.push_const_op(id);
    builder.push_op(Op::new(Opcode::Return));
    let bytes = builder.finish().unwrap();

    let header = Header::from_bytes(&bytes);
    let code_start = header.code_start as usize;
    let op_bytes: [u8; 8] = bytes[code_start..code_start + 8].try_into().unwrap();
    let op = Op::from_bytes(&op_bytes).unwrap();

    assert_eq!(op.opcode, Opcode::PushConst);
    assert_eq!(op.a, ValueType::Integer.as_u8());
    assert_eq!(op.b, 8);

    let payload = &bytes[op.c as usize..op.c as usize + 8];
    assert_eq!(payload, 7_i64.to_le_bytes());
}

#[test]
fn variable_indices_follow_declaration_order() {
    let mut builder = ObjectBuilder::new();
    let first = builder
        .add_extern_variable("first", ValueType::Integer, None)
        .unwrap();
    let second = builder
        .add_extern_variable("second", ValueType::Boolean, None)
        .unwrap();

    assert_eq!(first, 0);
    assert_eq!(second, 1);
    assert_eq!(builder.variable_index("second"), Some(1));
    assert_eq!(builder.variable_index("missing"), None);
}

#[test]
fn integer_initializer_coerces_into_float_slot() {
    let mut builder = ObjectBuilder::new();
    builder
        .add_extern_variable("ratio", ValueType::Float, Some(Value::Integer(2)))
        .unwrap();
    let bytes = builder.finish().unwrap();

    let desc = crate::Descriptor::from_bytes(&bytes[HEADER_SIZE..]);
    assert_eq!(desc.type_tag, ValueType::Float.as_u8());
    assert_eq!(desc.data(), Slot::Inline(2.0_f64.to_le_bytes().as_slice()));
}

#[test]
fn mismatched_initializer_rejected() {
    let mut builder = ObjectBuilder::new();
    let err = builder
        .add_extern_variable("count", ValueType::Integer, Some(Value::from("nope")))
        .unwrap_err();
    assert!(matches!(err, EncodeError::InitialValueMismatch { .. }));
}

#[test]
fn reserved_types_rejected() {
    let mut builder = ObjectBuilder::new();
    assert!(matches!(
        builder.add_extern_variable("items", ValueType::Array, None),
        Err(EncodeError::UnsupportedType(ValueType::Array))
    ));
    assert!(matches!(
        builder.add_extern_variable("span", ValueType::Range, None),
        Err(EncodeError::UnsupportedType(ValueType::Range))
    ));
    assert!(matches!(
        builder.set_return_type(ValueType::Range),
        Err(EncodeError::UnsupportedType(ValueType::Range))
    ));
}

#[test]
fn variable_count_limit_enforced() {
    let mut builder = ObjectBuilder::new();
    for i in 0..MAX_VARIABLES {
        builder
            .add_extern_variable(format!("v{i}"), ValueType::Boolean, None)
            .unwrap();
    }
    let err = builder
        .add_extern_variable("one_too_many", ValueType::Boolean, None)
        .unwrap_err();
    assert!(matches!(err, EncodeError::TooManyVariables(_)));
}

#[test]
fn return_type_recorded() {
    let mut builder = ObjectBuilder::new();
    builder.set_return_type(ValueType::Integer).unwrap();
    let bytes = builder.finish().unwrap();
    assert_eq!(
        Header::from_bytes(&bytes).return_type(),
        Some(ValueType::Integer)
    );
}
