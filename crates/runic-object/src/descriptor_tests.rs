use crate::descriptor::{fits_inline, inline_slot, pooled_slot};
use crate::{DESCRIPTOR_SIZE, Descriptor, Slot};

#[test]
fn descriptor_roundtrip() {
    let desc = Descriptor {
        name_size: 5,
        name_slot: inline_slot(b"count"),
        type_tag: 2,
        data_size: 8,
        data_slot: 42_i64.to_le_bytes(),
    };

    let bytes = desc.to_bytes();
    assert_eq!(bytes.len(), DESCRIPTOR_SIZE);
    assert_eq!(Descriptor::from_bytes(&bytes), desc);
}

#[test]
fn inline_boundary() {
    // exactly 8 bytes stays inline
    assert!(fits_inline(8));
    // 9 forces the pool
    assert!(!fits_inline(9));
    assert!(fits_inline(0));
}

#[test]
fn inline_slot_classification() {
    let desc = Descriptor {
        name_size: 8,
        name_slot: inline_slot(b"exactly8"),
        type_tag: 4,
        data_size: 0,
        data_slot: inline_slot(b""),
    };

    assert_eq!(desc.name(), Slot::Inline(b"exactly8".as_slice()));
    assert_eq!(desc.data(), Slot::Inline(b"".as_slice()));
    assert!(desc.name().is_inline());
}

#[test]
fn pooled_slot_classification() {
    let desc = Descriptor {
        name_size: 9,
        name_slot: pooled_slot(0x80),
        type_tag: 4,
        data_size: 300,
        data_slot: pooled_slot(0x89),
    };

    assert_eq!(
        desc.name(),
        Slot::Pooled {
            offset: 0x80,
            size: 9
        }
    );
    assert_eq!(
        desc.data(),
        Slot::Pooled {
            offset: 0x89,
            size: 300
        }
    );
    assert!(!desc.data().is_inline());
}

#[test]
fn inline_slot_zero_pads() {
    assert_eq!(inline_slot(b"ab"), [b'a', b'b', 0, 0, 0, 0, 0, 0]);
}

#[test]
#[should_panic(expected = "does not fit inline")]
fn inline_slot_rejects_oversized() {
    inline_slot(b"ninebytes");
}
