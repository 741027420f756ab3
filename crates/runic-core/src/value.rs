//! Typed values.
//!
//! One tag set serves both worlds: descriptors in a binary object store the
//! tag as a single byte, and callers bind values through the same types at
//! run time. `Array` and `Range` are reserved tags with no payload encoding;
//! they are rejected wherever a concrete value would be needed.

use serde::Serialize;

/// Value type tags, one byte on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ValueType {
    Unknown = 0,
    Boolean = 1,
    Integer = 2,
    Float = 3,
    String = 4,
    Array = 5,
    Range = 6,
}

impl ValueType {
    /// Decode a tag byte.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Unknown),
            1 => Some(Self::Boolean),
            2 => Some(Self::Integer),
            3 => Some(Self::Float),
            4 => Some(Self::String),
            5 => Some(Self::Array),
            6 => Some(Self::Range),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Range => "range",
        }
    }

    /// Whether values of this type can be constructed and encoded.
    ///
    /// `Array` and `Range` are reserved: the format knows the tags but
    /// defines no payload layout for them.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Boolean | Self::Integer | Self::Float | Self::String
        )
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by payload encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("{0} values are not yet supported")]
    Unsupported(ValueType),
    #[error("unknown type tag {0:#04x}")]
    UnknownTag(u8),
    #[error("{tag} payload must be {expected} bytes, got {actual}")]
    PayloadSize {
        tag: ValueType,
        expected: usize,
        actual: usize,
    },
    #[error("invalid boolean payload byte {0:#04x}")]
    InvalidBoolean(u8),
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
}

/// A concrete typed value.
///
/// Only the supported tags have variants; the reserved tags cannot be
/// represented, which keeps "reject, don't invent a layout" a type-level
/// guarantee.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
        }
    }

    /// The zero value of a tag: `false`, `0`, `0.0`, `""`.
    pub fn zero(tag: ValueType) -> Result<Self, ValueError> {
        match tag {
            ValueType::Boolean => Ok(Self::Boolean(false)),
            ValueType::Integer => Ok(Self::Integer(0)),
            ValueType::Float => Ok(Self::Float(0.0)),
            ValueType::String => Ok(Self::String(String::new())),
            other => Err(ValueError::Unsupported(other)),
        }
    }

    /// Encode the payload bytes as stored in a descriptor slot or the data
    /// pool. Little-endian for the fixed-width types, raw UTF-8 for strings.
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Self::Boolean(b) => vec![u8::from(*b)],
            Self::Integer(i) => i.to_le_bytes().to_vec(),
            Self::Float(f) => f.to_le_bytes().to_vec(),
            Self::String(s) => s.as_bytes().to_vec(),
        }
    }

    /// Decode a payload produced by [`encode_payload`](Self::encode_payload).
    pub fn decode_payload(tag: ValueType, bytes: &[u8]) -> Result<Self, ValueError> {
        match tag {
            ValueType::Boolean => match bytes {
                [0] => Ok(Self::Boolean(false)),
                [1] => Ok(Self::Boolean(true)),
                [other] => Err(ValueError::InvalidBoolean(*other)),
                _ => Err(ValueError::PayloadSize {
                    tag,
                    expected: 1,
                    actual: bytes.len(),
                }),
            },
            ValueType::Integer => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| ValueError::PayloadSize {
                    tag,
                    expected: 8,
                    actual: bytes.len(),
                })?;
                Ok(Self::Integer(i64::from_le_bytes(arr)))
            }
            ValueType::Float => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| ValueError::PayloadSize {
                    tag,
                    expected: 8,
                    actual: bytes.len(),
                })?;
                Ok(Self::Float(f64::from_le_bytes(arr)))
            }
            ValueType::String => {
                let s = std::str::from_utf8(bytes).map_err(|_| ValueError::InvalidUtf8)?;
                Ok(Self::String(s.to_owned()))
            }
            other => Err(ValueError::Unsupported(other)),
        }
    }

    /// Validate that `bytes` decodes under `tag` without materializing the
    /// value. Used by the loader so later decodes cannot fail.
    pub fn validate_payload(tag: ValueType, bytes: &[u8]) -> Result<(), ValueError> {
        match tag {
            ValueType::Boolean => match bytes {
                [0] | [1] => Ok(()),
                [other] => Err(ValueError::InvalidBoolean(*other)),
                _ => Err(ValueError::PayloadSize {
                    tag,
                    expected: 1,
                    actual: bytes.len(),
                }),
            },
            ValueType::Integer | ValueType::Float => {
                if bytes.len() == 8 {
                    Ok(())
                } else {
                    Err(ValueError::PayloadSize {
                        tag,
                        expected: 8,
                        actual: bytes.len(),
                    })
                }
            }
            ValueType::String => std::str::from_utf8(bytes)
                .map(|_| ())
                .map_err(|_| ValueError::InvalidUtf8),
            other => Err(ValueError::Unsupported(other)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            // Shortest round-trippable decimal, but keep integral floats
            // visibly typed ("2.0", not "2").
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
