use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dcs_xml::{QualifiedName, ns};

use crate::value::Value;

/// Builtin primitive types and their bit-exact wire names.
///
/// Every [`TypeRegistry::new`](crate::registry::TypeRegistry::new) registers
/// all of them under their [`type_path`](Self::type_path).
///
/// # Examples
///
/// ```
/// use dcs_contract::info::PrimitiveType;
/// use dcs_contract::value::Value;
///
/// let int = PrimitiveType::I32;
/// assert_eq!(int.stable_name().name(), "int");
/// assert_eq!(int.parse(" 42 "), Some(Value::I32(42)));
/// assert_eq!(int.format(&Value::I32(-7)).as_deref(), Some("-7"));
///
/// assert_eq!(PrimitiveType::Char.format(&Value::Char('A')).as_deref(), Some("65"));
/// assert_eq!(PrimitiveType::F64.format(&Value::F64(f64::INFINITY)).as_deref(), Some("INF"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    String,
    Bytes,
    /// `xs:anyType`: declared type that accepts any value.
    Object,
}

macro_rules! parse_int {
    ($text:expr, $variant:ident) => {
        $text.trim().parse().ok().map(Value::$variant)
    };
}

macro_rules! format_float {
    ($value:expr) => {
        if $value.is_nan() {
            "NaN".to_owned()
        } else if $value.is_infinite() {
            String::from(if $value > 0.0 { "INF" } else { "-INF" })
        } else {
            format!("{:?}", $value)
        }
    };
}

macro_rules! parse_float {
    ($text:expr, $ty:ty) => {
        match $text.trim() {
            "INF" => Some(<$ty>::INFINITY),
            "-INF" => Some(<$ty>::NEG_INFINITY),
            "NaN" => Some(<$ty>::NAN),
            text => text.parse::<$ty>().ok().filter(|value| value.is_finite()),
        }
    };
}

impl PrimitiveType {
    /// Every builtin primitive.
    pub const ALL: [PrimitiveType; 15] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::String,
        Self::Bytes,
        Self::Object,
    ];

    /// The type path the primitive is registered under.
    pub const fn type_path(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::Object => "Object",
        }
    }

    const fn wire_name(self) -> (&'static str, &'static str) {
        match self {
            Self::Bool => ("boolean", ns::XSD),
            Self::Char => ("char", ns::SERIALIZATION),
            Self::I8 => ("byte", ns::XSD),
            Self::U8 => ("unsignedByte", ns::XSD),
            Self::I16 => ("short", ns::XSD),
            Self::U16 => ("unsignedShort", ns::XSD),
            Self::I32 => ("int", ns::XSD),
            Self::U32 => ("unsignedInt", ns::XSD),
            Self::I64 => ("long", ns::XSD),
            Self::U64 => ("unsignedLong", ns::XSD),
            Self::F32 => ("float", ns::XSD),
            Self::F64 => ("double", ns::XSD),
            Self::String => ("string", ns::XSD),
            Self::Bytes => ("base64Binary", ns::XSD),
            Self::Object => ("anyType", ns::XSD),
        }
    }

    /// The stable name of the primitive.
    pub fn stable_name(self) -> QualifiedName {
        let (name, namespace) = self.wire_name();
        QualifiedName::new(name, namespace)
    }

    /// Looks a primitive up by its stable name.
    pub fn from_stable_name(name: &QualifiedName) -> Option<Self> {
        Self::ALL.into_iter().find(|primitive| {
            let (local, namespace) = primitive.wire_name();
            name.is(local, namespace)
        })
    }

    /// The primitive a value belongs to, if it is a primitive value.
    pub fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Bool(_) => Self::Bool,
            Value::Char(_) => Self::Char,
            Value::I8(_) => Self::I8,
            Value::U8(_) => Self::U8,
            Value::I16(_) => Self::I16,
            Value::U16(_) => Self::U16,
            Value::I32(_) => Self::I32,
            Value::U32(_) => Self::U32,
            Value::I64(_) => Self::I64,
            Value::U64(_) => Self::U64,
            Value::F32(_) => Self::F32,
            Value::F64(_) => Self::F64,
            Value::String(_) => Self::String,
            Value::Bytes(_) => Self::Bytes,
            _ => return None,
        })
    }

    /// `true` for primitives that cannot be `Null` by default.
    pub const fn is_value_type(self) -> bool {
        !matches!(self, Self::String | Self::Bytes | Self::Object)
    }

    /// The default value of a member of this type.
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Char => Value::Char('\0'),
            Self::I8 => Value::I8(0),
            Self::U8 => Value::U8(0),
            Self::I16 => Value::I16(0),
            Self::U16 => Value::U16(0),
            Self::I32 => Value::I32(0),
            Self::U32 => Value::U32(0),
            Self::I64 => Value::I64(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String | Self::Bytes | Self::Object => Value::Null,
        }
    }

    /// Renders a value as element text. Returns `None` if the value does not
    /// belong to this primitive. `Object` has no text form.
    pub fn format(self, value: &Value) -> Option<String> {
        Some(match (self, value) {
            (Self::Bool, Value::Bool(v)) => String::from(if *v { "true" } else { "false" }),
            (Self::Char, Value::Char(v)) => (*v as u32).to_string(),
            (Self::I8, Value::I8(v)) => v.to_string(),
            (Self::U8, Value::U8(v)) => v.to_string(),
            (Self::I16, Value::I16(v)) => v.to_string(),
            (Self::U16, Value::U16(v)) => v.to_string(),
            (Self::I32, Value::I32(v)) => v.to_string(),
            (Self::U32, Value::U32(v)) => v.to_string(),
            (Self::I64, Value::I64(v)) => v.to_string(),
            (Self::U64, Value::U64(v)) => v.to_string(),
            (Self::F32, Value::F32(v)) => format_float!(*v),
            (Self::F64, Value::F64(v)) => format_float!(*v),
            (Self::String, Value::String(v)) => v.clone(),
            (Self::Bytes, Value::Bytes(v)) => STANDARD.encode(v),
            _ => return None,
        })
    }

    /// Parses element text. Returns `None` for malformed text and for `Object`.
    pub fn parse(self, text: &str) -> Option<Value> {
        match self {
            Self::Bool => match text.trim() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Char => text
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char),
            Self::I8 => parse_int!(text, I8),
            Self::U8 => parse_int!(text, U8),
            Self::I16 => parse_int!(text, I16),
            Self::U16 => parse_int!(text, U16),
            Self::I32 => parse_int!(text, I32),
            Self::U32 => parse_int!(text, U32),
            Self::I64 => parse_int!(text, I64),
            Self::U64 => parse_int!(text, U64),
            Self::F32 => parse_float!(text, f32).map(Value::F32),
            Self::F64 => parse_float!(text, f64).map(Value::F64),
            Self::String => Some(Value::String(text.to_owned())),
            Self::Bytes => {
                let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                STANDARD.decode(compact).ok().map(Value::Bytes)
            }
            Self::Object => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_primitive_round_trips_its_default() {
        for primitive in PrimitiveType::ALL {
            let default = primitive.default_value();
            if default.is_null() {
                continue;
            }
            let text = primitive.format(&default).unwrap();
            assert_eq!(primitive.parse(&text), Some(default), "{primitive:?}");
        }
    }

    #[test]
    fn stable_names_are_unique() {
        for primitive in PrimitiveType::ALL {
            assert_eq!(
                PrimitiveType::from_stable_name(&primitive.stable_name()),
                Some(primitive)
            );
        }
    }

    #[test]
    fn floats_use_schema_spellings() {
        let neg = PrimitiveType::F32.format(&Value::F32(f32::NEG_INFINITY));
        assert_eq!(neg.as_deref(), Some("-INF"));
        assert!(matches!(PrimitiveType::F64.parse("NaN"), Some(Value::F64(v)) if v.is_nan()));
        assert_eq!(PrimitiveType::F64.parse("0.1"), Some(Value::F64(0.1)));
        assert_eq!(PrimitiveType::F64.parse("inf"), None);
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert_eq!(PrimitiveType::U8.parse("256"), None);
        assert_eq!(PrimitiveType::Bool.parse("yes"), None);
        assert_eq!(PrimitiveType::Bytes.parse("###"), None);
        assert_eq!(PrimitiveType::I32.format(&Value::I64(1)), None);
    }

    #[test]
    fn bytes_use_base64() {
        let value = Value::Bytes(vec![0, 1, 2, 253, 254, 255]);
        let text = PrimitiveType::Bytes.format(&value).unwrap();
        assert_eq!(text, "AAEC/f7/");
        assert_eq!(PrimitiveType::Bytes.parse("AAEC\n/f7/"), Some(value));
    }
}
