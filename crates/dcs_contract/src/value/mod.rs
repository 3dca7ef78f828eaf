//! The dynamic object model walked by the writer and rebuilt by the reader.
//!
//! Primitive and enum values are plain data. Class and collection instances
//! live behind [`ObjectRef`], a shared handle whose *address* is the object's
//! identity: two handles to the same object are the same node of the graph,
//! two equal-looking objects are not.

// -----------------------------------------------------------------------------
// Modules

mod graph_eq;
mod object;

// -----------------------------------------------------------------------------
// Exports

pub use graph_eq::graph_eq;
pub use object::{ExtensionData, ExtensionMember, Fields, Object, ObjectBody, ObjectRef};

use std::sync::Arc;

use dcs_xml::XmlNode;

use crate::info::PrimitiveType;

// -----------------------------------------------------------------------------
// EnumValue

/// An enum value: the enum's type path and its 64-bit value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_path: Arc<str>,
    bits: i64,
}

impl EnumValue {
    #[inline]
    pub fn new(type_path: impl Into<Arc<str>>, bits: i64) -> Self {
        Self {
            type_path: type_path.into(),
            bits,
        }
    }

    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    #[inline]
    pub fn bits(&self) -> i64 {
        self.bits
    }
}

// -----------------------------------------------------------------------------
// Value

/// A node value.
///
/// `PartialEq` compares objects by identity; use [`graph_eq`] to compare two
/// graphs structurally.
///
/// # Examples
///
/// ```
/// use dcs_contract::value::{Object, Value};
///
/// let order = Value::object(Object::new_class("shop::Order").with_field("Id", Value::I32(7)));
/// let same = order.clone();
///
/// assert_eq!(order, same);
/// assert_eq!(order.type_path().as_deref(), Some("shop::Order"));
/// assert_eq!(Value::from("text").type_path().as_deref(), Some("String"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(EnumValue),
    Object(ObjectRef),
    /// Raw XML content of an `XmlElement`-typed member.
    Xml(Vec<XmlNode>),
}

/// Type path of raw XML values.
pub const XML_TYPE_PATH: &str = "XmlElement";

impl Value {
    /// Wraps `object` in a fresh [`ObjectRef`].
    #[inline]
    pub fn object(object: Object) -> Self {
        Self::Object(ObjectRef::new(object))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The object handle, if this is an object.
    #[inline]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The runtime type path of the value; `None` for `Null`.
    pub fn type_path(&self) -> Option<Arc<str>> {
        match self {
            Self::Null => None,
            Self::Enum(value) => Some(value.type_path.clone()),
            Self::Object(object) => Some(object.type_path()),
            Self::Xml(_) => Some(Arc::from(XML_TYPE_PATH)),
            primitive => PrimitiveType::of(primitive).map(|p| Arc::from(p.type_path())),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident,)*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    EnumValue => Enum,
    ObjectRef => Object,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}
