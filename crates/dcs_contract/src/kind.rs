use core::fmt;

/// The serialization shape of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Primitive,
    Class,
    Collection,
    Enum,
    Surrogate,
    XmlAny,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive => f.pad("Primitive"),
            Self::Class => f.pad("Class"),
            Self::Collection => f.pad("Collection"),
            Self::Enum => f.pad("Enum"),
            Self::Surrogate => f.pad("Surrogate"),
            Self::XmlAny => f.pad("XmlAny"),
        }
    }
}
