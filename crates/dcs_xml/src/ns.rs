//! Well-known namespaces and prefixes of the data-contract wire format.
//!
//! These strings are part of the wire contract; changing any of them breaks
//! interop with existing documents.

/// `xsi`: carries `type` and `nil`.
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Preferred prefix for [`XSI`].
pub const XSI_PREFIX: &str = "i";

/// XML Schema namespace, owner of the builtin primitive names.
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema";

/// Serialization namespace: carries `Id`, `Ref`, `Size` and a few primitives.
pub const SERIALIZATION: &str = "http://schemas.microsoft.com/2003/10/Serialization/";

/// Preferred prefix for [`SERIALIZATION`].
pub const SERIALIZATION_PREFIX: &str = "z";

/// Namespace of collections whose items are builtin primitives.
pub const SERIALIZATION_ARRAYS: &str = "http://schemas.microsoft.com/2003/10/Serialization/Arrays";

/// Base of every default contract namespace.
pub const DATA_CONTRACT: &str = "http://schemas.datacontract.org/2004/07/";

/// The reserved `xmlns` namespace.
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// The reserved `xml` namespace.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Returns `true` for namespaces owned by builtin contracts.
#[inline]
pub fn is_builtin(namespace: &str) -> bool {
    namespace == XSD || namespace == SERIALIZATION
}
