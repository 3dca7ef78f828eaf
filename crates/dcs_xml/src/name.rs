use core::fmt;
use std::sync::Arc;

/// A `(local name, namespace)` pair.
///
/// This is the wire identity of a contract and the key of every known-type
/// lookup. Both parts are reference counted so cloning a name is cheap.
///
/// `Display` renders the name in Clark notation: `{namespace}name`.
///
/// # Examples
///
/// ```
/// use dcs_xml::QualifiedName;
///
/// let name = QualifiedName::new("Dog", "http://schemas.datacontract.org/2004/07/zoo");
///
/// assert_eq!(name.name(), "Dog");
/// assert_eq!(name.to_string(), "{http://schemas.datacontract.org/2004/07/zoo}Dog");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    name: Arc<str>,
    namespace: Arc<str>,
}

impl QualifiedName {
    /// Creates a new qualified name.
    #[inline]
    pub fn new(name: impl Into<Arc<str>>, namespace: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// The local name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace URI, empty for "no namespace".
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns `true` if this name matches `name` in `namespace`.
    #[inline]
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        *self.name == *name && *self.namespace == *namespace
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.name)
        }
    }
}

impl fmt::Debug for QualifiedName {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
