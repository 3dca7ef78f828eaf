use crate::QualifiedName;

// -----------------------------------------------------------------------------
// XmlAttribute

/// An attribute captured from, or destined for, an XML element.
///
/// The prefix is kept so that captured content is written back the way it
/// was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: String,
    pub value: String,
}

impl XmlAttribute {
    /// Creates an attribute without a preferred prefix.
    pub fn new(
        local_name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if this attribute is `local_name` in `namespace`.
    #[inline]
    pub fn is(&self, local_name: &str, namespace: &str) -> bool {
        self.local_name == local_name && self.namespace == namespace
    }
}

// -----------------------------------------------------------------------------
// NamespaceDeclaration

/// An `xmlns` or `xmlns:prefix` declaration. An empty prefix is the default
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDeclaration {
    pub prefix: String,
    pub namespace: String,
}

impl NamespaceDeclaration {
    #[inline]
    pub fn new(prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// XmlNode

/// A raw XML node: an element subtree or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlNode {
    /// Returns the element if this node is one.
    #[inline]
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    #[inline]
    fn from(value: XmlElement) -> Self {
        Self::Element(value)
    }
}

// -----------------------------------------------------------------------------
// XmlElement

/// An element subtree kept verbatim.
///
/// Used for extension data (members the contract does not know about) and
/// for members whose contract is raw XML.
///
/// # Examples
///
/// ```
/// use dcs_xml::XmlElement;
///
/// let element = XmlElement::new("Nickname", "urn:pets")
///     .with_attribute("lang", "", "en")
///     .with_text("Rex");
///
/// assert_eq!(element.text(), "Rex");
/// assert_eq!(element.element_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: String,
    pub namespace_declarations: Vec<NamespaceDeclaration>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an empty element.
    pub fn new(local_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Returns the qualified name of this element.
    #[inline]
    pub fn name(&self) -> QualifiedName {
        QualifiedName::new(self.local_name.as_str(), self.namespace.as_str())
    }

    /// Adds an attribute.
    pub fn with_attribute(
        mut self,
        local_name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .push(XmlAttribute::new(local_name, namespace, value));
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Appends a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Looks up an attribute value.
    pub fn attribute(&self, local_name: &str, namespace: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.is(local_name, namespace))
            .map(|attr| attr.value.as_str())
    }

    /// Child elements, text nodes skipped.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// Concatenated text of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Number of elements in this subtree, itself included.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            count += 1;
            pending.extend(element.elements());
        }
        count
    }
}
