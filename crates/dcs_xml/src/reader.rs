use crate::{Position, XmlAttribute, XmlElement, XmlError};

/// The kind of node a reader is positioned on after
/// [`move_to_content`](XmlReader::move_to_content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    EndElement,
    Text,
    Eof,
}

/// Pull interface over an XML document.
///
/// The reader always sits on one node. Attribute access is available while
/// it sits on a start tag; reading the start tag moves into the element's
/// content. An empty element (`<a/>`) behaves as a start tag immediately
/// followed by its end tag.
pub trait XmlReader {
    /// Skips whitespace-only text and returns the kind of the current node.
    fn move_to_content(&mut self) -> Result<NodeKind, XmlError>;

    /// Local name of the current start tag, empty elsewhere.
    fn local_name(&self) -> &str;

    /// Namespace of the current start tag, empty elsewhere.
    fn namespace_uri(&self) -> &str;

    /// Whether the current start tag was written as `<a/>`.
    fn is_empty_element(&self) -> bool;

    /// Attributes of the current start tag, namespace declarations excluded.
    fn attributes(&self) -> &[XmlAttribute];

    /// Resolves `prefix` in the scope of the current start tag.
    /// The empty prefix resolves to the default namespace.
    fn lookup_namespace(&self, prefix: &str) -> Option<&str>;

    /// Moves past the current start tag.
    fn read_start_element(&mut self) -> Result<(), XmlError>;

    /// Moves past the current end tag.
    fn read_end_element(&mut self) -> Result<(), XmlError>;

    /// Reads the text content of the current element and moves past it.
    ///
    /// Child elements are an error.
    fn read_element_content_as_string(&mut self) -> Result<String, XmlError>;

    /// Captures the current element and its subtree and moves past it.
    fn read_subtree(&mut self) -> Result<XmlElement, XmlError>;

    /// Moves past the current node; for a start tag, its whole subtree.
    fn skip(&mut self) -> Result<(), XmlError>;

    /// Location of the current node in the input, if known.
    fn position(&self) -> Option<Position>;

    /// Whether the reader is on a start tag.
    fn is_start_element(&mut self) -> Result<bool, XmlError> {
        Ok(self.move_to_content()? == NodeKind::Element)
    }

    /// Whether the reader is on a start tag named `local_name` in `namespace`.
    fn is_start_element_named(&mut self, local_name: &str, namespace: &str) -> Result<bool, XmlError> {
        Ok(self.is_start_element()?
            && self.local_name() == local_name
            && self.namespace_uri() == namespace)
    }

    /// Value of an attribute of the current start tag.
    fn attribute(&self, local_name: &str, namespace: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|attr| attr.is(local_name, namespace))
            .map(|attr| attr.value.as_str())
    }

    /// Reads the element content as an `xs:boolean`.
    fn read_element_content_as_bool(&mut self) -> Result<bool, XmlError> {
        let position = self.position();
        let text = self.read_element_content_as_string()?;
        match text.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(XmlError::InvalidContent {
                kind: "boolean",
                value: text,
                position,
            }),
        }
    }

    /// Reads the element content as an integer.
    fn read_element_content_as_int(&mut self) -> Result<i64, XmlError> {
        let position = self.position();
        let text = self.read_element_content_as_string()?;
        text.trim().parse().map_err(|_| XmlError::InvalidContent {
            kind: "integer",
            value: text,
            position,
        })
    }
}
