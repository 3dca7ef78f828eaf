use core::slice::Iter;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{XmlElement, XmlError, XmlNode};

/// Push interface for producing an XML document.
///
/// Attributes and namespace declarations belong to the most recently started
/// element and must be written before any of its content.
pub trait XmlWriter {
    /// Starts an element. With `prefix == None` the element is placed in
    /// `namespace` through the default namespace.
    fn write_start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: &str,
    ) -> Result<(), XmlError>;

    /// Writes an attribute on the open start tag. A namespaced attribute
    /// without a usable prefix gets a generated one.
    fn write_attribute(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: &str,
        value: &str,
    ) -> Result<(), XmlError>;

    /// Declares `prefix` for `namespace` on the open start tag, unless the
    /// same binding is already in scope.
    fn write_namespace_declaration(&mut self, prefix: &str, namespace: &str) -> Result<(), XmlError>;

    /// Finds an in-scope prefix bound to `namespace`.
    fn lookup_prefix(&self, namespace: &str) -> Option<String>;

    /// Number of open elements.
    fn depth(&self) -> usize;

    /// Writes escaped text content.
    fn write_string(&mut self, text: &str) -> Result<(), XmlError>;

    /// Closes the innermost open element.
    fn write_end_element(&mut self) -> Result<(), XmlError>;

    /// Writes bytes as `xs:base64Binary` content.
    fn write_base64(&mut self, bytes: &[u8]) -> Result<(), XmlError> {
        self.write_string(&STANDARD.encode(bytes))
    }

    /// Writes an `xs:boolean`.
    fn write_bool(&mut self, value: bool) -> Result<(), XmlError> {
        self.write_string(if value { "true" } else { "false" })
    }

    /// Writes an integer.
    fn write_int(&mut self, value: i64) -> Result<(), XmlError> {
        self.write_string(&value.to_string())
    }
}

fn open_node<'a, W: XmlWriter + ?Sized>(
    writer: &mut W,
    node: &'a XmlNode,
    open: &mut Vec<Iter<'a, XmlNode>>,
) -> Result<(), XmlError> {
    match node {
        XmlNode::Text(text) => writer.write_string(text),
        XmlNode::Element(element) => open_element(writer, element, open),
    }
}

fn open_element<'a, W: XmlWriter + ?Sized>(
    writer: &mut W,
    element: &'a XmlElement,
    open: &mut Vec<Iter<'a, XmlNode>>,
) -> Result<(), XmlError> {
    writer.write_start_element(
        element.prefix.as_deref(),
        &element.local_name,
        &element.namespace,
    )?;
    for decl in &element.namespace_declarations {
        writer.write_namespace_declaration(&decl.prefix, &decl.namespace)?;
    }
    for attr in &element.attributes {
        writer.write_attribute(
            attr.prefix.as_deref(),
            &attr.local_name,
            &attr.namespace,
            &attr.value,
        )?;
    }
    open.push(element.children.iter());
    Ok(())
}

fn close_open<W: XmlWriter + ?Sized>(
    writer: &mut W,
    mut open: Vec<Iter<'_, XmlNode>>,
) -> Result<(), XmlError> {
    while let Some(children) = open.last_mut() {
        match children.next() {
            Some(child) => open_node(writer, child, &mut open)?,
            None => {
                open.pop();
                writer.write_end_element()?;
            }
        }
    }
    Ok(())
}

/// Writes a captured node back out.
///
/// The traversal keeps its own stack, so arbitrarily deep captured content
/// does not recurse.
pub fn write_node<W: XmlWriter + ?Sized>(writer: &mut W, node: &XmlNode) -> Result<(), XmlError> {
    let mut open = Vec::new();
    open_node(writer, node, &mut open)?;
    close_open(writer, open)
}

/// Writes a captured element back out. See [`write_node`].
pub fn write_element<W: XmlWriter + ?Sized>(
    writer: &mut W,
    element: &XmlElement,
) -> Result<(), XmlError> {
    let mut open = Vec::new();
    open_element(writer, element, &mut open)?;
    close_open(writer, open)
}
