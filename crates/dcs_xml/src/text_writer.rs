use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::{NamespaceDeclaration, XmlError, XmlWriter, ns};

struct Scope {
    qname: String,
    default_namespace: String,
    bindings: Vec<NamespaceDeclaration>,
    generated: usize,
}

/// An [`XmlWriter`] producing text, backed by `quick-xml`.
///
/// Start tags are held back until the first piece of content so attributes
/// and namespace declarations can still be added; an element closed without
/// content is written as `<a/>`.
///
/// # Examples
///
/// ```
/// use dcs_xml::{XmlTextWriter, XmlWriter};
///
/// let mut writer = XmlTextWriter::new();
/// writer.write_start_element(None, "Person", "urn:people").unwrap();
/// writer.write_attribute(None, "lang", "", "en").unwrap();
/// writer.write_start_element(None, "Name", "urn:people").unwrap();
/// writer.write_string("Ann").unwrap();
/// writer.write_end_element().unwrap();
/// writer.write_end_element().unwrap();
///
/// assert_eq!(
///     writer.into_string().unwrap(),
///     r#"<Person xmlns="urn:people" lang="en"><Name>Ann</Name></Person>"#,
/// );
/// ```
pub struct XmlTextWriter {
    inner: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    scopes: Vec<Scope>,
}

impl Default for XmlTextWriter {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTextWriter {
    /// Creates a writer producing compact output.
    pub fn new() -> Self {
        Self::with_indent(false)
    }

    /// Creates a writer, indenting nested elements by two spaces if `indent`.
    pub fn with_indent(indent: bool) -> Self {
        let inner = if indent {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self {
            inner,
            pending: None,
            scopes: Vec::new(),
        }
    }

    /// Returns the document text. Fails if an element is still open.
    pub fn into_string(mut self) -> Result<String, XmlError> {
        self.flush()?;
        if !self.scopes.is_empty() {
            return Err(XmlError::InvalidState("document has unclosed elements"));
        }
        String::from_utf8(self.inner.into_inner()).map_err(|error| XmlError::Write(error.to_string()))
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.inner
            .write_event(event)
            .map_err(|error| XmlError::Write(error.to_string()))
    }

    fn flush(&mut self) -> Result<(), XmlError> {
        match self.pending.take() {
            Some(start) => self.emit(Event::Start(start)),
            None => Ok(()),
        }
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.bindings.iter())
            .find(|decl| decl.prefix == prefix)
            .map(|decl| decl.namespace.as_str())
    }

    fn default_namespace(&self) -> &str {
        self.scopes
            .last()
            .map_or("", |scope| scope.default_namespace.as_str())
    }

    fn declare(&mut self, prefix: &str, namespace: &str) -> Result<(), XmlError> {
        let (Some(start), Some(scope)) = (self.pending.as_mut(), self.scopes.last_mut()) else {
            return Err(XmlError::InvalidState("namespace declared outside of a start tag"));
        };
        if prefix.is_empty() {
            start.push_attribute(("xmlns", namespace));
            scope.default_namespace = namespace.to_owned();
        } else {
            start.push_attribute((format!("xmlns:{prefix}").as_str(), namespace));
        }
        scope
            .bindings
            .push(NamespaceDeclaration::new(prefix, namespace));
        Ok(())
    }

    fn generate_prefix(&mut self, namespace: &str) -> Result<String, XmlError> {
        let depth = self.scopes.len();
        loop {
            let Some(scope) = self.scopes.last_mut() else {
                return Err(XmlError::InvalidState("attribute written outside of a start tag"));
            };
            scope.generated += 1;
            let prefix = format!("d{depth}p{}", scope.generated);
            if self.resolve_prefix(&prefix).is_none() {
                self.declare(&prefix, namespace)?;
                return Ok(prefix);
            }
        }
    }
}

impl XmlWriter for XmlTextWriter {
    fn write_start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: &str,
    ) -> Result<(), XmlError> {
        self.flush()?;

        let prefix = prefix.filter(|prefix| !prefix.is_empty());
        let qname = match prefix {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.to_owned(),
        };
        let needs_declaration = match prefix {
            Some(prefix) => self.resolve_prefix(prefix) != Some(namespace),
            None => self.default_namespace() != namespace,
        };

        let default_namespace = self.default_namespace().to_owned();
        self.pending = Some(BytesStart::new(qname.clone()));
        self.scopes.push(Scope {
            qname,
            default_namespace,
            bindings: Vec::new(),
            generated: 0,
        });

        if needs_declaration {
            self.declare(prefix.unwrap_or(""), namespace)?;
        }
        Ok(())
    }

    fn write_attribute(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: &str,
        value: &str,
    ) -> Result<(), XmlError> {
        if self.pending.is_none() {
            return Err(XmlError::InvalidState("attribute written outside of a start tag"));
        }

        let name = if namespace.is_empty() {
            local_name.to_owned()
        } else if namespace == ns::XMLNS {
            return self.write_namespace_declaration(local_name, value);
        } else if namespace == ns::XML {
            format!("xml:{local_name}")
        } else {
            let prefix = match prefix.filter(|prefix| !prefix.is_empty()) {
                Some(prefix) if self.resolve_prefix(prefix) == Some(namespace) => prefix.to_owned(),
                Some(prefix) if self.resolve_prefix(prefix).is_none() => {
                    self.declare(prefix, namespace)?;
                    prefix.to_owned()
                }
                _ => match self.lookup_prefix(namespace) {
                    Some(prefix) => prefix,
                    None => self.generate_prefix(namespace)?,
                },
            };
            format!("{prefix}:{local_name}")
        };

        if let Some(start) = self.pending.as_mut() {
            start.push_attribute((name.as_str(), value));
        }
        Ok(())
    }

    fn write_namespace_declaration(&mut self, prefix: &str, namespace: &str) -> Result<(), XmlError> {
        let bound = if prefix.is_empty() {
            self.default_namespace() == namespace
        } else {
            self.resolve_prefix(prefix) == Some(namespace)
        };
        if bound {
            return Ok(());
        }
        self.declare(prefix, namespace)
    }

    fn lookup_prefix(&self, namespace: &str) -> Option<String> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.bindings.iter())
            .filter(|decl| !decl.prefix.is_empty() && decl.namespace == namespace)
            .find(|decl| self.resolve_prefix(&decl.prefix) == Some(namespace))
            .map(|decl| decl.prefix.clone())
    }

    #[inline]
    fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn write_string(&mut self, text: &str) -> Result<(), XmlError> {
        self.flush()?;
        self.emit(Event::Text(BytesText::new(text)))
    }

    fn write_end_element(&mut self) -> Result<(), XmlError> {
        let Some(scope) = self.scopes.pop() else {
            return Err(XmlError::InvalidState("no element to close"));
        };
        match self.pending.take() {
            Some(start) => self.emit(Event::Empty(start)),
            None => self.emit(Event::End(BytesEnd::new(scope.qname))),
        }
    }
}
