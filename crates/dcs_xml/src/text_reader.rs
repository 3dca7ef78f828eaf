use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::{NamespaceDeclaration, NodeKind, Position, XmlAttribute, XmlElement, XmlError};
use crate::{XmlNode, XmlReader, ns};

// -----------------------------------------------------------------------------
// Tokens

#[derive(Debug)]
struct StartTag {
    prefix: Option<String>,
    local_name: String,
    namespace: String,
    attributes: Vec<XmlAttribute>,
    declarations: Vec<NamespaceDeclaration>,
    // Every binding visible on this tag, innermost first.
    scope: Arc<[NamespaceDeclaration]>,
    empty: bool,
}

#[derive(Debug)]
enum Token {
    Start(Box<StartTag>),
    End,
    Text(String),
    Eof,
}

fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

fn resolve<'a>(scope: &'a [NamespaceDeclaration], prefix: &str) -> Option<&'a str> {
    if prefix == "xml" {
        return Some(ns::XML);
    }
    scope
        .iter()
        .find(|decl| decl.prefix == prefix)
        .map(|decl| decl.namespace.as_str())
}

fn is_xml_whitespace(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

// -----------------------------------------------------------------------------
// XmlTextReader

/// An [`XmlReader`] over an in-memory document, backed by `quick-xml`.
///
/// The document is tokenized up front: syntax errors, unbalanced tags and
/// undeclared prefixes are reported by [`XmlTextReader::new`]. Namespace
/// scopes are resolved during tokenization so that every start tag carries
/// its own bindings.
///
/// # Examples
///
/// ```
/// use dcs_xml::{XmlReader, XmlTextReader};
///
/// let mut reader = XmlTextReader::new(r#"<a xmlns="urn:x"><b>text</b></a>"#).unwrap();
///
/// assert!(reader.is_start_element_named("a", "urn:x").unwrap());
/// reader.read_start_element().unwrap();
/// assert_eq!(reader.local_name(), "b");
/// assert!(reader.is_start_element_named("b", "urn:x").unwrap());
/// assert_eq!(reader.read_element_content_as_string().unwrap(), "text");
/// reader.read_end_element().unwrap();
/// ```
#[derive(Debug)]
pub struct XmlTextReader {
    tokens: Vec<Token>,
    offsets: Vec<usize>,
    line_starts: Vec<usize>,
    cursor: usize,
}

impl XmlTextReader {
    /// Tokenizes `input`.
    pub fn new(input: &str) -> Result<Self, XmlError> {
        let line_starts: Vec<usize> = core::iter::once(0)
            .chain(input.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        let mut this = Self {
            tokens: Vec::new(),
            offsets: Vec::new(),
            line_starts,
            cursor: 0,
        };
        this.tokenize(input)?;
        Ok(this)
    }

    fn position_of(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        Position {
            line,
            column: offset - line_start + 1,
        }
    }

    fn syntax(&self, message: impl ToString, offset: usize) -> XmlError {
        XmlError::Syntax {
            message: message.to_string(),
            position: Some(self.position_of(offset)),
        }
    }

    fn push(&mut self, token: Token, offset: usize) {
        if let Token::Text(text) = &token
            && let Some(Token::Text(previous)) = self.tokens.last_mut()
        {
            previous.push_str(text);
            return;
        }
        self.tokens.push(token);
        self.offsets.push(offset);
    }

    fn tokenize(&mut self, input: &str) -> Result<(), XmlError> {
        let mut reader = Reader::from_str(input);
        let mut scopes: Vec<Arc<[NamespaceDeclaration]>> = vec![Arc::from(Vec::new())];

        loop {
            let offset = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|error| self.syntax(error, reader.buffer_position() as usize))?;
            match event {
                Event::Start(start) => {
                    let tag = self.start_tag(&start, &scopes, offset, false)?;
                    scopes.push(tag.scope.clone());
                    self.push(Token::Start(Box::new(tag)), offset);
                }
                Event::Empty(start) => {
                    let tag = self.start_tag(&start, &scopes, offset, true)?;
                    self.push(Token::Start(Box::new(tag)), offset);
                    self.push(Token::End, offset);
                }
                Event::End(_) => {
                    scopes.pop();
                    self.push(Token::End, offset);
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|error| self.syntax(error, offset))?;
                    self.push(Token::Text(text.into_owned()), offset);
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|error| self.syntax(error, offset))?;
                    self.push(Token::Text(text), offset);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if scopes.len() != 1 {
            return Err(self.syntax("unexpected end of document", input.len()));
        }
        self.push(Token::Eof, input.len());
        Ok(())
    }

    fn start_tag(
        &self,
        start: &BytesStart<'_>,
        scopes: &[Arc<[NamespaceDeclaration]>],
        offset: usize,
        empty: bool,
    ) -> Result<StartTag, XmlError> {
        let qname = core::str::from_utf8(start.name().as_ref())
            .map_err(|error| self.syntax(error, offset))?
            .to_owned();

        let mut declarations = Vec::new();
        let mut raw = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|error| self.syntax(error, offset))?;
            let key = core::str::from_utf8(attribute.key.as_ref())
                .map_err(|error| self.syntax(error, offset))?
                .to_owned();
            let value = attribute
                .unescape_value()
                .map_err(|error| self.syntax(error, offset))?
                .into_owned();
            if key == "xmlns" {
                declarations.push(NamespaceDeclaration::new("", value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push(NamespaceDeclaration::new(prefix, value));
            } else {
                raw.push((key, value));
            }
        }

        let parent = scopes.last().cloned().unwrap_or_else(|| Arc::from(Vec::new()));
        let scope: Arc<[NamespaceDeclaration]> = if declarations.is_empty() {
            parent
        } else {
            declarations.iter().chain(parent.iter()).cloned().collect()
        };

        let unbound = |prefix: &str| XmlError::UnboundPrefix {
            prefix: prefix.to_owned(),
            position: Some(self.position_of(offset)),
        };

        let (prefix, local_name) = split_qname(&qname);
        let namespace = match prefix {
            Some(prefix) => resolve(&scope, prefix).ok_or_else(|| unbound(prefix))?,
            None => resolve(&scope, "").unwrap_or(""),
        }
        .to_owned();

        let mut attributes = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let (prefix, local) = split_qname(&key);
            let namespace = match prefix {
                Some(prefix) => resolve(&scope, prefix).ok_or_else(|| unbound(prefix))?,
                None => "",
            };
            attributes.push(XmlAttribute {
                prefix: prefix.map(str::to_owned),
                local_name: local.to_owned(),
                namespace: namespace.to_owned(),
                value,
            });
        }

        Ok(StartTag {
            prefix: prefix.map(str::to_owned),
            local_name: local_name.to_owned(),
            namespace,
            attributes,
            declarations,
            scope,
            empty,
        })
    }

    #[inline]
    fn current(&self) -> &Token {
        // The token list always ends with `Eof` and the cursor never passes it.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    #[inline]
    fn current_start(&self) -> Option<&StartTag> {
        match self.current() {
            Token::Start(tag) => Some(tag),
            _ => None,
        }
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
    }

    fn describe_current(&self) -> String {
        match self.current() {
            Token::Start(tag) => format!("element `{}` from namespace `{}`", tag.local_name, tag.namespace),
            Token::End => "end element".to_owned(),
            Token::Text(_) => "text".to_owned(),
            Token::Eof => "end of document".to_owned(),
        }
    }

    fn unexpected(&self, expected: &'static str) -> XmlError {
        XmlError::UnexpectedNode {
            expected,
            found: self.describe_current(),
            position: self.position(),
        }
    }

    fn capture_start(tag: &StartTag) -> XmlElement {
        XmlElement {
            prefix: tag.prefix.clone(),
            local_name: tag.local_name.clone(),
            namespace: tag.namespace.clone(),
            namespace_declarations: tag.declarations.clone(),
            attributes: tag.attributes.clone(),
            children: Vec::new(),
        }
    }
}

impl XmlReader for XmlTextReader {
    fn move_to_content(&mut self) -> Result<NodeKind, XmlError> {
        loop {
            return Ok(match self.current() {
                Token::Text(text) if is_xml_whitespace(text) => {
                    self.advance();
                    continue;
                }
                Token::Start(_) => NodeKind::Element,
                Token::End => NodeKind::EndElement,
                Token::Text(_) => NodeKind::Text,
                Token::Eof => NodeKind::Eof,
            });
        }
    }

    fn local_name(&self) -> &str {
        self.current_start().map_or("", |tag| tag.local_name.as_str())
    }

    fn namespace_uri(&self) -> &str {
        self.current_start().map_or("", |tag| tag.namespace.as_str())
    }

    fn is_empty_element(&self) -> bool {
        self.current_start().is_some_and(|tag| tag.empty)
    }

    fn attributes(&self) -> &[XmlAttribute] {
        self.current_start().map_or(&[], |tag| tag.attributes.as_slice())
    }

    fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        match self.current_start() {
            Some(tag) => resolve(&tag.scope, prefix),
            None if prefix == "xml" => Some(ns::XML),
            None => None,
        }
    }

    fn read_start_element(&mut self) -> Result<(), XmlError> {
        if self.move_to_content()? != NodeKind::Element {
            return Err(self.unexpected("start element"));
        }
        self.advance();
        Ok(())
    }

    fn read_end_element(&mut self) -> Result<(), XmlError> {
        if self.move_to_content()? != NodeKind::EndElement {
            return Err(self.unexpected("end element"));
        }
        self.advance();
        Ok(())
    }

    fn read_element_content_as_string(&mut self) -> Result<String, XmlError> {
        self.read_start_element()?;
        let mut content = String::new();
        loop {
            match self.current() {
                Token::Text(text) => {
                    content.push_str(text);
                    self.advance();
                }
                Token::End => {
                    self.advance();
                    return Ok(content);
                }
                Token::Start(_) | Token::Eof => return Err(self.unexpected("text content")),
            }
        }
    }

    fn read_subtree(&mut self) -> Result<XmlElement, XmlError> {
        if self.move_to_content()? != NodeKind::Element {
            return Err(self.unexpected("start element"));
        }
        let mut open: Vec<XmlElement> = Vec::new();
        loop {
            match self.current() {
                Token::Start(tag) => open.push(Self::capture_start(tag)),
                Token::Text(text) => {
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(XmlNode::Text(text.clone()));
                    }
                }
                Token::End => {
                    let Some(done) = open.pop() else {
                        return Err(self.unexpected("start element"));
                    };
                    match open.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(done)),
                        None => {
                            self.advance();
                            return Ok(done);
                        }
                    }
                }
                Token::Eof => return Err(self.unexpected("end element")),
            }
            self.advance();
        }
    }

    fn skip(&mut self) -> Result<(), XmlError> {
        match self.move_to_content()? {
            NodeKind::Element => {
                let mut depth = 0_usize;
                loop {
                    match self.current() {
                        Token::Start(_) => depth += 1,
                        Token::End => depth -= 1,
                        Token::Text(_) => {}
                        Token::Eof => return Err(self.unexpected("end element")),
                    }
                    self.advance();
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
            NodeKind::Eof => Ok(()),
            NodeKind::EndElement | NodeKind::Text => {
                self.advance();
                Ok(())
            }
        }
    }

    fn position(&self) -> Option<Position> {
        let offset = *self.offsets.get(self.cursor)?;
        Some(self.position_of(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_resolve_per_element() {
        let xml = r#"<root xmlns="urn:a" xmlns:p="urn:p"><p:child p:attr="1" plain="2"/><inner xmlns="urn:b"/></root>"#;
        let mut reader = XmlTextReader::new(xml).unwrap();

        assert!(reader.is_start_element_named("root", "urn:a").unwrap());
        assert_eq!(reader.lookup_namespace("p"), Some("urn:p"));
        reader.read_start_element().unwrap();

        assert!(reader.is_start_element_named("child", "urn:p").unwrap());
        assert!(reader.is_empty_element());
        assert_eq!(reader.attribute("attr", "urn:p"), Some("1"));
        assert_eq!(reader.attribute("plain", ""), Some("2"));
        reader.skip().unwrap();

        assert!(reader.is_start_element_named("inner", "urn:b").unwrap());
        reader.read_start_element().unwrap();
        reader.read_end_element().unwrap();
        reader.read_end_element().unwrap();
        assert_eq!(reader.move_to_content().unwrap(), NodeKind::Eof);
    }

    #[test]
    fn undeclared_prefix_is_rejected() {
        let error = XmlTextReader::new("<x:a/>").unwrap_err();
        assert!(matches!(error, XmlError::UnboundPrefix { ref prefix, .. } if prefix == "x"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        assert!(matches!(
            XmlTextReader::new("<a><b></a>"),
            Err(XmlError::Syntax { .. })
        ));
        assert!(matches!(
            XmlTextReader::new("<a><b>"),
            Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn subtree_capture_keeps_structure() {
        let xml = r#"<a xmlns:q="urn:q"><q:b q:x="1">one<c/>two</q:b><d/></a>"#;
        let mut reader = XmlTextReader::new(xml).unwrap();
        reader.read_start_element().unwrap();

        let captured = reader.read_subtree().unwrap();
        assert_eq!(captured.prefix.as_deref(), Some("q"));
        assert_eq!(captured.namespace, "urn:q");
        assert_eq!(captured.attribute("x", "urn:q"), Some("1"));
        assert_eq!(captured.text(), "onetwo");
        assert_eq!(captured.element_count(), 2);

        assert!(reader.is_start_element_named("d", "").unwrap());
    }

    #[test]
    fn text_content_and_positions() {
        let xml = "<a>\n  <b>x &amp; y</b>\n  <c><d/></c>\n</a>";
        let mut reader = XmlTextReader::new(xml).unwrap();
        reader.read_start_element().unwrap();
        reader.move_to_content().unwrap();
        assert_eq!(reader.position().map(|position| position.line), Some(2));
        assert_eq!(reader.read_element_content_as_string().unwrap(), "x & y");

        let error = reader.read_element_content_as_string().unwrap_err();
        assert!(matches!(error, XmlError::UnexpectedNode { .. }));
    }

    #[test]
    fn typed_content() {
        let mut reader = XmlTextReader::new("<r><a>1</a><b> 42 </b><c>yes</c></r>").unwrap();
        reader.read_start_element().unwrap();
        assert!(reader.read_element_content_as_bool().unwrap());
        assert_eq!(reader.read_element_content_as_int().unwrap(), 42);
        assert!(matches!(
            reader.read_element_content_as_bool(),
            Err(XmlError::InvalidContent { kind: "boolean", .. })
        ));
    }
}
