//! Minimal owned XML tree on top of quick-xml.
//!
//! Reports handled here are small; loading them fully keeps ancestor lookups
//! and re-serialization of fragments simple.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("unexpected closing tag")]
    UnexpectedEnd,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("text outside the root element")]
    StrayText,
    #[error("document has no root element")]
    NoRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, or `""` when absent.
    pub fn attr(&self, name: &str) -> &str {
        self.attribute(name).unwrap_or("")
    }

    /// Name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// Concatenated text of every descendant text node.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Descendants named `name` in document order, excluding `self`.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        self.walk(&mut |el, ancestors| {
            if !ancestors.is_empty() && el.name == name {
                out.push(el);
            }
        });
        out
    }

    /// Visits `self` and every descendant in document order together with
    /// its ancestor chain (outermost first).
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a XmlElement, &[&'a XmlElement])) {
        let mut ancestors = Vec::new();
        self.walk_inner(&mut ancestors, visit);
    }

    fn walk_inner<'a>(
        &'a self,
        ancestors: &mut Vec<&'a XmlElement>,
        visit: &mut dyn FnMut(&'a XmlElement, &[&'a XmlElement]),
    ) {
        visit(self, ancestors);
        ancestors.push(self);
        for child in self.elements() {
            child.walk_inner(ancestors, visit);
        }
        ancestors.pop();
    }

    /// Serializes the element without declaration or indentation.
    pub fn to_xml_string(&self) -> Result<String, String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
    }

    fn write_to<W: io::Write>(&self, writer: &mut Writer<W>) -> Result<(), String> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if self.children.is_empty() {
            return emit(writer, Event::Empty(start));
        }
        emit(writer, Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Text(t) => emit(writer, Event::Text(BytesText::new(t)))?,
                XmlNode::Element(e) => e.write_to(writer)?,
            }
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

pub fn emit<W: io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

pub fn emit_declaration<W: io::Write>(writer: &mut Writer<W>) -> Result<(), String> {
    emit(
        writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )
}

/// Writes `root` as an indented document with an XML declaration.
pub fn write_document<W: io::Write>(out: W, root: &XmlElement) -> Result<(), String> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    emit_declaration(&mut writer)?;
    root.write_to(&mut writer)
}

/// Parses a whole document into its root element. Whitespace-only text is
/// dropped; comments, processing instructions and the declaration are
/// ignored.
pub fn parse(xml: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            XmlError::Syntax(format!("{e} (at byte {})", reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => stack.push(element_from(&e)?),
            Event::Empty(e) => {
                let el = element_from(&e)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::End(_) => {
                let el = stack.pop().ok_or(XmlError::UnexpectedEnd)?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| XmlError::Syntax(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                push_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let mut el = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Syntax(e.to_string()))?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    el: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push(el),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(el),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), XmlError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let parent = stack.last_mut().ok_or(XmlError::StrayText)?;
    parent.children.push(XmlNode::Text(text.to_string()));
    Ok(())
}

/// Whether `c` may appear in XML 1.0 character data.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Whether `name` is usable as an element name.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
