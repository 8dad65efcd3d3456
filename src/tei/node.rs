//! Minimal element tree over `quick-xml` events.
//!
//! TEI extraction needs random access (first descendant `head`, all
//! descendant `p`, direct `div` children), so the streaming reader's events
//! are folded into a small owned tree first. Element and attribute names are
//! stored without namespace prefixes (`xml:id` becomes `id`).

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Character data (entities already resolved)
    Text(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Local element name
    pub name: String,
    /// Attributes as `(local name, value)` pairs, in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Value of the attribute with the given local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// First descendant with the given name, in document order.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.name == name {
                out.push(child);
            }
            child.collect_named(name, out);
        }
    }

    /// Follow a path of direct child names, e.g. `["fileDesc", "titleStmt"]`.
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Concatenated text of this element and all descendants, unmodified.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.push_text(out),
            }
        }
    }
}

/// Parse an XML document into a synthetic root element whose children are
/// the document's top-level nodes.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(XmlElement::from_start(&e)?),
            Event::Empty(e) => {
                let element = XmlElement::from_start(&e)?;
                push_child(&mut stack, XmlNode::Element(element))?;
            },
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(Error::Xml("unbalanced closing tag".to_string()));
                }
                let finished = stack.pop().unwrap_or_default();
                push_child(&mut stack, XmlNode::Element(finished))?;
            },
            Event::Text(e) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                push_child(&mut stack, XmlNode::Text(text))?;
            },
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                push_child(&mut stack, XmlNode::Text(text))?;
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if stack.len() != 1 {
        return Err(Error::Xml(format!("{} unclosed element(s) at end of document", stack.len() - 1)));
    }
    stack.pop().ok_or_else(|| Error::Xml("empty document".to_string()))
}

fn push_child(stack: &mut [XmlElement], node: XmlNode) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| Error::Xml("node outside of document".to_string()))?;
    parent.children.push(node);
    Ok(())
}
