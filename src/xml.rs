//! Lossless XML tree for OOXML parts
//!
//! WordprocessingML parts carry far more markup than this tool models
//! (revision ids, proofing marks, namespace declarations, drawing payloads).
//! Instead of mapping the schema, this module parses a part into a generic
//! element tree and serializes it back, preserving everything it does not
//! understand byte-for-byte in meaning: element order, attributes, text,
//! CDATA, comments, and processing instructions.

use anyhow::{Result, bail};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// One node in the tree. Only `Element` and `Text` occur in practice in
/// Word-generated parts; the rest are kept so arbitrary producers round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its qualified name (prefix included, e.g. `w:rPr`),
/// attributes in document order, and child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing an existing value in place so attribute
    /// order is stable across repeated applications.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value.to_string();
        } else {
            self.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// First child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Mutable variant of [`XmlElement::child`].
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Iterator over direct child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text content of this element's direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A parsed part: the optional XML declaration plus the document element.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlTree {
    pub decl: Option<Declaration>,
    pub root: XmlElement,
}

/// The pieces of an `<?xml ...?>` declaration worth keeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// Parses a full XML part into a tree.
///
/// Whitespace is preserved as-is (Word relies on `xml:space` rather than
/// pretty-printing, so stray whitespace is significant until proven not).
pub fn parse(xml: &str) -> Result<XmlTree> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut decl = None;
    let mut root: Option<XmlElement> = None;
    // Open elements, outermost first. The document element sits at depth 0.
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Decl(e) => {
                let version = String::from_utf8_lossy(e.version()?.as_ref()).into_owned();
                let encoding = match e.encoding() {
                    Some(enc) => Some(String::from_utf8_lossy(enc?.as_ref()).into_owned()),
                    None => None,
                };
                let standalone = match e.standalone() {
                    Some(sa) => Some(String::from_utf8_lossy(sa?.as_ref()).into_owned()),
                    None => None,
                };
                decl = Some(Declaration {
                    version,
                    encoding,
                    standalone,
                });
            }
            Event::Start(e) => {
                stack.push(element_from_start(&e)?);
            }
            Event::Empty(e) => {
                let elem = element_from_start(&e)?;
                attach(&mut stack, &mut root, XmlNode::Element(elem))?;
            }
            Event::End(e) => {
                let Some(elem) = stack.pop() else {
                    bail!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    );
                };
                attach(&mut stack, &mut root, XmlNode::Element(elem))?;
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                // Whitespace between top-level constructs is not content.
                if !stack.is_empty() {
                    attach(&mut stack, &mut root, XmlNode::Text(text))?;
                }
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                attach(&mut stack, &mut root, XmlNode::CData(text))?;
            }
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if !stack.is_empty() {
                    attach(&mut stack, &mut root, XmlNode::Comment(text))?;
                }
            }
            Event::PI(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if !stack.is_empty() {
                    attach(&mut stack, &mut root, XmlNode::ProcessingInstruction(text))?;
                }
            }
            Event::Eof => break,
            Event::DocType(_) => {
                // Word never emits DOCTYPEs in package parts.
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        bail!("unterminated element <{}>", stack[stack.len() - 1].name);
    }
    let Some(root) = root else {
        bail!("document has no root element");
    };

    Ok(XmlTree { decl, root })
}

/// Serializes a tree back into bytes suitable for storing in the package.
pub fn serialize(tree: &XmlTree) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    if let Some(decl) = &tree.decl {
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
    }
    write_element(&mut writer, &tree.root)?;

    Ok(writer.into_inner())
}

fn element_from_start(e: &BytesStart<'_>) -> Result<XmlElement> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut elem = XmlElement::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        elem.attributes.push((key, value));
    }
    Ok(elem)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        XmlNode::Element(elem) => {
            if root.is_some() {
                bail!("multiple root elements");
            }
            *root = Some(elem);
            Ok(())
        }
        // Comments/PIs outside the root were filtered by the caller.
        _ => Ok(()),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, elem: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (key, value) in &elem.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if elem.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &elem.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            XmlNode::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            XmlNode::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
            XmlNode::ProcessingInstruction(t) => {
                writer.write_event(Event::PI(quick_xml::events::BytesPI::new(t.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(elem.name.as_str())))?;

    Ok(())
}
