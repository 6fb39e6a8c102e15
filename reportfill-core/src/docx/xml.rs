//! Lossless element tree over `quick-xml` events.
//!
//! Start tags, text and every other event are kept as the owned events the
//! reader produced, so writing the tree back yields the same markup apart
//! from the nodes that were edited.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::DocxError;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(BytesText<'static>),
    /// Declarations, comments, CDATA, processing instructions.
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub start: BytesStart<'static>,
    pub children: Vec<Node>,
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_owned()),
            children: Vec::new(),
            self_closing: false,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    /// Unescaped value of an attribute, `None` when missing or malformed.
    pub fn attr(&self, key: &str) -> Option<String> {
        let attr = self.start.try_get_attribute(key).ok().flatten()?;
        attr.unescape_value().ok().map(|v| v.into_owned())
    }

    pub fn push(&mut self, node: Node) {
        self.self_closing = false;
        self.children.push(node);
    }

    pub fn push_text(&mut self, text: &str) {
        self.push(Node::Text(BytesText::new(text).into_owned()));
    }

    /// First direct child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|el| el.is(name))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Positions in `children` of the direct child elements named `name`.
    pub fn child_positions(&self, name: &str) -> Vec<usize> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                Node::Element(el) if el.is(name) => Some(i),
                _ => None,
            })
            .collect()
    }

    pub fn element_at(&self, position: usize) -> Option<&Element> {
        match self.children.get(position) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_at_mut(&mut self, position: usize) -> Option<&mut Element> {
        match self.children.get_mut(position) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Concatenated unescaped text of all text nodes below this element.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => match t.unescape() {
                    Ok(s) => out.push_str(&s),
                    Err(_) => out.push_str(&String::from_utf8_lossy(t)),
                },
                Node::Element(el) => out.push_str(&el.text()),
                Node::Other(_) => {}
            }
        }
        out
    }
}

/// A parsed XML part: prolog nodes followed by the root element.
#[derive(Debug, Clone)]
pub struct XmlTree {
    pub nodes: Vec<Node>,
}

impl XmlTree {
    pub fn parse(xml: &[u8]) -> Result<Self, DocxError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();
        let mut top: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf)?;
            let node = match event {
                Event::Start(e) => {
                    stack.push(Element {
                        start: e.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    buf.clear();
                    continue;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        DocxError::Malformed("closing tag without opening tag".into())
                    })?;
                    Node::Element(el)
                }
                Event::Empty(e) => Node::Element(Element {
                    start: e.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Text(t) => Node::Text(t.into_owned()),
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => top.push(node),
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(DocxError::Malformed(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(open.name())
            )));
        }
        Ok(Self { nodes: top })
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), DocxError> {
    match node {
        Node::Element(el) if el.self_closing && el.children.is_empty() => {
            writer.write_event(Event::Empty(el.start.borrow()))?;
        }
        Node::Element(el) => {
            writer.write_event(Event::Start(el.start.borrow()))?;
            for child in &el.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(el.start.to_end()))?;
        }
        Node::Text(t) => writer.write_event(Event::Text(t.clone()))?,
        Node::Other(event) => writer.write_event(event.clone())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_tree_writes_back_identically() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p><!-- note --></w:body></w:document>"#;
        let tree = XmlTree::parse(xml.as_bytes()).unwrap();
        let out = tree.to_bytes().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), xml);
    }

    #[test]
    fn text_is_unescaped() {
        let tree = XmlTree::parse(b"<a><b>x &lt; y</b><c>!</c></a>").unwrap();
        assert_eq!(tree.root().unwrap().text(), "x < y!");
    }

    #[test]
    fn unbalanced_markup_is_rejected() {
        assert!(XmlTree::parse(b"<a><b></a>").is_err());
        assert!(XmlTree::parse(b"<a><b>").is_err());
    }

    #[test]
    fn attributes_are_read_by_qualified_name() {
        let tree = XmlTree::parse(br#"<w:gridSpan w:val="3"/>"#).unwrap();
        let root = tree.root().unwrap();
        assert!(root.is("w:gridSpan"));
        assert_eq!(root.attr("w:val").as_deref(), Some("3"));
        assert_eq!(root.attr("w:missing"), None);
    }
}
