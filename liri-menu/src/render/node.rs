//! Presentation tree
//!
//! Transient, owned node trees produced by the renderer. Serialization to
//! HTML is the only concrete mapping; anything else (a live DOM, a
//! templating engine) is a host adapter concern.

use std::fmt::Write;

/// A presentation node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and a class list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    /// Add space-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.child(Node::Text(text.to_string()))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Every element (depth-first, document order) carrying `class`
    pub fn find_by_class<'a>(&'a self, class: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if e.has_class(class) {
                found.push(e);
            }
        });
        found
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Node::Element(e) = self {
            visit(e);
            for child in &e.children {
                child.walk(visit);
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&escape(t)),
            Node::Element(e) => {
                out.push('<');
                out.push_str(e.tag);
                if !e.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape(&e.classes.join(" ")));
                }
                for (name, value) in &e.attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {}", name);
                    } else {
                        let _ = write!(out, " {}=\"{}\"", name, escape(value));
                    }
                }
                out.push('>');
                for child in &e.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }
}

/// Escape text for use in HTML content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
