//! In-memory vector document.
//!
//! A minimal SVG element tree. The renderer builds one, the frame compositor wraps it in a
//! larger one, and both the SVG download and the rasterizer serialize the same tree, so no
//! stage ever edits markup as text.

use std::fmt;

/// A child of an [`Element`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An SVG element with ordered attributes.
///
/// Attribute order is insertion order, which keeps serialization byte-stable.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style numeric attribute, formatted with [`fmt_num`].
    pub fn num(self, key: impl Into<String>, value: f64) -> Self {
        self.attr(key, fmt_num(value))
    }

    /// Sets an attribute, replacing any previous value in place.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        let key = key.into();
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.retain(|(k, _)| k != key);
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Builder-style child append.
    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder-style text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn extend(&mut self, children: impl IntoIterator<Item = Element>) {
        self.children.extend(children.into_iter().map(Node::Element));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search for descendants (including `self`) with the given tag name.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
        }
        for el in self.elements() {
            el.collect_named(name, found);
        }
    }

    /// Concatenated text content of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => out.push_str(&el.text_content()),
            }
        }
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            escape_into(v, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Element(el) => el.write_to(out),
                Node::Text(t) => escape_into(t, out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A standalone SVG document with a known pixel size.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    root: Element,
}

impl SvgDocument {
    /// Creates an empty document whose viewBox matches its size.
    pub fn new(width: f64, height: f64) -> Self {
        let root = Element::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("xmlns:xlink", "http://www.w3.org/1999/xlink")
            .attr("version", "1.1")
            .num("width", width)
            .num("height", height)
            .attr("viewBox", format!("0 0 {} {}", fmt_num(width), fmt_num(height)));
        Self { width, height, root }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn push(&mut self, child: Element) {
        self.root.push(child);
    }

    /// Turns the document into a nested `<svg>` placed at `(x, y)` in a parent document,
    /// keeping its own viewBox so it is never rescaled.
    pub fn into_nested(self, x: f64, y: f64) -> Element {
        let mut root = self.root;
        root.remove_attr("xmlns");
        root.remove_attr("xmlns:xlink");
        root.remove_attr("version");
        root.set_attr("x", fmt_num(x));
        root.set_attr("y", fmt_num(y));
        root
    }

    /// Serialized markup, with an XML declaration and Unix newlines.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.root.write_to(&mut out);
        out.push('\n');
        out
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg_string())
    }
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}
