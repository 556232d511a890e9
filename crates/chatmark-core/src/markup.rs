//! Markup tree shared by parsed documents and rendered output.
//!
//! The parser produces a tree of [`Node`]s that mirrors the markdown source;
//! the renderer walks that tree and produces another tree of the same type
//! with the element overrides applied. Either tree can be serialized to HTML
//! with [`Node::to_html`] or to JSON via `serde`.

use serde::Serialize;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    /// Plain text, escaped on output.
    Text(String),
    /// Embedded markup passed through verbatim.
    Raw(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Appends text, merging with a trailing text child.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn raw(html: impl Into<String>) -> Self {
        Node::Raw(html.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::Raw(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serializes the tree to compact HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => escape_text(text, out),
            Node::Raw(html) => out.push_str(html),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');
                if element.is_void() {
                    return;
                }
                for child in &element.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

/// Serializes a sequence of sibling nodes.
pub fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() {
        let node: Node = Element::new("a")
            .with_attr("title", "say \"hi\" & 'bye'")
            .with_child(Node::text("<b>"))
            .into();

        assert_eq!(
            node.to_html(),
            "<a title=\"say &quot;hi&quot; &amp; &#39;bye&#39;\">&lt;b&gt;</a>"
        );
    }

    #[test]
    fn test_raw_passes_through() {
        let node: Node = Element::new("div")
            .with_child(Node::raw("<span class=\"x\">ok</span>"))
            .into();

        assert_eq!(node.to_html(), "<div><span class=\"x\">ok</span></div>");
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let node: Node = Element::new("img").with_attr("src", "a.png").into();
        assert_eq!(node.to_html(), "<img src=\"a.png\">");
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut element = Element::new("img")
            .with_attr("class", "a")
            .with_attr("src", "x");
        element.set_attr("class", "b");

        assert_eq!(
            element.attrs,
            vec![
                ("class".to_string(), "b".to_string()),
                ("src".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_push_text_merges_adjacent_text() {
        let mut element = Element::new("p");
        element.push_text("a");
        element.push_text("b");

        assert_eq!(element.children, vec![Node::text("ab")]);
    }

    #[test]
    fn test_text_content_is_recursive() {
        let node: Node = Element::new("p")
            .with_child(Node::text("a "))
            .with_child(Element::new("em").with_child(Node::text("b")).into())
            .into();

        assert_eq!(node.text_content(), "a b");
    }

    #[test]
    fn test_serializes_to_tagged_json() {
        let node: Node = Element::new("p").with_child(Node::text("hi")).into();
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "element");
        assert_eq!(json["value"]["tag"], "p");
        assert_eq!(json["value"]["children"][0]["type"], "text");
        assert_eq!(json["value"]["children"][0]["value"], "hi");
    }
}
