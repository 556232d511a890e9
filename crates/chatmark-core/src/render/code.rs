//! Dispatch for `code` elements: inline code, streaming cursor, or delegated block.

use std::sync::LazyLock;

use regex::Regex;

use super::RenderContext;
use super::delegate::CodeBlock;
use crate::markup::{Element, Node};

/// Streaming cursor glyph.
pub const CURSOR: &str = "▍";

/// Escaped cursor produced when the stream appends the glyph inside code.
const ESCAPED_CURSOR: &str = "`▍`";

static LANGUAGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language-(\w+)").expect("valid regex"));

/// Extracts the language token from a `class` attribute.
///
/// Returns an empty string when there is no `language-*` token.
pub fn detect_language(class: Option<&str>) -> &str {
    class
        .and_then(|class| LANGUAGE_CLASS.captures(class))
        .and_then(|caps| caps.get(1))
        .map_or("", |lang| lang.as_str())
}

/// Text of the first child: a text node, or an element whose only child is text.
fn first_child_text(children: &[Node]) -> Option<&str> {
    match children.first()? {
        Node::Text(text) => Some(text),
        Node::Element(element) => match element.children.as_slice() {
            [Node::Text(text)] => Some(text),
            _ => None,
        },
        Node::Raw(_) => None,
    }
}

/// Pulsing cursor shown while a code fence has just opened.
fn cursor_placeholder() -> Node {
    Element::new("span")
        .with_attr("class", "mt-1 animate-pulse cursor-default")
        .with_child(Node::text(CURSOR))
        .into()
}

pub(super) fn render_code(ctx: &RenderContext<'_>, mut element: Element, key: Option<String>) -> Node {
    let first = first_child_text(&element.children).map(str::to_owned);

    if first.as_deref() == Some(CURSOR) {
        return cursor_placeholder();
    }

    if let Some(text) = &first {
        element.children[0] = Node::text(text.replacen(ESCAPED_CURSOR, CURSOR, 1));
    }

    if first.as_deref().is_some_and(|text| !text.contains('\n')) {
        return element.into();
    }

    let class = element.remove_attr("class");
    let language = detect_language(class.as_deref());

    let content: String = element.children.iter().map(Node::text_content).collect();
    let value = content.strip_suffix('\n').unwrap_or(&content);
    let key = key.unwrap_or_default();

    tracing::trace!(%key, language, lines = value.lines().count(), "delegating code block");

    ctx.delegate.render(&CodeBlock {
        key: &key,
        language,
        value,
        attrs: &element.attrs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::{CodeBlockDelegate, CollapseStates};

    /// Delegate that exposes what it received.
    fn record_block(block: &CodeBlock<'_>) -> Node {
        let mut element = Element::new("delegate")
            .with_attr("key", block.key)
            .with_attr("language", block.language)
            .with_attr("value", block.value);
        for (name, value) in block.attrs {
            element.set_attr(format!("attr-{name}"), value.as_str());
        }
        element.into()
    }

    fn dispatch(element: Element) -> Node {
        let config = Config::default();
        let collapse = CollapseStates::default();
        let delegate: &dyn CodeBlockDelegate = &record_block;
        let ctx = RenderContext {
            thinking: false,
            config: &config,
            delegate,
            collapse: &collapse,
        };
        render_code(&ctx, element, Some("code-7".to_string()))
    }

    fn code(class: Option<&str>, text: &str) -> Element {
        let mut element = Element::new("code");
        if let Some(class) = class {
            element.set_attr("class", class);
        }
        element.with_child(Node::text(text))
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Some("language-python")), "python");
        assert_eq!(detect_language(Some("hljs language-c++")), "c");
        assert_eq!(detect_language(Some("math-inline")), "");
        assert_eq!(detect_language(None), "");
    }

    #[test]
    fn test_single_line_stays_inline() {
        let node = dispatch(code(Some("language-js"), "x=1").with_attr("data-x", "1"));

        assert_eq!(
            node.to_html(),
            "<code class=\"language-js\" data-x=\"1\">x=1</code>"
        );
    }

    #[test]
    fn test_multi_line_is_delegated_with_one_newline_stripped() {
        let node = dispatch(code(Some("language-js"), "console.log(1)\n\n"));
        let element = node.as_element().unwrap();

        assert_eq!(element.tag, "delegate");
        assert_eq!(element.attr("language"), Some("js"));
        assert_eq!(element.attr("value"), Some("console.log(1)\n"));
        assert_eq!(element.attr("key"), Some("code-7"));
    }

    #[test]
    fn test_multi_line_without_trailing_newline_is_kept() {
        let node = dispatch(code(None, "a\nb"));
        let element = node.as_element().unwrap();

        assert_eq!(element.attr("language"), Some(""));
        assert_eq!(element.attr("value"), Some("a\nb"));
    }

    #[test]
    fn test_passthrough_attributes_reach_delegate_without_class() {
        let node = dispatch(code(Some("language-sh"), "ls\npwd\n").with_attr("data-line", "2"));
        let element = node.as_element().unwrap();

        assert_eq!(element.attr("attr-data-line"), Some("2"));
        assert_eq!(element.attr("attr-class"), None);
    }

    #[test]
    fn test_cursor_glyph_renders_placeholder() {
        let element = Element {
            tag: "code".to_string(),
            attrs: vec![("class".to_string(), "language-rust".to_string())],
            children: vec![Node::text(CURSOR), Element::new("em").into()],
        };

        assert_eq!(
            dispatch(element).to_html(),
            "<span class=\"mt-1 animate-pulse cursor-default\">▍</span>"
        );
    }

    #[test]
    fn test_cursor_inside_element_child_renders_placeholder() {
        let element = Element::new("code")
            .with_child(Element::new("span").with_child(Node::text(CURSOR)).into());

        assert_eq!(
            dispatch(element).to_html(),
            "<span class=\"mt-1 animate-pulse cursor-default\">▍</span>"
        );
    }

    #[test]
    fn test_escaped_cursor_is_normalized() {
        let node = dispatch(code(None, "let x = `▍`"));
        assert_eq!(node.to_html(), "<code>let x = ▍</code>");

        let node = dispatch(code(Some("language-py"), "a\n`▍`\n`▍`\n"));
        let element = node.as_element().unwrap();
        assert_eq!(element.attr("value"), Some("a\n▍\n`▍`"));
    }

    #[test]
    fn test_non_text_first_child_is_delegated() {
        let element = Element::new("code").with_child(
            Element::new("span")
                .with_child(Node::text("a"))
                .with_child(Element::new("b").with_child(Node::text("c")).into())
                .into(),
        );
        let node = dispatch(element);
        let element = node.as_element().unwrap();

        assert_eq!(element.tag, "delegate");
        assert_eq!(element.attr("value"), Some("ac"));
    }
}
