//! Chat message markdown rendering.
//!
//! Turns the markdown of one chat message into a markup tree for a web UI,
//! with code blocks handed to a [`CodeBlockDelegate`] and `<think>` sections
//! rendered as collapsible blocks.

pub mod config;
pub mod markdown;
pub mod markup;
pub mod render;
pub mod view;

pub use config::Config;
pub use markup::{Element, Node};
pub use render::{CodeBlock, CodeBlockDelegate, Collapse, MarkdownRenderer, PlainCodeBlock};
pub use view::{MessageView, ViewEvent};

/// Renders a message with default configuration and every thinking block open.
pub fn render_message(content: &str, thinking: bool) -> Node {
    MessageView::new(content, thinking).render()
}

/// Like [`render_message`], serialized to HTML.
pub fn render_message_html(content: &str, thinking: bool) -> String {
    render_message(content, thinking).to_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_message_html_end_to_end() {
        let html = render_message_html(
            "<think>\n\nplan\n\n</think>\n\nUse `x=1`:\n\n```js\nconsole.log(1)\n```",
            false,
        );

        assert!(html.starts_with("<div class=\"prose "));
        assert!(html.contains("思考完毕 ▲"));
        assert!(html.contains("<code>x=1</code>"));
        assert!(html.contains("data-language=\"js\""));
        assert!(html.contains("<code class=\"language-js\">console.log(1)</code>"));
    }

    #[test]
    fn test_empty_content_renders_empty_wrapper() {
        let node = render_message("", true);
        assert!(node.as_element().unwrap().children.is_empty());
    }
}
