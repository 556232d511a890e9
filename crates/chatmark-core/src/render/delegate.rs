//! Code block delegate: formatted rendering of multi-line code.

use crate::markup::{Element, Node};

/// A multi-line code block handed to a [`CodeBlockDelegate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    /// Stable identity derived from the block's position (`code-{n}`).
    pub key: &'a str,
    /// Language token from the `language-*` class, or empty.
    pub language: &'a str,
    /// Code content with one trailing newline removed.
    pub value: &'a str,
    /// Attributes of the code element other than `class`.
    pub attrs: &'a [(String, String)],
}

/// Renders multi-line code blocks.
///
/// Hosts implement this to plug in syntax highlighting. Functions
/// `Fn(&CodeBlock) -> Node` implement it too.
pub trait CodeBlockDelegate {
    fn render(&self, block: &CodeBlock<'_>) -> Node;
}

impl<F> CodeBlockDelegate for F
where
    F: Fn(&CodeBlock<'_>) -> Node,
{
    fn render(&self, block: &CodeBlock<'_>) -> Node {
        self(block)
    }
}

/// Unhighlighted code block with a language header.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodeBlock;

impl CodeBlockDelegate for PlainCodeBlock {
    fn render(&self, block: &CodeBlock<'_>) -> Node {
        let label = if block.language.is_empty() {
            "text"
        } else {
            block.language
        };

        let mut code = Element::new("code");
        if !block.language.is_empty() {
            code.set_attr("class", format!("language-{}", block.language));
        }
        code.push_text(block.value);

        let mut wrapper = Element::new("div")
            .with_attr("class", "code-block")
            .with_attr("data-key", block.key)
            .with_attr("data-language", block.language);
        for (name, value) in block.attrs {
            wrapper.set_attr(name.as_str(), value.as_str());
        }

        wrapper
            .with_child(
                Element::new("div")
                    .with_attr("class", "code-block-header")
                    .with_child(Element::new("span").with_child(Node::text(label)).into())
                    .into(),
            )
            .with_child(code.into())
            .into()
    }
}
