//! Element overrides applied to a parsed message.
//!
//! The renderer walks the markup tree produced by [`crate::markdown`] and
//! applies a fixed override table:
//! - `p`: bottom margin, suppressed on the last child
//! - `img`: constrained to two-thirds of the container width
//! - `code`: inline code, streaming cursor, or a delegated code block
//! - `think`: collapsible thinking block
//!
//! Every other element keeps its default mapping.

mod code;
mod delegate;
mod think;

use std::collections::HashMap;
use std::sync::LazyLock;

pub use code::{CURSOR, detect_language};
pub use delegate::{CodeBlock, CodeBlockDelegate, PlainCodeBlock};
pub use think::{Collapse, CollapseStates, think_keys};

use crate::config::Config;
use crate::markup::{Element, Node};

pub(crate) const THINK_TAG: &str = "think";
const CODE_TAG: &str = "code";

/// Stable identity for the `index`-th keyed element of a kind.
pub(crate) fn block_key(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}")
}

/// Inputs shared by every override during one render.
pub(crate) struct RenderContext<'a> {
    pub(crate) thinking: bool,
    pub(crate) config: &'a Config,
    pub(crate) delegate: &'a dyn CodeBlockDelegate,
    pub(crate) collapse: &'a CollapseStates,
}

/// Renders one element whose children are already rendered.
type RenderRule = fn(&RenderContext<'_>, Element, Option<String>) -> Node;

struct Override {
    rule: RenderRule,
    /// Keyed elements get a position-derived identity.
    keyed: bool,
}

static OVERRIDES: LazyLock<HashMap<&'static str, Override>> = LazyLock::new(|| {
    HashMap::from([
        (
            "p",
            Override {
                rule: render_paragraph,
                keyed: false,
            },
        ),
        (
            "img",
            Override {
                rule: render_image,
                keyed: false,
            },
        ),
        (
            CODE_TAG,
            Override {
                rule: code::render_code,
                keyed: true,
            },
        ),
        (
            THINK_TAG,
            Override {
                rule: think::render_think,
                keyed: true,
            },
        ),
    ])
});

fn render_paragraph(_ctx: &RenderContext<'_>, element: Element, _key: Option<String>) -> Node {
    Element::new("p")
        .with_attr("class", "mb-2 last:mb-0")
        .with_children(element.children)
        .into()
}

fn render_image(_ctx: &RenderContext<'_>, element: Element, _key: Option<String>) -> Node {
    let mut img = Element::new("img").with_attr("class", "max-w-[67%]");
    for (name, value) in element.attrs {
        img.set_attr(name, value);
    }
    img.into()
}

/// Renders parsed messages with the override table and a code block delegate.
pub struct MarkdownRenderer {
    config: Config,
    delegate: Box<dyn CodeBlockDelegate + Send + Sync>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            delegate: Box::new(PlainCodeBlock),
        }
    }

    /// Replaces the code block delegate.
    #[must_use]
    pub fn with_delegate(mut self, delegate: impl CodeBlockDelegate + Send + Sync + 'static) -> Self {
        self.delegate = Box::new(delegate);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Renders a parsed document inside the message wrapper element.
    pub fn render(&self, document: &[Node], thinking: bool, collapse: &CollapseStates) -> Node {
        Element::new("div")
            .with_attr("class", self.config.prose_class.as_str())
            .with_children(self.render_nodes(document, thinking, collapse))
            .into()
    }

    /// Renders a parsed document without the wrapper element.
    pub fn render_nodes(
        &self,
        document: &[Node],
        thinking: bool,
        collapse: &CollapseStates,
    ) -> Vec<Node> {
        let ctx = RenderContext {
            thinking,
            config: &self.config,
            delegate: self.delegate.as_ref(),
            collapse,
        };
        let mut walker = Walker::default();
        document
            .iter()
            .map(|node| walker.render(&ctx, node))
            .collect()
    }
}

/// Depth-first walk that numbers keyed elements in document order.
#[derive(Default)]
struct Walker {
    counters: HashMap<&'static str, usize>,
}

impl Walker {
    fn next_key(&mut self, tag: &'static str) -> String {
        let counter = self.counters.entry(tag).or_default();
        let key = block_key(tag, *counter);
        *counter += 1;
        key
    }

    fn render(&mut self, ctx: &RenderContext<'_>, node: &Node) -> Node {
        let Node::Element(element) = node else {
            return node.clone();
        };

        let entry = OVERRIDES.get_key_value(element.tag.as_str());
        // Claimed before children so numbering is pre-order
        let key = entry
            .filter(|(_, over)| over.keyed)
            .map(|(tag, _)| self.next_key(*tag));

        let rendered = Element {
            tag: element.tag.clone(),
            attrs: element.attrs.clone(),
            children: element
                .children
                .iter()
                .map(|child| self.render(ctx, child))
                .collect(),
        };

        match entry {
            Some((_, over)) => (over.rule)(ctx, rendered, key),
            None => rendered.into(),
        }
    }
}
