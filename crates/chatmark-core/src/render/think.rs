//! Collapsible thinking block.

use std::collections::HashMap;

use serde::Serialize;

use super::{RenderContext, THINK_TAG, block_key};
use crate::markup::{Element, Node};

/// Open/closed state of one thinking block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapse {
    #[default]
    Open,
    Closed,
}

impl Collapse {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Collapse::Open => Collapse::Closed,
            Collapse::Closed => Collapse::Open,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, Collapse::Open)
    }

    /// ▲ when open, ▼ when closed.
    pub fn indicator(self) -> &'static str {
        match self {
            Collapse::Open => "▲",
            Collapse::Closed => "▼",
        }
    }
}

/// Collapse state per thinking block, keyed by block key.
///
/// Blocks without an entry are open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseStates {
    states: HashMap<String, Collapse>,
}

impl CollapseStates {
    pub fn get(&self, key: &str) -> Collapse {
        self.states.get(key).copied().unwrap_or_default()
    }

    /// Flips one block and returns its new state.
    pub fn toggle(&mut self, key: &str) -> Collapse {
        let next = self.get(key).toggled();
        self.states.insert(key.to_string(), next);
        next
    }

    /// Drops state for blocks that no longer exist.
    pub fn retain_keys(&mut self, live: &[String]) {
        self.states.retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Keys of all thinking blocks, in document order.
pub fn think_keys(document: &[Node]) -> Vec<String> {
    fn walk(nodes: &[Node], keys: &mut Vec<String>) {
        for node in nodes {
            if let Node::Element(element) = node {
                if element.tag == THINK_TAG {
                    keys.push(block_key(THINK_TAG, keys.len()));
                }
                walk(&element.children, keys);
            }
        }
    }

    let mut keys = Vec::new();
    walk(document, &mut keys);
    keys
}

pub(super) fn render_think(ctx: &RenderContext<'_>, element: Element, key: Option<String>) -> Node {
    let key = key.unwrap_or_default();
    let state = ctx.collapse.get(&key);
    let label = format!(
        "{} {}",
        ctx.config.think.label(ctx.thinking),
        state.indicator()
    );

    let header = Element::new("div")
        .with_attr("class", "cursor-pointer font-bold text-blue-500 hover:underline")
        .with_attr("data-toggle", key)
        .with_attr("aria-expanded", state.is_open().to_string())
        .with_child(Node::text(label));

    let mut block = Element::new("div")
        .with_attr("class", "mb-4")
        .with_child(header.into());

    if state.is_open() {
        block.children.push(
            Element::new("div")
                .with_attr(
                    "class",
                    "mt-2 border-l-4 border-gray-300 pl-4 text-gray-600 dark:text-gray-400",
                )
                .with_children(element.children)
                .into(),
        );
    }

    block.into()
}
