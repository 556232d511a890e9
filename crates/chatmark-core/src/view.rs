//! Per-message view state.
//!
//! A `MessageView` is one rendered message: its content, the thinking flag,
//! the memoized parse of the content, and the collapse state of each thinking
//! block. All state changes go through [`MessageView::update`].

use crate::markdown::parse_markdown;
use crate::markup::Node;
use crate::render::{Collapse, CollapseStates, MarkdownRenderer, think_keys};

/// Events that change a message view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// New message content (e.g. a streamed delta was appended).
    SetContent(String),
    /// Generation started or finished.
    SetThinking(bool),
    /// The header of a thinking block was clicked.
    ToggleThink(String),
}

pub struct MessageView {
    renderer: MarkdownRenderer,
    content: String,
    thinking: bool,
    /// Parsed `content`; only rebuilt when the content changes.
    document: Vec<Node>,
    think_keys: Vec<String>,
    collapse: CollapseStates,
}

impl MessageView {
    pub fn new(content: impl Into<String>, thinking: bool) -> Self {
        Self::with_renderer(MarkdownRenderer::default(), content, thinking)
    }

    pub fn with_renderer(
        renderer: MarkdownRenderer,
        content: impl Into<String>,
        thinking: bool,
    ) -> Self {
        let content = content.into();
        let document = parse_markdown(&content);
        let think_keys = think_keys(&document);
        Self {
            renderer,
            content,
            thinking,
            document,
            think_keys,
            collapse: CollapseStates::default(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn thinking(&self) -> bool {
        self.thinking
    }

    /// Keys of the thinking blocks in the current content.
    pub fn think_keys(&self) -> &[String] {
        &self.think_keys
    }

    pub fn collapse_state(&self, key: &str) -> Collapse {
        self.collapse.get(key)
    }

    /// Applies an event. Returns whether the view needs to be rendered again.
    pub fn update(&mut self, event: ViewEvent) -> bool {
        match event {
            ViewEvent::SetContent(content) => self.set_content(content),
            ViewEvent::SetThinking(thinking) => {
                let changed = self.thinking != thinking;
                self.thinking = thinking;
                changed
            }
            ViewEvent::ToggleThink(key) => {
                if !self.think_keys.contains(&key) {
                    tracing::debug!(%key, "ignoring toggle for unknown thinking block");
                    return false;
                }
                let state = self.collapse.toggle(&key);
                tracing::debug!(%key, ?state, "toggled thinking block");
                true
            }
        }
    }

    fn set_content(&mut self, content: String) -> bool {
        if content == self.content {
            return false;
        }

        self.document = parse_markdown(&content);
        self.content = content;
        self.think_keys = think_keys(&self.document);
        // Blocks that disappeared are unmounted along with their state
        self.collapse.retain_keys(&self.think_keys);

        tracing::trace!(
            bytes = self.content.len(),
            blocks = self.document.len(),
            "reparsed message content"
        );
        true
    }

    /// Renders the memoized document with the current flag and collapse states.
    pub fn render(&self) -> Node {
        self.renderer
            .render(&self.document, self.thinking, &self.collapse)
    }

    pub fn render_html(&self) -> String {
        self.render().to_html()
    }
}
