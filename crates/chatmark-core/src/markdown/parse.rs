use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};

use super::think::{RawSegment, split_think_tags};
use crate::markup::{Element, Node};

const DISPLAY_MATH_CLASS: &str = "language-math math-display";

/// Parser options: GFM tables, strikethrough, task lists, footnotes, alerts, and math.
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_GFM);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Parses markdown text into a markup tree.
///
/// This is the parse half of the renderer:
/// - Parses markdown using pulldown-cmark
/// - Converts events to elements with the default element mapping
/// - Passes raw markup through, turning `<think>` tags into `think` elements
///
/// Never fails; malformed input is handled by pulldown-cmark's recovery.
pub fn parse_markdown(text: &str) -> Vec<Node> {
    if text.is_empty() {
        return Vec::new();
    }

    let parser = Parser::new_ext(text, parser_options());
    let mut builder = TreeBuilder::new();

    for event in parser {
        builder.process_event(event);
    }

    builder.finish()
}

/// How an open element is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Closed by the matching markdown end tag.
    Block,
    /// Closed together with the enclosing `Block` (e.g. `code` inside `pre`).
    Inner,
    /// Opened by `<think>`, closed by `</think>` or its enclosing block.
    Think,
}

#[derive(Debug)]
struct Frame {
    element: Element,
    kind: FrameKind,
}

/// Image being collected; its text events become the `alt` attribute.
#[derive(Debug)]
struct ImageCapture {
    element: Element,
    alt: String,
    /// Nested images inside alt text.
    depth: usize,
}

#[derive(Debug, Default)]
struct TableState {
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
    body_open: bool,
}

/// Internal state for building the tree from parser events.
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
    image: Option<ImageCapture>,
    table: TableState,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            image: None,
            table: TableState::default(),
        }
    }

    fn process_event(&mut self, event: Event) {
        if self.image.is_some() {
            self.process_image_event(event);
            return;
        }

        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                self.attach(Element::new("code").with_child(Node::text(code.as_ref())).into());
            }
            Event::InlineMath(math) => {
                self.attach(
                    Element::new("code")
                        .with_attr("class", "language-math math-inline")
                        .with_child(Node::text(math.as_ref()))
                        .into(),
                );
            }
            Event::DisplayMath(math) => {
                // Newlines hugging the `$$` fences are not part of the formula
                let math = math.strip_prefix('\n').unwrap_or(&math);
                let math = math.strip_suffix('\n').unwrap_or(math);
                self.attach(
                    Element::new("code")
                        .with_attr("class", DISPLAY_MATH_CLASS)
                        .with_child(Node::text(math))
                        .into(),
                );
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.add_raw(&raw),
            Event::FootnoteReference(label) => {
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{label}"))
                    .with_child(Node::text(label.as_ref()));
                self.attach(
                    Element::new("sup")
                        .with_attr("class", "footnote-reference")
                        .with_child(link.into())
                        .into(),
                );
            }
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.attach(Element::new("br").into()),
            Event::Rule => self.attach(Element::new("hr").into()),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => self.open(Element::new("p"), FrameKind::Block),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut element = Element::new(heading_tag(level));
                if let Some(id) = id {
                    element.set_attr("id", id.as_ref());
                }
                if !classes.is_empty() {
                    let joined: Vec<String> = classes.iter().map(ToString::to_string).collect();
                    element.set_attr("class", joined.join(" "));
                }
                for (name, value) in attrs {
                    element.set_attr(name.as_ref(), value.as_deref().unwrap_or(""));
                }
                self.open(element, FrameKind::Block);
            }
            Tag::BlockQuote(kind) => {
                let mut element = Element::new("blockquote");
                if let Some(kind) = kind {
                    element.set_attr("class", format!("markdown-alert-{}", alert_name(kind)));
                }
                self.open(element, FrameKind::Block);
            }
            Tag::CodeBlock(kind) => {
                self.open(Element::new("pre"), FrameKind::Block);
                let mut code = Element::new("code");
                // Only the first word of the info string names the language
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(lang) = info.split_whitespace().next()
                {
                    code.set_attr("class", format!("language-{lang}"));
                }
                self.open(code, FrameKind::Inner);
            }
            Tag::HtmlBlock => {
                // Raw lines arrive as Html events
            }
            Tag::List(start) => {
                let element = match start {
                    Some(1) => Element::new("ol"),
                    Some(n) => Element::new("ol").with_attr("start", n.to_string()),
                    None => Element::new("ul"),
                };
                self.open(element, FrameKind::Block);
            }
            Tag::Item => self.open(Element::new("li"), FrameKind::Block),
            Tag::FootnoteDefinition(label) => {
                let element = Element::new("div")
                    .with_attr("class", "footnote-definition")
                    .with_attr("id", format!("fn-{label}"))
                    .with_child(
                        Element::new("sup")
                            .with_attr("class", "footnote-definition-label")
                            .with_child(Node::text(label.as_ref()))
                            .into(),
                    );
                self.open(element, FrameKind::Block);
            }
            Tag::DefinitionList => self.open(Element::new("dl"), FrameKind::Block),
            Tag::DefinitionListTitle => self.open(Element::new("dt"), FrameKind::Block),
            Tag::DefinitionListDefinition => self.open(Element::new("dd"), FrameKind::Block),
            Tag::Table(alignments) => {
                self.table = TableState {
                    alignments,
                    ..TableState::default()
                };
                self.open(Element::new("table"), FrameKind::Block);
            }
            Tag::TableHead => {
                self.table.in_head = true;
                self.table.column = 0;
                self.open(Element::new("thead"), FrameKind::Block);
                self.open(Element::new("tr"), FrameKind::Inner);
            }
            Tag::TableRow => {
                if !self.table.body_open {
                    self.table.body_open = true;
                    self.open(Element::new("tbody"), FrameKind::Inner);
                }
                self.table.column = 0;
                self.open(Element::new("tr"), FrameKind::Block);
            }
            Tag::TableCell => {
                let mut cell = Element::new(if self.table.in_head { "th" } else { "td" });
                if let Some(align) = self
                    .table
                    .alignments
                    .get(self.table.column)
                    .and_then(|align| alignment_name(*align))
                {
                    cell.set_attr("style", format!("text-align: {align}"));
                }
                self.open(cell, FrameKind::Block);
            }
            Tag::Emphasis => self.open(Element::new("em"), FrameKind::Block),
            Tag::Strong => self.open(Element::new("strong"), FrameKind::Block),
            Tag::Strikethrough => self.open(Element::new("del"), FrameKind::Block),
            Tag::Superscript => self.open(Element::new("sup"), FrameKind::Block),
            Tag::Subscript => self.open(Element::new("sub"), FrameKind::Block),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut element = Element::new("a").with_attr("href", dest_url.as_ref());
                if !title.is_empty() {
                    element.set_attr("title", title.as_ref());
                }
                self.open(element, FrameKind::Block);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut element = Element::new("img").with_attr("src", dest_url.as_ref());
                if !title.is_empty() {
                    element.set_attr("title", title.as_ref());
                }
                self.image = Some(ImageCapture {
                    element,
                    alt: String::new(),
                    depth: 0,
                });
            }
            Tag::MetadataBlock(_) => {
                // Not enabled in parser_options
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) | TagEnd::Image => {}
            TagEnd::Paragraph => self.end_paragraph(),
            TagEnd::TableHead => {
                self.end_block();
                self.table.in_head = false;
            }
            TagEnd::TableCell => {
                self.end_block();
                self.table.column += 1;
            }
            TagEnd::Table => {
                self.end_block();
                self.table = TableState::default();
            }
            _ => self.end_block(),
        }
    }

    /// A paragraph holding only display math becomes a `pre` block, like a fence.
    fn end_paragraph(&mut self) {
        let math_only = self.stack.last().is_some_and(|frame| {
            frame.kind == FrameKind::Block
                && frame.element.tag == "p"
                && matches!(
                    frame.element.children.as_slice(),
                    [Node::Element(code)] if code.attr("class") == Some(DISPLAY_MATH_CLASS)
                )
        });

        if !math_only {
            self.end_block();
            return;
        }

        if let Some(frame) = self.stack.pop() {
            self.attach(
                Element::new("pre")
                    .with_children(frame.element.children)
                    .into(),
            );
        }
    }

    /// Routes events while an image is open: text becomes alt text.
    fn process_image_event(&mut self, event: Event) {
        let Some(capture) = self.image.as_mut() else {
            return;
        };

        match event {
            Event::Start(Tag::Image { .. }) => capture.depth += 1,
            Event::End(TagEnd::Image) => {
                if capture.depth > 0 {
                    capture.depth -= 1;
                } else {
                    self.finish_image();
                }
            }
            Event::Text(text)
            | Event::Code(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text)
            | Event::InlineHtml(text)
            | Event::Html(text) => capture.alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => capture.alt.push(' '),
            _ => {}
        }
    }

    fn finish_image(&mut self) {
        if let Some(capture) = self.image.take() {
            let mut element = capture.element;
            // alt goes right after src
            element.attrs.insert(1, ("alt".to_string(), capture.alt));
            self.attach(element.into());
        }
    }

    fn open(&mut self, element: Element, kind: FrameKind) {
        self.stack.push(Frame { element, kind });
    }

    /// Pops the top frame and attaches its element to the new top.
    fn close_top(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.attach(frame.element.into());
        }
    }

    /// Closes the innermost markdown block, along with anything still open inside it.
    fn end_block(&mut self) {
        while self
            .stack
            .last()
            .is_some_and(|frame| frame.kind != FrameKind::Block)
        {
            self.close_top();
        }
        self.close_top();
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.element.children.push(node),
            None => self.root.push(node),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.stack.last_mut() {
            Some(frame) => frame.element.push_text(text),
            None => {
                if let Some(Node::Text(last)) = self.root.last_mut() {
                    last.push_str(text);
                } else {
                    self.root.push(Node::text(text));
                }
            }
        }
    }

    fn add_raw(&mut self, raw: &str) {
        for segment in split_think_tags(raw) {
            match segment {
                RawSegment::Open => self.open(Element::new("think"), FrameKind::Think),
                RawSegment::Close => self.close_think(),
                RawSegment::Html(html) => self.push_raw(html),
            }
        }
    }

    fn push_raw(&mut self, html: &str) {
        let children = match self.stack.last_mut() {
            Some(frame) => &mut frame.element.children,
            None => &mut self.root,
        };
        if let Some(Node::Raw(last)) = children.last_mut() {
            last.push_str(html);
        } else {
            children.push(Node::raw(html));
        }
    }

    fn close_think(&mut self) {
        if self
            .stack
            .last()
            .is_some_and(|frame| frame.kind == FrameKind::Think)
        {
            self.close_top();
        } else {
            tracing::trace!("dropping </think> with no open think block at this level");
        }
    }

    fn add_task_marker(&mut self, checked: bool) {
        if let Some(item) = self
            .stack
            .iter_mut()
            .rev()
            .find(|frame| frame.element.tag == "li")
        {
            item.element.set_attr("class", "task-list-item");
        }

        let mut input = Element::new("input")
            .with_attr("type", "checkbox")
            .with_attr("disabled", "");
        if checked {
            input.set_attr("checked", "");
        }
        self.attach(input.into());
    }

    fn finish(mut self) -> Vec<Node> {
        // Unclosed think blocks (still streaming) end with the document
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.root
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn alignment_name(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

fn alert_name(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}
