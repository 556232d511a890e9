//! Scanner for `<think>` tags inside raw markup.
//!
//! Reasoning models wrap their chain of thought in `<think>` ... `</think>`.
//! The parser passes raw markup through untouched, except for these tags,
//! which open and close a `think` element in the document tree.
//!
//! Example raw markup from a single HTML block:
//! ```text
//! <think>
//! Let me analyze this...
//! </think>
//! ```
//!
//! is split into `[Open, Html("\nLet me analyze this...\n"), Close, Html("\n")]`.

use std::sync::LazyLock;

use regex::Regex;

static THINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*(/)?\s*think(?:\s[^>]*)?>").expect("valid regex"));

/// One piece of a raw markup fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSegment<'a> {
    /// Markup that is not a think tag.
    Html(&'a str),
    /// `<think>`
    Open,
    /// `</think>`
    Close,
}

/// Splits raw markup at `<think>` / `</think>` tags.
///
/// Empty markup between adjacent tags is omitted. Tag matching is
/// case-insensitive and tolerates attributes on the opening tag.
pub fn split_think_tags(raw: &str) -> Vec<RawSegment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in THINK_TAG.captures_iter(raw) {
        let Some(tag) = caps.get(0) else { continue };
        if tag.start() > cursor {
            segments.push(RawSegment::Html(&raw[cursor..tag.start()]));
        }
        segments.push(if caps.get(1).is_some() {
            RawSegment::Close
        } else {
            RawSegment::Open
        });
        cursor = tag.end();
    }

    if cursor < raw.len() {
        segments.push(RawSegment::Html(&raw[cursor..]));
    }

    segments
}
