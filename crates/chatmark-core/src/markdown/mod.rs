//! Markdown parsing for chat messages.
//!
//! This module provides:
//! - `parse_markdown()`: Parse markdown text into a markup tree
//! - `split_think_tags()`: Split raw markup at `<think>` / `</think>` tags
//!
//! Uses pulldown-cmark for parsing. Raw markup is passed through unescaped.

mod parse;
mod think;

pub use parse::{parse_markdown, parser_options};
pub use think::{RawSegment, split_think_tags};
