//! Render command handler.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chatmark_core::{Config, MarkdownRenderer, MessageView, ViewEvent};

pub struct RenderOptions<'a> {
    /// Markdown file; stdin when `None` or `-`.
    pub input: Option<&'a Path>,
    pub config: Config,
    pub thinking: bool,
    pub json: bool,
    /// Thinking blocks to show collapsed.
    pub collapse: &'a [String],
}

pub fn run(opts: RenderOptions<'_>) -> Result<()> {
    let content = read_input(opts.input)?;

    let renderer = MarkdownRenderer::new(opts.config);
    let mut view = MessageView::with_renderer(renderer, content, opts.thinking);

    for key in opts.collapse {
        if !view.think_keys().contains(key) {
            anyhow::bail!(
                "No thinking block '{}' (available: {})",
                key,
                available_keys(view.think_keys())
            );
        }
        // Repeated keys must not reopen the block
        if view.collapse_state(key).is_open() {
            view.update(ViewEvent::ToggleThink(key.clone()));
        }
    }

    let rendered = view.render();
    if opts.json {
        let json = serde_json::to_string_pretty(&rendered).context("serialize markup")?;
        println!("{json}");
    } else {
        println!("{}", rendered.to_html());
    }

    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn available_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        "none".to_string()
    } else {
        keys.join(", ")
    }
}
