//! Markdown to HTML rendering for the README previewer and IDE preview.
//!
//! Fenced code blocks are wrapped in `<div class="codehilite">` and keep their
//! `language-*` class so the dashboard's highlighter can style them.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

const HIGHLIGHT_OPEN: &str = "<div class=\"codehilite\">\n";
const HIGHLIGHT_CLOSE: &str = "</div>\n";

/// Render `content` as HTML.
pub fn render_markdown(content: &str) -> String {
    let mut in_fenced_block = false;

    let events = Parser::new_ext(content, Options::empty()).flat_map(|event| {
        let mut out = Vec::with_capacity(2);
        match &event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_))) => {
                in_fenced_block = true;
                out.push(Event::Html(HIGHLIGHT_OPEN.into()));
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock) if in_fenced_block => {
                in_fenced_block = false;
                out.push(event);
                out.push(Event::Html(HIGHLIGHT_CLOSE.into()));
            }
            _ => out.push(event),
        }
        out
    });

    let mut rendered = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    rendered
}
