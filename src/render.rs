// src/render.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Scroll position of a rendering surface, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrollOffset {
    pub x: i64,
    pub y: i64,
}

impl ScrollOffset {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A surface that frames write markup into.
///
/// In a browser this would be an isolated document (an iframe); the service
/// backs it with [`MemoryTarget`] and ships the content to the page.
pub trait RenderTarget: Send {
    /// Drops everything written so far.
    fn reset(&mut self);

    /// Appends markup to the current document.
    fn write(&mut self, html: &str);

    fn scroll_offset(&self) -> ScrollOffset;

    fn set_scroll_offset(&mut self, x: i64, y: i64);

    /// Everything written since the last reset.
    fn content(&self) -> String;
}

/// Creates the render target for a surface id.
pub type TargetFactory = dyn Fn(&str) -> Box<dyn RenderTarget> + Send + Sync;

/// In-memory render target.
#[derive(Debug, Default, Clone)]
pub struct MemoryTarget {
    buffer: String,
    offset: ScrollOffset,
    /// Number of `set_scroll_offset` calls, so callers can tell a surface
    /// that was never touched from one scrolled back to the origin.
    scroll_writes: usize,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_writes(&self) -> usize {
        self.scroll_writes
    }

    /// Factory producing a fresh [`MemoryTarget`] per surface.
    pub fn factory() -> Box<TargetFactory> {
        Box::new(|_surface_id: &str| Box::new(MemoryTarget::new()) as Box<dyn RenderTarget>)
    }
}

impl RenderTarget for MemoryTarget {
    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn write(&mut self, html: &str) {
        self.buffer.push_str(html);
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.offset
    }

    fn set_scroll_offset(&mut self, x: i64, y: i64) {
        self.offset = ScrollOffset::new(x, y);
        self.scroll_writes += 1;
    }

    fn content(&self) -> String {
        self.buffer.clone()
    }
}

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|\z)").expect("body pattern is valid")
});

/// Returns the inner HTML of the `<body>` element when the surface holds a
/// whole document, otherwise the content as written.
pub fn body_html(content: &str) -> String {
    match BODY_RE.captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().to_string(),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_discards_previous_writes() {
        let mut target = MemoryTarget::new();
        target.write("<p>one</p>");
        target.reset();
        target.write("<p>two</p>");
        assert_eq!(target.content(), "<p>two</p>");
    }

    #[test]
    fn body_html_unwraps_documents() {
        let doc = r#"<html><body style="color: red;"><b>x</b></body></html>"#;
        assert_eq!(body_html(doc), "<b>x</b>");
        assert_eq!(body_html("<b>x</b>"), "<b>x</b>");
    }
}
