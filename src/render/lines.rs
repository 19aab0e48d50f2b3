//! Lays a [`RenderNode`] out as indented display lines.
//!
//! The output is frontend neutral: the TUI maps segments to ratatui spans,
//! the one-shot commands print them to stdout (see [`super::output`]).

use super::node::RenderNode;
use super::with_stack;

/// Columns added per nesting level.
pub const INDENT: &str = "  ";

/// What a segment shows, used by frontends to pick a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    Indent,
    /// `key: ` or `[i]: `
    Label,
    Text,
    Link,
    /// Dim `[n]` reference after a link, numbered per reply from 1.
    LinkRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub role: SegmentRole,
    pub link_url: Option<String>,
}

impl StyledSegment {
    fn new(text: impl Into<String>, role: SegmentRole) -> Self {
        Self {
            text: text.into(),
            role,
            link_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledLine {
    pub segments: Vec<StyledSegment>,
}

impl StyledLine {
    pub fn new(segments: Vec<StyledSegment>) -> Self {
        Self { segments }
    }

    /// Concatenated segment text.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Lay out a rendered reply.
pub fn layout(node: &RenderNode) -> Vec<StyledLine> {
    let mut builder = LineBuilder::default();
    match node {
        RenderNode::Mapping(entries) => builder.mapping(entries, 0),
        RenderNode::Sequence(items) => builder.sequence(items, 0),
        leaf => builder.entry(None, leaf, 0),
    }
    builder.lines
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<StyledLine>,
    links: usize,
}

impl LineBuilder {
    fn mapping(&mut self, entries: &[(String, RenderNode)], depth: usize) {
        for (key, child) in entries {
            self.entry(Some(format!("{key}: ")), child, depth);
        }
    }

    fn sequence(&mut self, items: &[RenderNode], depth: usize) {
        for (idx, child) in items.iter().enumerate() {
            self.entry(Some(format!("[{idx}]: ")), child, depth);
        }
    }

    /// One labelled child: leaves go on the label line, composites start
    /// on the following lines one level deeper.
    fn entry(&mut self, label: Option<String>, child: &RenderNode, depth: usize) {
        with_stack(|| self.entry_lines(label, child, depth));
    }

    fn entry_lines(&mut self, label: Option<String>, child: &RenderNode, depth: usize) {
        let mut head = Vec::new();
        let indent = INDENT.repeat(depth);
        if !indent.is_empty() {
            head.push(StyledSegment::new(indent.clone(), SegmentRole::Indent));
        }
        if let Some(label) = label {
            head.push(StyledSegment::new(label, SegmentRole::Label));
        }

        match child {
            RenderNode::PlainText(text) | RenderNode::Scalar(text) => {
                let mut parts = text.split('\n');
                let first = parts.next().unwrap_or_default();
                head.push(StyledSegment::new(first, SegmentRole::Text));
                self.lines.push(StyledLine::new(head));
                for rest in parts {
                    let mut segments = Vec::new();
                    if !indent.is_empty() {
                        segments.push(StyledSegment::new(indent.clone(), SegmentRole::Indent));
                    }
                    segments.push(StyledSegment::new(rest, SegmentRole::Text));
                    self.lines.push(StyledLine::new(segments));
                }
            }
            RenderNode::Link(link) => {
                self.links += 1;
                head.push(StyledSegment {
                    text: link.label().to_string(),
                    role: SegmentRole::Link,
                    link_url: Some(link.target.clone()),
                });
                head.push(StyledSegment::new(
                    format!(" [{}]", self.links),
                    SegmentRole::LinkRef,
                ));
                self.lines.push(StyledLine::new(head));
            }
            RenderNode::Mapping(entries) => {
                self.lines.push(StyledLine::new(head));
                self.mapping(entries, depth + 1);
            }
            RenderNode::Sequence(items) => {
                self.lines.push(StyledLine::new(head));
                self.sequence(items, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    fn texts(lines: &[StyledLine]) -> Vec<String> {
        lines.iter().map(StyledLine::text).collect()
    }

    #[test]
    fn test_plain_text_keeps_every_line() {
        let lines = layout(&render("first\n\n  third  "));
        assert_eq!(texts(&lines), vec!["first", "", "  third  "]);
        assert!(lines.iter().all(|l| l.segments.iter().all(|s| s.role == SegmentRole::Text)));
    }

    #[test]
    fn test_flat_object_lines() {
        let lines = layout(&render(r#"{"name": "Studio A", "rate": 150}"#));
        assert_eq!(texts(&lines), vec!["name: Studio A", "rate: 150"]);
        assert_eq!(lines[0].segments[0].role, SegmentRole::Label);
        assert_eq!(lines[0].segments[0].text, "name: ");
    }

    #[test]
    fn test_nested_object_is_indented() {
        let lines = layout(&render(r#"{"studio": {"name": "A", "tags": ["day", "night"]}, "ok": true}"#));
        assert_eq!(
            texts(&lines),
            vec![
                "studio: ",
                "  name: A",
                "  tags: ",
                "    [0]: day",
                "    [1]: night",
                "ok: true",
            ]
        );
    }

    #[test]
    fn test_links_numbered_in_order() {
        let lines = layout(&render(
            r#"{"map": "https://maps.example/1", "gallery": ["https://img.example/a"]}"#,
        ));
        assert_eq!(texts(&lines), vec!["map: Link [1]", "gallery: ", "  [0]: Link [2]"]);

        let link = lines[0]
            .segments
            .iter()
            .find(|s| s.role == SegmentRole::Link)
            .unwrap();
        assert_eq!(link.text, "Link");
        assert_eq!(link.link_url.as_deref(), Some("https://maps.example/1"));
    }

    #[test]
    fn test_multiline_scalar_continues_at_same_indent() {
        let lines = layout(&render(r#"{"outer": {"note": "a\nb"}}"#));
        assert_eq!(texts(&lines), vec!["outer: ", "  note: a", "  b"]);
    }

    #[test]
    fn test_deep_nesting_indents_every_level() {
        let depth = 200;
        let text = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
        let lines = layout(&render(&text));
        assert_eq!(lines.len(), depth);
        assert_eq!(lines[0].text(), "k: ");
        assert_eq!(lines[depth - 1].text(), format!("{}k: 1", INDENT.repeat(depth - 1)));
    }

    #[test]
    fn test_crlf_text_is_kept_byte_exact() {
        let lines = layout(&render("one\r\ntwo"));
        assert_eq!(texts(&lines), vec!["one\r", "two"]);
    }

    #[test]
    fn test_empty_object_has_no_lines() {
        assert!(layout(&render("{}")).is_empty());
    }
}
