//! Renderable reply tree.

use super::with_stack;

/// Label shown in place of a URL.
pub const LINK_LABEL: &str = "Link";

/// How an activated link is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Open in a new viewing context (browser window or tab).
    pub new_context: bool,
    /// The opened page gets no scripting handle back to the chat.
    pub no_opener: bool,
    /// No referrer is sent with the navigation.
    pub no_referrer: bool,
}

impl LinkPolicy {
    pub const EXTERNAL: LinkPolicy = LinkPolicy {
        new_context: true,
        no_opener: true,
        no_referrer: true,
    };
}

/// A detected URL, displayed under a fixed label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub target: String,
    pub policy: LinkPolicy,
}

impl Hyperlink {
    pub fn external(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            policy: LinkPolicy::EXTERNAL,
        }
    }

    pub fn label(&self) -> &'static str {
        LINK_LABEL
    }
}

/// Display tree for one assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    /// Reply shown exactly as received.
    PlainText(String),
    /// Textual form of a number, boolean, null or non-URL string.
    Scalar(String),
    Link(Hyperlink),
    /// Object entries in source order.
    Mapping(Vec<(String, RenderNode)>),
    /// Array elements in source order; element `i` is labelled `[i]`.
    Sequence(Vec<RenderNode>),
}

impl RenderNode {
    /// Nesting depth: leaves are 0, a composite is one more than its
    /// deepest child.
    pub fn depth(&self) -> usize {
        with_stack(|| match self {
            RenderNode::PlainText(_) | RenderNode::Scalar(_) | RenderNode::Link(_) => 0,
            RenderNode::Mapping(entries) => {
                1 + entries.iter().map(|(_, child)| child.depth()).max().unwrap_or(0)
            }
            RenderNode::Sequence(items) => {
                1 + items.iter().map(RenderNode::depth).max().unwrap_or(0)
            }
        })
    }

    /// Every link in display order.
    pub fn links(&self) -> Vec<&Hyperlink> {
        let mut links = Vec::new();
        self.collect_links(&mut links);
        links
    }

    fn collect_links<'a>(&'a self, out: &mut Vec<&'a Hyperlink>) {
        with_stack(|| match self {
            RenderNode::Link(link) => out.push(link),
            RenderNode::Mapping(entries) => {
                for (_, child) in entries {
                    child.collect_links(out);
                }
            }
            RenderNode::Sequence(items) => {
                for child in items {
                    child.collect_links(out);
                }
            }
            RenderNode::PlainText(_) | RenderNode::Scalar(_) => {}
        })
    }
}
