//! Assistant reply rendering.
//!
//! Three pure stages:
//!
//! - [`value::parse`]: reply text to a [`StructuredValue`], or an explicit error
//! - [`render`]: text to a [`RenderNode`] tree, falling back to plain text
//!   unless the reply is a JSON object; URL strings become [`Hyperlink`]s
//! - [`layout`]: tree to indented [`StyledLine`]s for display
//!
//! Replies may nest arbitrarily deep, so every recursive walk runs through
//! [`with_stack`].

pub mod format;
pub mod lines;
pub mod node;
pub mod output;
pub mod value;

pub use format::{absolute_url, format_value, render};
pub use lines::{SegmentRole, StyledLine, StyledSegment, layout};
pub use node::{Hyperlink, LINK_LABEL, LinkPolicy, RenderNode};
pub use output::{LinkStyle, to_text};
pub use value::{ParseError, StructuredValue, parse};

/// Stack kept free before recursing one more level.
const RED_ZONE: usize = 64 * 1024;

/// Size of each extra stack segment.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Run one level of a recursive walk, moving to a fresh stack segment when
/// the current one is nearly used up.
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}
