//! Reply text to [`RenderNode`] conversion.

use url::Url;

use super::node::{Hyperlink, RenderNode};
use super::with_stack;
use super::value::{StructuredValue, canonical_number, parse};

/// Render an assistant reply.
///
/// Only a top-level object is shown structurally. Arrays and scalars that
/// parse fine, and text that does not parse at all, come back as the
/// reply string untouched.
pub fn render(text: &str) -> RenderNode {
    match parse(text) {
        Ok(StructuredValue::Object(entries)) => RenderNode::Mapping(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), format_value(value)))
                .collect(),
        ),
        Ok(_) => {
            tracing::debug!("reply parsed but is not an object, showing as text");
            RenderNode::PlainText(text.to_string())
        }
        Err(_) => RenderNode::PlainText(text.to_string()),
    }
}

/// Format one structured value found inside a reply object.
pub fn format_value(value: &StructuredValue) -> RenderNode {
    with_stack(|| match value {
        StructuredValue::String(s) => match absolute_url(s) {
            Some(target) => RenderNode::Link(Hyperlink::external(target)),
            None => RenderNode::Scalar(s.clone()),
        },
        StructuredValue::Object(entries) => RenderNode::Mapping(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), format_value(value)))
                .collect(),
        ),
        StructuredValue::Array(items) => {
            RenderNode::Sequence(items.iter().map(format_value).collect())
        }
        StructuredValue::Number(n) => RenderNode::Scalar(canonical_number(n)),
        StructuredValue::Bool(b) => RenderNode::Scalar(b.to_string()),
        StructuredValue::Null => RenderNode::Scalar("null".to_string()),
    })
}

/// The string itself when it is an absolute URL with an authority
/// (`scheme://host...`).
pub fn absolute_url(candidate: &str) -> Option<&str> {
    match Url::parse(candidate) {
        Ok(url) if url.has_authority() => Some(candidate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(text: &str) -> RenderNode {
        RenderNode::Scalar(text.to_string())
    }

    // -- Plain-text fallback --

    #[test]
    fn test_plain_text_is_verbatim() {
        let inputs = [
            "hi there",
            "  leading and trailing  ",
            "line one\nline two\n\n  indented",
            "",
            "{not json",
            "{\"a\": 1",
            "tabs\tand\r\nwindows breaks",
        ];
        for input in inputs {
            assert_eq!(render(input), RenderNode::PlainText(input.to_string()));
        }
    }

    #[test]
    fn test_top_level_array_is_plain_text() {
        assert_eq!(render("[1,2,3]"), RenderNode::PlainText("[1,2,3]".to_string()));
    }

    #[test]
    fn test_top_level_scalars_are_plain_text() {
        for input in ["42", "true", "null", "\"quoted\"", "\"https://example.com\""] {
            assert_eq!(render(input), RenderNode::PlainText(input.to_string()));
        }
    }

    // -- Structured rendering --

    #[test]
    fn test_object_with_link_and_number() {
        let node = render(r#"{ "a": "https://example.com", "b": 3 }"#);
        assert_eq!(
            node,
            RenderNode::Mapping(vec![
                (
                    "a".to_string(),
                    RenderNode::Link(Hyperlink::external("https://example.com"))
                ),
                ("b".to_string(), scalar("3")),
            ])
        );
    }

    #[test]
    fn test_link_uses_fixed_label_and_external_policy() {
        let node = render(r#"{"site": "https://syuting.film/booking?id=7"}"#);
        let links = node.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label(), "Link");
        assert_eq!(links[0].target, "https://syuting.film/booking?id=7");
        assert!(links[0].policy.new_context);
        assert!(links[0].policy.no_opener);
        assert!(links[0].policy.no_referrer);
    }

    #[test]
    fn test_scalars_render_as_text() {
        let node = render(r#"{"n": 1.25, "t": true, "f": false, "z": null, "s": "plain words"}"#);
        assert_eq!(
            node,
            RenderNode::Mapping(vec![
                ("n".to_string(), scalar("1.25")),
                ("t".to_string(), scalar("true")),
                ("f".to_string(), scalar("false")),
                ("z".to_string(), scalar("null")),
                ("s".to_string(), scalar("plain words")),
            ])
        );
    }

    #[test]
    fn test_arrays_inside_objects_recurse() {
        let node = render(r#"{"items": ["x", "http://a.example/path", [1]]}"#);
        assert_eq!(
            node,
            RenderNode::Mapping(vec![(
                "items".to_string(),
                RenderNode::Sequence(vec![
                    scalar("x"),
                    RenderNode::Link(Hyperlink::external("http://a.example/path")),
                    RenderNode::Sequence(vec![scalar("1")]),
                ])
            )])
        );
    }

    #[test]
    fn test_nested_depth_and_order_preserved() {
        let node = render(r#"{"z": {"y": {"x": {"w": 1}}, "b": 2}, "a": 0}"#);
        assert_eq!(node.depth(), 4);
        let RenderNode::Mapping(top) = &node else {
            panic!("expected mapping");
        };
        assert_eq!(top[0].0, "z");
        assert_eq!(top[1].0, "a");
        let RenderNode::Mapping(second) = &top[0].1 else {
            panic!("expected mapping");
        };
        let keys: Vec<&str> = second.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["y", "b"]);
    }

    #[test]
    fn test_deeply_nested_object_keeps_full_depth() {
        let depth = 200;
        let text = format!("{}1{}", r#"{"k":"#.repeat(depth), "}".repeat(depth));
        let node = render(&text);
        assert!(!matches!(node, RenderNode::PlainText(_)));
        assert_eq!(node.depth(), depth);

        let mut inner = &node;
        for _ in 0..depth {
            let RenderNode::Mapping(entries) = inner else {
                panic!("expected mapping");
            };
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].0, "k");
            inner = &entries[0].1;
        }
        assert_eq!(inner, &scalar("1"));
    }

    #[test]
    fn test_flat_object_has_depth_one() {
        assert_eq!(render(r#"{"a": 1, "b": "two"}"#).depth(), 1);
        assert_eq!(render("{}").depth(), 1);
    }

    #[test]
    fn test_empty_object_renders_empty_mapping() {
        assert_eq!(render("{}"), RenderNode::Mapping(Vec::new()));
    }

    #[test]
    fn test_links_in_display_order() {
        let node = render(
            r#"{"first": "https://one.example", "more": ["https://two.example", {"deep": "https://three.example"}]}"#,
        );
        let targets: Vec<&str> = node.links().iter().map(|l| l.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["https://one.example", "https://two.example", "https://three.example"]
        );
    }

    // -- URL detection --

    #[test]
    fn test_absolute_url_accepts_scheme_and_authority() {
        assert_eq!(absolute_url("https://example.com"), Some("https://example.com"));
        assert!(absolute_url("http://localhost:8080/x").is_some());
        assert!(absolute_url("ftp://files.example.org/a.txt").is_some());
    }

    #[test]
    fn test_absolute_url_rejects_non_urls() {
        for candidate in [
            "example.com",
            "www.example.com",
            "just words",
            "http",
            "/relative/path",
            "mailto:someone@example.com",
            "",
        ] {
            assert!(absolute_url(candidate).is_none(), "{candidate} should not be a link");
        }
    }

    #[test]
    fn test_url_lookalike_stays_scalar() {
        let node = render(r#"{"note": "see www.example.com for more"}"#);
        assert_eq!(
            node,
            RenderNode::Mapping(vec![(
                "note".to_string(),
                scalar("see www.example.com for more")
            )])
        );
    }
}
