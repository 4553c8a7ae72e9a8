//! Simple and verbose rendering of error chains.
//!
//! Simple mode (`{}`) joins each link's own message with `": "`; marks are
//! invisible. Verbose mode (`{:#}` and `{:?}`) lists links outermost first,
//! adds each link's detail text, and announces marks with a header entry:
//!
//! ```text
//! error with mark override:
//!     "foo"
//!     errmark_core::node::Message
//!   - waa:
//!     -- verbose wrapper:
//!     waa
//!   - woo
//! ```

use std::fmt;

use crate::node::{ErrorNode, ErrorValue};

const SIMPLE_SEPARATOR: &str = ": ";
const ENTRY_SEPARATOR: &str = "\n  - ";
const DETAIL_INDENT: &str = "    ";

/// Render the simple form of a chain (same as `to_string()`).
pub fn simple(node: &ErrorNode) -> String {
    node.to_string()
}

/// Render the verbose form of a chain (same as `format!("{:#}", node)`).
pub fn verbose(node: &ErrorNode) -> String {
    format!("{:#}", node)
}

/// Render the detail text of a value, if it has the capability and
/// produces non-empty output.
pub(crate) fn render_detail(value: &dyn ErrorValue) -> Option<String> {
    let detail = value.detail()?;
    let mut out = String::new();
    detail.format_detail(&mut out).ok()?;
    (!out.is_empty()).then_some(out)
}

fn write_simple(node: &ErrorNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for link in node.chain() {
        let message = link.message();
        if message.is_empty() {
            continue;
        }
        if !first {
            f.write_str(SIMPLE_SEPARATOR)?;
        }
        f.write_str(&message)?;
        first = false;
    }
    Ok(())
}

fn mark_header(mark: &ErrorNode) -> String {
    let type_keys: Vec<String> = mark
        .chain()
        .map(|link| link.type_key().to_string())
        .collect();
    format!(
        "error with mark override:\n{indent}{:?}\n{indent}{}",
        mark.to_string(),
        type_keys.join(", "),
        indent = DETAIL_INDENT,
    )
}

fn link_entry(link: &ErrorNode) -> String {
    let mut entry = link.message();
    if !entry.is_empty() && link.cause().is_some() {
        entry.push(':');
    }
    if let Some(detail) = render_detail(link.value()) {
        for line in detail.lines() {
            if !entry.is_empty() {
                entry.push('\n');
            }
            entry.push_str(DETAIL_INDENT);
            entry.push_str(line);
        }
    }
    entry
}

fn write_verbose(node: &ErrorNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut entries = Vec::new();
    for link in node.chain() {
        if let Some(mark) = link.mark() {
            entries.push(mark_header(mark));
        }
        let entry = link_entry(link);
        if !entry.is_empty() {
            entries.push(entry);
        }
    }
    f.write_str(&entries.join(ENTRY_SEPARATOR))
}

impl fmt::Display for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write_verbose(self, f)
        } else {
            write_simple(self, f)
        }
    }
}

impl fmt::Debug for ErrorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_verbose(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::FormatDetail;
    use crate::type_key::TypeKey;
    use crate::Message;
    use std::sync::Arc;

    #[derive(Debug)]
    struct VerboseWrapper(&'static str);

    impl fmt::Display for VerboseWrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl FormatDetail for VerboseWrapper {
        fn format_detail(&self, out: &mut dyn fmt::Write) -> fmt::Result {
            write!(out, "-- verbose wrapper:\n{}", self.0)
        }
    }

    impl ErrorValue for VerboseWrapper {
        fn detail(&self) -> Option<&dyn FormatDetail> {
            Some(self)
        }
    }

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    impl ErrorValue for Silent {}

    #[test]
    fn test_simple_two_levels() {
        let err = ErrorNode::leaf("woo").wrap("waa");
        assert_eq!(simple(&err), "waa: woo");
        assert_eq!(format!("{}", err), "waa: woo");
    }

    #[test]
    fn test_simple_skips_empty_messages() {
        let err = ErrorNode::with_cause(Silent, ErrorNode::leaf("woo"));
        assert_eq!(simple(&err), "woo");
    }

    #[test]
    fn test_simple_ignores_mark() {
        let err = ErrorNode::leaf("woo").marked(Arc::new(ErrorNode::leaf("foo")));
        assert_eq!(simple(&err), "woo");
    }

    #[test]
    fn test_verbose_plain_chain() {
        let err = ErrorNode::leaf("woo").wrap("waa");
        assert_eq!(verbose(&err), "waa:\n  - woo");
    }

    #[test]
    fn test_verbose_marked_leaf() {
        let err = ErrorNode::leaf("woo").marked(Arc::new(ErrorNode::leaf("foo")));
        let expected = format!(
            "error with mark override:\n    \"foo\"\n    {}\n  - woo",
            TypeKey::of::<Message>()
        );
        assert_eq!(verbose(&err), expected);
    }

    #[test]
    fn test_verbose_includes_detail() {
        let err = ErrorNode::with_cause(VerboseWrapper("waa"), ErrorNode::leaf("woo"));
        assert_eq!(
            verbose(&err),
            "waa:\n    -- verbose wrapper:\n    waa\n  - woo"
        );
        assert_eq!(format!("{:?}", err), verbose(&err));
    }

    #[test]
    fn test_silent_link_renders_nothing() {
        let err = ErrorNode::new(Silent);
        assert_eq!(verbose(&err), "");
    }
}
