//! Terminal rendering of markdown blocks.
//!
//! Maps the core block renderer's output to plain text with optional
//! ANSI styling. Kept line-oriented so partial messages render the same
//! as complete ones.

use kite_assist_core::markdown::{Inline, MarkdownBlock, render_blocks};

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Renders markdown to a string, with ANSI styling when `color` is set.
pub fn render_markdown(text: &str, color: bool) -> String {
    let mut out = String::new();
    for block in render_blocks(text) {
        match block {
            MarkdownBlock::Paragraph(inlines) => {
                out.push_str(&render_inlines(&inlines, color));
                out.push('\n');
            }
            MarkdownBlock::Heading { level: _, inlines } => {
                let heading = render_inlines(&inlines, color);
                if color {
                    out.push_str(BOLD);
                    out.push_str(UNDERLINE);
                }
                out.push_str(&heading);
                if color {
                    out.push_str(RESET);
                }
                out.push('\n');
            }
            MarkdownBlock::UnorderedList(items) => {
                for item in items {
                    out.push_str("  • ");
                    out.push_str(&render_inlines(&item, color));
                    out.push('\n');
                }
            }
            MarkdownBlock::OrderedList(items) => {
                for (index, item) in items.iter().enumerate() {
                    out.push_str(&format!("  {}. ", index + 1));
                    out.push_str(&render_inlines(item, color));
                    out.push('\n');
                }
            }
            MarkdownBlock::CodeBlock { language: _, lines } => {
                for line in lines {
                    if color {
                        out.push_str(DIM);
                    }
                    out.push_str("    ");
                    out.push_str(&line);
                    if color {
                        out.push_str(RESET);
                    }
                    out.push('\n');
                }
            }
            MarkdownBlock::LineBreak => out.push('\n'),
        }
    }
    // Trailing newline comes from the caller's println.
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn render_inlines(inlines: &[Inline], color: bool) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => styled(&mut out, code, CYAN, color),
            Inline::Strong(text) => styled(&mut out, text, BOLD, color),
            Inline::Emphasis(text) => styled(&mut out, text, ITALIC, color),
            Inline::Link { text, url } => {
                styled(&mut out, text, UNDERLINE, color);
                out.push_str(" (");
                out.push_str(url);
                out.push(')');
            }
        }
    }
    out
}

fn styled(out: &mut String, text: &str, style: &str, color: bool) {
    if color {
        out.push_str(style);
    }
    out.push_str(text);
    if color {
        out.push_str(RESET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rendering_of_mixed_blocks() {
        let text = "# Title\n\nSome `code` and **bold**.\n\n- one\n- two";
        let rendered = render_markdown(text, false);
        assert_eq!(rendered, "Title\n\nSome code and bold.\n\n  • one\n  • two");
    }

    #[test]
    fn test_ordered_list_renumbers_sequentially() {
        let rendered = render_markdown("3. third\n4. fourth", false);
        assert_eq!(rendered, "  1. third\n  2. fourth");
    }

    #[test]
    fn test_code_block_is_indented() {
        let rendered = render_markdown("```yaml\nkind: Pod\n```", false);
        assert_eq!(rendered, "    kind: Pod");
    }

    #[test]
    fn test_link_shows_url() {
        let rendered = render_markdown("see [docs](https://kubernetes.io)", false);
        assert_eq!(rendered, "see docs (https://kubernetes.io)");
    }

    #[test]
    fn test_color_wraps_strong_in_ansi() {
        let rendered = render_markdown("**bold**", true);
        assert_eq!(rendered, "\x1b[1mbold\x1b[0m");
    }
}
