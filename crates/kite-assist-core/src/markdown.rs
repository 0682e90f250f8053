//! Lightweight line-oriented markdown block renderer.
//!
//! Pure function from a (possibly partial) markdown string to an ordered
//! sequence of render blocks. No state survives between calls, so it is
//! safe to re-run on growing prefixes of a streaming message.

use std::sync::LazyLock;

use regex::Regex;

/// Inline markup primitive inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Strong(String),
    Emphasis(String),
    Link { text: String, url: String },
}

/// Block-level render instruction, produced in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownBlock {
    Paragraph(Vec<Inline>),
    Heading { level: u8, inlines: Vec<Inline> },
    UnorderedList(Vec<Vec<Inline>>),
    OrderedList(Vec<Vec<Inline>>),
    CodeBlock {
        language: Option<String>,
        lines: Vec<String>,
    },
    /// Explicit spacing marker for a blank source line.
    LineBreak,
}

static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+").expect("unordered item regex"));
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("ordered item regex"));

/// Renders a markdown string into blocks.
///
/// Single pass over lines: fenced code toggling, `#` headings, list
/// accumulation, blank-line spacing markers, paragraphs. A code block is
/// only closed by a matching fence or end of input; lists flush on any
/// non-list line.
pub fn render_blocks(text: &str) -> Vec<MarkdownBlock> {
    let mut scanner = Scanner::default();
    for line in text.split('\n') {
        scanner.push_line(line);
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    blocks: Vec<MarkdownBlock>,
    in_code_block: bool,
    code_language: Option<String>,
    code_lines: Vec<String>,
    unordered_items: Vec<Vec<Inline>>,
    ordered_items: Vec<Vec<Inline>>,
}

impl Scanner {
    fn push_line(&mut self, line: &str) {
        let trimmed = line.trim();

        // Fence toggling; while inside, lines are captured verbatim.
        if trimmed.starts_with("```") {
            if self.in_code_block {
                self.flush_code_block();
            } else {
                self.flush_lists();
                self.in_code_block = true;
                let language = trimmed[3..].trim();
                self.code_language = (!language.is_empty()).then(|| language.to_string());
            }
            return;
        }

        if self.in_code_block {
            self.code_lines.push(line.to_string());
            return;
        }

        // A `#`-only line is an empty-text heading, not a paragraph.
        if trimmed.starts_with('#') {
            self.flush_lists();
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            let level = hashes.min(6) as u8;
            let text = trimmed.trim_start_matches('#').trim_start();
            self.blocks.push(MarkdownBlock::Heading {
                level,
                inlines: parse_inlines(text),
            });
            return;
        }

        if let Some(m) = UNORDERED_ITEM.find(trimmed) {
            self.flush_ordered();
            self.unordered_items.push(parse_inlines(&trimmed[m.end()..]));
            return;
        }

        // Contiguous numbered lines share one ordered block; any other
        // line flushes it, so a later numbered line starts a fresh block.
        if let Some(m) = ORDERED_ITEM.find(trimmed) {
            self.flush_unordered();
            self.ordered_items.push(parse_inlines(&trimmed[m.end()..]));
            return;
        }

        if trimmed.is_empty() {
            self.flush_lists();
            // A leading blank line before any content produces no marker.
            if !self.blocks.is_empty() {
                self.blocks.push(MarkdownBlock::LineBreak);
            }
            return;
        }

        self.flush_lists();
        self.blocks.push(MarkdownBlock::Paragraph(parse_inlines(line)));
    }

    fn flush_unordered(&mut self) {
        if !self.unordered_items.is_empty() {
            let items = std::mem::take(&mut self.unordered_items);
            self.blocks.push(MarkdownBlock::UnorderedList(items));
        }
    }

    fn flush_ordered(&mut self) {
        if !self.ordered_items.is_empty() {
            let items = std::mem::take(&mut self.ordered_items);
            self.blocks.push(MarkdownBlock::OrderedList(items));
        }
    }

    fn flush_lists(&mut self) {
        self.flush_unordered();
        self.flush_ordered();
    }

    fn flush_code_block(&mut self) {
        self.blocks.push(MarkdownBlock::CodeBlock {
            language: self.code_language.take(),
            lines: std::mem::take(&mut self.code_lines),
        });
        self.in_code_block = false;
    }

    fn finish(mut self) -> Vec<MarkdownBlock> {
        self.flush_lists();
        // An unterminated fence flushes as-is at end of input.
        if self.in_code_block {
            self.flush_code_block();
        }
        self.blocks
    }
}

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code span regex"));
static STRONG_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("strong star regex"));
static STRONG_UNDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_]+)__").expect("strong underscore regex"));
static EMPHASIS_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("emphasis star regex"));
static EMPHASIS_UNDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_]+)_").expect("emphasis underscore regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

/// Splits a line into inline spans.
///
/// Ordered substitution pipeline: code spans, then bold, then italic,
/// then links. Each pass is applied once and only to text that earlier
/// passes left plain, so the order avoids marker collisions (`*` inside
/// `**`), and nested emphasis is deliberately not recursive.
pub fn parse_inlines(line: &str) -> Vec<Inline> {
    let mut spans = vec![Inline::Text(line.to_string())];
    spans = apply_pass(spans, &CODE_SPAN, |caps| Inline::Code(caps[1].to_string()));
    spans = apply_pass(spans, &STRONG_STAR, |caps| {
        Inline::Strong(caps[1].to_string())
    });
    spans = apply_pass(spans, &STRONG_UNDER, |caps| {
        Inline::Strong(caps[1].to_string())
    });
    spans = apply_pass(spans, &EMPHASIS_STAR, |caps| {
        Inline::Emphasis(caps[1].to_string())
    });
    spans = apply_pass(spans, &EMPHASIS_UNDER, |caps| {
        Inline::Emphasis(caps[1].to_string())
    });
    spans = apply_pass(spans, &LINK, |caps| Inline::Link {
        text: caps[1].to_string(),
        url: caps[2].to_string(),
    });
    spans
}

fn apply_pass(
    spans: Vec<Inline>,
    pattern: &Regex,
    make: impl Fn(&regex::Captures<'_>) -> Inline,
) -> Vec<Inline> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let Inline::Text(text) = span else {
            out.push(span);
            continue;
        };

        let mut last_end = 0;
        for caps in pattern.captures_iter(&text) {
            let whole = caps.get(0).expect("capture 0");
            if whole.start() > last_end {
                out.push(Inline::Text(text[last_end..whole.start()].to_string()));
            }
            out.push(make(&caps));
            last_end = whole.end();
        }
        if last_end < text.len() {
            out.push(Inline::Text(text[last_end..].to_string()));
        }
    }
    out
}
