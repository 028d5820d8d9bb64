//! Flattens report Markdown into fixed-width text lines for rasterizing.

use std::mem;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading(u8),
    Body,
    Code,
    Rule,
    Blank,
}

impl LineKind {
    /// Vertical space the line occupies, in unscaled pixels.
    pub fn advance(self) -> u32 {
        match self {
            Self::Heading(1) => 26,
            Self::Heading(_) => 16,
            Self::Body | Self::Code => 12,
            Self::Rule => 9,
            Self::Blank => 6,
        }
    }

    /// Multiplier applied to the 8x8 glyphs of this line.
    pub fn glyph_scale(self) -> u32 {
        match self {
            Self::Heading(1) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub kind: LineKind,
    pub text: String,
}

impl TextLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Lays out `markdown` as lines no wider than `columns` glyph cells.
pub fn layout(markdown: &str, columns: usize) -> Vec<TextLine> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = LayoutBuilder::new(columns.max(1));
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

struct LayoutBuilder {
    columns: usize,
    lines: Vec<TextLine>,
    kind: LineKind,
    current: String,
    item_prefix: Option<String>,
    lists: Vec<Option<u64>>,
    in_code: bool,
    cell: Option<String>,
    row: Vec<String>,
}

impl LayoutBuilder {
    fn new(columns: usize) -> Self {
        Self {
            columns,
            lines: Vec::new(),
            kind: LineKind::Body,
            current: String::new(),
            item_prefix: None,
            lists: Vec::new(),
            in_code: false,
            cell: None,
            row: Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.kind = LineKind::Heading(level as u8);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.kind = LineKind::Body;
                self.blank();
            }
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.item_prefix = Some(indent + &marker);
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code = false;
                self.blank();
            }
            Event::Start(Tag::Table(_)) => self.flush(),
            Event::Start(Tag::TableCell) => self.cell = Some(String::new()),
            Event::End(TagEnd::TableCell) => {
                if let Some(cell) = self.cell.take() {
                    self.row.push(cell.trim().to_string());
                }
            }
            Event::End(TagEnd::TableHead) => {
                let width = self.push_row();
                self.lines
                    .push(TextLine::new(LineKind::Body, "-".repeat(width.min(self.columns))));
            }
            Event::End(TagEnd::TableRow) => {
                self.push_row();
            }
            Event::End(TagEnd::Table) => self.blank(),
            Event::Text(text) if self.in_code => self.push_code(&text),
            Event::Text(text) | Event::Code(text) => self.append(&text),
            Event::SoftBreak => self.append(" "),
            Event::HardBreak => self.flush(),
            Event::TaskListMarker(done) => self.append(if done { "[x] " } else { "[ ] " }),
            Event::Rule => {
                self.flush();
                self.lines.push(TextLine::new(LineKind::Rule, ""));
            }
            _ => {}
        }
    }

    fn append(&mut self, text: &str) {
        let target = self.cell.as_mut().unwrap_or(&mut self.current);
        target.push_str(&normalize(text));
    }

    fn blank(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| line.kind != LineKind::Blank)
        {
            self.lines.push(TextLine::new(LineKind::Blank, ""));
        }
    }

    fn flush(&mut self) {
        let text = mem::take(&mut self.current);
        let prefix = self.item_prefix.take().unwrap_or_default();
        if text.trim().is_empty() && prefix.is_empty() {
            return;
        }

        let width = match self.kind {
            LineKind::Heading(1) => self.columns / 2,
            _ => self.columns,
        };
        let prefix_len = prefix.chars().count();
        let indent = " ".repeat(prefix_len);
        let wrapped = wrap(&text, width.saturating_sub(prefix_len));
        if wrapped.is_empty() {
            self.lines.push(TextLine::new(self.kind, prefix));
            return;
        }
        for (i, line) in wrapped.into_iter().enumerate() {
            let lead = if i == 0 { &prefix } else { &indent };
            self.lines.push(TextLine::new(self.kind, format!("{lead}{line}")));
        }
    }

    /// Emits the buffered table row and returns its widest line.
    fn push_row(&mut self) -> usize {
        let row = mem::take(&mut self.row).join(" | ");
        let wrapped = wrap(&row, self.columns);
        let width = wrapped.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        self.lines.extend(
            wrapped
                .into_iter()
                .map(|line| TextLine::new(LineKind::Body, line)),
        );
        width
    }

    fn push_code(&mut self, text: &str) {
        for raw in normalize(text).lines() {
            let chars: Vec<char> = raw.trim_end().chars().collect();
            if chars.is_empty() {
                self.lines.push(TextLine::new(LineKind::Code, ""));
                continue;
            }
            for chunk in chars.chunks(self.columns) {
                self.lines
                    .push(TextLine::new(LineKind::Code, chunk.iter().collect::<String>()));
            }
        }
    }

    fn finish(mut self) -> Vec<TextLine> {
        self.flush();
        while self
            .lines
            .last()
            .is_some_and(|line| line.kind == LineKind::Blank)
        {
            self.lines.pop();
        }
        self.lines
    }
}

/// Greedy word wrap; words longer than `width` are split across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            if len > 0 && len + 1 + chunk.len() > width {
                lines.push(mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.extend(chunk);
            len += chunk.len();
        }
    }
    if len > 0 {
        lines.push(line);
    }
    lines
}

/// Replaces typographic characters the bitmap font lacks with ASCII.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2022}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\t' => out.push_str("    "),
            _ => out.push(ch),
        }
    }
    out
}
