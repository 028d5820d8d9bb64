//! Markdown report rendering.

use std::path::Path;

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::error::Result;

const STYLESHEET: &str = "body{font-family:sans-serif;max-width:48rem;margin:2rem auto;\
padding:0 1rem;line-height:1.5;color:#1f2937;background:#fff}\
table{border-collapse:collapse}th,td{border:1px solid #d1d5db;padding:.25rem .5rem}\
code{background:#f3f4f6;padding:0 .2rem}";

/// A report's Markdown and its HTML rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    markdown: String,
}

impl ReportView {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    /// Renders the report body as an HTML fragment.
    pub fn to_html(&self) -> String {
        let parser = Parser::new_ext(&self.markdown, Self::options());
        let mut out = String::with_capacity(self.markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// First level-one heading, if the report has one.
    pub fn title(&self) -> Option<String> {
        let mut in_title = false;
        let mut title = String::new();

        for event in Parser::new_ext(&self.markdown, Self::options()) {
            match event {
                Event::Start(Tag::Heading {
                    level: HeadingLevel::H1,
                    ..
                }) => in_title = true,
                Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_title => {
                    return Some(title.trim().to_string());
                }
                Event::Text(text) | Event::Code(text) if in_title => title.push_str(&text),
                _ => {}
            }
        }
        None
    }

    /// Renders a standalone HTML document.
    pub fn to_html_document(&self) -> String {
        let title = self
            .title()
            .unwrap_or_else(|| "Alignment Report".to_string());
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(&title),
            STYLESHEET,
            self.to_html()
        )
    }

    pub fn save_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_html_document())?;
        tracing::info!("[Export] Wrote report HTML to {}", path.display());
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
