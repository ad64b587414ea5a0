//! Plan text formatting
//!
//! Turns the semi-structured text returned by the plan generator into an
//! ordered sequence of [`ContentBlock`]s for on-screen rendering, and into
//! flat plain text for document export.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TripPlannerError;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\s+").expect("bullet pattern is valid"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("numbered pattern is valid"));

// Private-use code points marking emphasis between the bold pass and
// line classification
const EMPHASIS_OPEN: char = '\u{E000}';
const EMPHASIS_CLOSE: char = '\u{E001}';

/// Prefix of a bullet line in plain text and HTML output
pub const BULLET_PREFIX: &str = "• ";

/// Colour scheme the renderer styles its output for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Container classes for rendered plan content
    #[must_use]
    pub fn container_class(self) -> &'static str {
        match self {
            ThemeMode::Light => "prose text-gray-800",
            ThemeMode::Dark => "prose dark text-slate-200",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = TripPlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(TripPlannerError::validation(format!(
                "Unknown theme '{other}'. Use 'light' or 'dark'."
            ))),
        }
    }
}

/// Run of text with uniform emphasis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub emphasis: bool,
}

/// Inline text made of plain and emphasized spans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub spans: Vec<Span>,
}

impl RichText {
    /// Text with emphasis dropped
    #[must_use]
    pub fn plain(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Build from a line carrying emphasis sentinels
    fn from_marked(line: &str) -> Self {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut emphasis = false;

        for ch in line.chars() {
            let toggle = match ch {
                EMPHASIS_OPEN => Some(true),
                EMPHASIS_CLOSE => Some(false),
                _ => None,
            };
            match toggle {
                Some(next) => {
                    if !current.is_empty() {
                        spans.push(Span {
                            text: std::mem::take(&mut current),
                            emphasis,
                        });
                    }
                    emphasis = next;
                }
                None => current.push(ch),
            }
        }
        if !current.is_empty() {
            spans.push(Span {
                text: current,
                emphasis,
            });
        }

        Self { spans }
    }

    fn to_html(&self) -> String {
        self.spans
            .iter()
            .map(|span| {
                if span.emphasis {
                    format!("<strong>{}</strong>", escape_html(&span.text))
                } else {
                    escape_html(&span.text)
                }
            })
            .collect()
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self {
            spans: vec![Span {
                text: text.to_string(),
                emphasis: false,
            }],
        }
    }
}

/// Output unit of the formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Consecutive bullet lines, markers stripped
    List { items: Vec<RichText> },
    /// A single line; `numbered` lines keep their number prefix
    Paragraph { text: RichText, numbered: bool },
}

/// Split plan text into content blocks.
///
/// Each numbered line stands alone as its own paragraph; only bullets are
/// grouped.
#[must_use]
pub fn format_response(text: &str) -> Vec<ContentBlock> {
    let cleaned: String = text
        .chars()
        .filter(|ch| *ch != EMPHASIS_OPEN && *ch != EMPHASIS_CLOSE)
        .collect();
    let marked = BOLD.replace_all(&cleaned, format!("{EMPHASIS_OPEN}${{1}}{EMPHASIS_CLOSE}"));

    let mut blocks = Vec::new();
    let mut open_list: Option<Vec<RichText>> = None;

    for line in marked.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(marker) = BULLET.find(line) {
            open_list
                .get_or_insert_with(Vec::new)
                .push(RichText::from_marked(&line[marker.end()..]));
            continue;
        }

        if let Some(items) = open_list.take() {
            blocks.push(ContentBlock::List { items });
        }

        blocks.push(ContentBlock::Paragraph {
            text: RichText::from_marked(line),
            numbered: NUMBERED.is_match(line),
        });
    }

    if let Some(items) = open_list {
        blocks.push(ContentBlock::List { items });
    }

    blocks
}

/// Plain-text rendition used for export: emphasis removed, blank lines
/// dropped, bullets rewritten with a literal `• ` prefix
#[must_use]
pub fn flatten_plain_text(text: &str) -> String {
    let unbolded = BOLD.replace_all(text, "${1}");

    unbolded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match BULLET.find(line) {
            Some(marker) => format!("{BULLET_PREFIX}{}", &line[marker.end()..]),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render blocks as an HTML fragment styled for `theme`
#[must_use]
pub fn render_html(blocks: &[ContentBlock], theme: ThemeMode) -> String {
    let mut output = Vec::new();
    output.push(format!("<div class=\"{}\">", theme.container_class()));

    for block in blocks {
        match block {
            ContentBlock::List { items } => {
                output.push("<ul>".to_string());
                for item in items {
                    output.push(format!("<li>{BULLET_PREFIX}{}</li>", item.to_html()));
                }
                output.push("</ul>".to_string());
            }
            ContentBlock::Paragraph {
                text,
                numbered: true,
            } => output.push(format!("<p class=\"mb-[1px]\">{}</p>", text.to_html())),
            ContentBlock::Paragraph { text, .. } => {
                output.push(format!("<div>{}</div>", text.to_html()));
            }
        }
    }

    output.push("</div>".to_string());
    output.join("\n")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn paragraph(text: &str, numbered: bool) -> ContentBlock {
        ContentBlock::Paragraph {
            text: text.into(),
            numbered,
        }
    }

    #[test]
    fn test_bullets_are_grouped() {
        let blocks = format_response("* a\n* b\nc");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::List {
                    items: vec!["a".into(), "b".into()]
                },
                paragraph("c", false),
            ]
        );
    }

    #[test]
    fn test_numbered_lines_stand_alone() {
        let blocks = format_response("1. a\n2. b");
        assert_eq!(blocks, vec![paragraph("1. a", true), paragraph("2. b", true)]);
    }

    #[test]
    fn test_blank_lines_only_separate() {
        let blocks = format_response("\n\n* a\n\n* b\n   \n");
        assert_eq!(
            blocks,
            vec![ContentBlock::List {
                items: vec!["a".into(), "b".into()]
            }]
        );
        assert!(format_response("  \n\n").is_empty());
    }

    #[test]
    fn test_bold_spans_become_emphasis() {
        let blocks = format_response("**Clothing** for *rain*\n* **Umbrella** (compact)");
        assert_eq!(
            blocks[0],
            ContentBlock::Paragraph {
                text: RichText {
                    spans: vec![
                        Span {
                            text: "Clothing".into(),
                            emphasis: true
                        },
                        Span {
                            text: " for *rain*".into(),
                            emphasis: false
                        },
                    ]
                },
                numbered: false,
            }
        );
        let ContentBlock::List { items } = &blocks[1] else {
            panic!("expected a list, got {:?}", blocks[1]);
        };
        assert_eq!(items[0].plain(), "Umbrella (compact)");
        assert!(items[0].spans[0].emphasis);
    }

    #[test]
    fn test_bold_line_is_not_a_bullet() {
        let blocks = format_response("**Day 1** arrive");
        assert!(matches!(blocks[0], ContentBlock::Paragraph { numbered: false, .. }));
    }

    #[rstest]
    #[case("* a\n* b\nc", "• a\n• b\nc")]
    #[case("**Essentials**\n\n*   passport\n1. Book hotel", "Essentials\n• passport\n1. Book hotel")]
    #[case("  plain  ", "plain")]
    #[case("", "")]
    fn test_flatten_plain_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(flatten_plain_text(input), expected);
    }

    #[rstest]
    #[case("**Packing list** for Tokyo\n\n* Light jacket\n* **Umbrella**\n1. Check visa\n2. Book rail pass\nEnjoy!")]
    #[case("* a\n* b\nc")]
    #[case("No response.")]
    fn test_flatten_is_idempotent(#[case] input: &str) {
        let once = flatten_plain_text(input);
        assert_eq!(flatten_plain_text(&once), once);
    }

    #[test]
    fn test_render_html() {
        let blocks = format_response("**Tips** & tricks\n* socks\n* <shoes>\n1. pack early");
        let html = render_html(&blocks, ThemeMode::Light);
        assert_eq!(
            html,
            "<div class=\"prose text-gray-800\">\n\
             <div><strong>Tips</strong> &amp; tricks</div>\n\
             <ul>\n\
             <li>• socks</li>\n\
             <li>• &lt;shoes&gt;</li>\n\
             </ul>\n\
             <p class=\"mb-[1px]\">1. pack early</p>\n\
             </div>"
        );
    }

    #[test]
    fn test_theme_changes_container() {
        let blocks = format_response("hello");
        assert!(render_html(&blocks, ThemeMode::Dark).starts_with("<div class=\"prose dark"));
        assert_eq!("Dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!("sepia".parse::<ThemeMode>().is_err());
    }
}
