//! Output filters applied to captured process output.
//!
//! A filter is a pure function from the raw text read from the process to
//! the text handed back to the caller. Filters never influence what is sent
//! to the process.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

lazy_static! {
    /// Two or more whitespace characters on the same line.
    static ref HORIZONTAL_RUN: Regex = Regex::new(r"[^\S\n]{2,}").unwrap();
    /// A line break followed by one or more (possibly blank) line breaks.
    static ref BLANK_LINES: Regex = Regex::new(r"\n(?:[^\S\n]*\n)+").unwrap();
    /// Interpreter prompt at the very end of the output, e.g. `>` or ` Story>`.
    static ref TRAILING_PROMPT: Regex = Regex::new(r"(?:^|\s)\w*>$").unwrap();
    /// A line break together with the whitespace around it.
    static ref LINE_BREAK: Regex = Regex::new(r"\s*\n\s*").unwrap();
}

/// Named output filter, selected per session through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFilter {
    /// Trimmed text, single line breaks between paragraphs, no prompt
    #[default]
    Compact,
    /// Like `Compact`, with every line break turned into a space
    Oneline,
    /// Raw output, unchanged
    None,
}

impl OutputFilter {
    /// All available filters.
    pub const ALL: [OutputFilter; 3] = [
        OutputFilter::Compact,
        OutputFilter::Oneline,
        OutputFilter::None,
    ];

    /// Name used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFilter::Compact => "compact",
            OutputFilter::Oneline => "oneline",
            OutputFilter::None => "none",
        }
    }

    /// Apply the filter to raw process output.
    pub fn apply(&self, raw: &str) -> String {
        match self {
            OutputFilter::Compact => compact(raw),
            OutputFilter::Oneline => oneline(raw),
            OutputFilter::None => raw.to_string(),
        }
    }
}

impl fmt::Display for OutputFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OutputFilter::ALL
            .iter()
            .copied()
            .find(|filter| filter.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "unknown filter '{s}' (expected one of: compact, oneline, none)"
                ))
            })
    }
}

fn compact(raw: &str) -> String {
    let text = raw.replace('\r', "");
    let text = HORIZONTAL_RUN.replace_all(text.trim(), " ");
    let text = join_wrapped_words(&text);
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = TRAILING_PROMPT.replace(&text, "");
    text.trim().to_string()
}

fn oneline(raw: &str) -> String {
    LINE_BREAK.replace_all(&compact(raw), " ").into_owned()
}

/// Replace a single line break between two word characters with a space.
///
/// The interpreter wraps paragraphs at the screen width; this puts the words
/// on both sides of a wrap back on one line.
fn join_wrapped_words(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let wrapped = c == '\n'
            && prev.is_some_and(is_word_char)
            && chars.peek().is_some_and(|next| is_word_char(*next));
        joined.push(if wrapped { ' ' } else { c });
        prev = Some(c);
    }

    joined
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
