//! # Text Measurement
//!
//! A small reference measurer so the column engine can run on real text:
//! greedy line breaking on UAX#14 opportunities with uniform glyph advances.
//! Real glyph metrics and painting belong to whatever renders the text; this
//! is only precise enough to decide how much text a column can seat.
//!
//! [`flow`] builds content blocks on top of it that share one body of text
//! across a chain of columns.

pub mod flow;

use serde::{Deserialize, Serialize};
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Metrics used to turn characters into widths and lines into heights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_size: f64,
    /// Distance between consecutive baselines, in pixels.
    pub line_height: f64,
    /// Advance of every glyph as a fraction of the font size.
    pub advance_em: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            line_height: 20.0,
            advance_em: 0.5,
        }
    }
}

impl TextStyle {
    pub fn advance(&self) -> f64 {
        self.font_size * self.advance_em
    }
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The visible text (line separators stripped).
    pub text: String,
    pub width: f64,
    /// First consumed char index in the source text.
    pub start: usize,
    /// One past the last consumed char index, separators included.
    pub end: usize,
}

fn is_line_separator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity *before* char `i`. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn make_line(chars: &[char], start: usize, end: usize, advance: f64) -> BrokenLine {
    let text: String = chars[start..end]
        .iter()
        .filter(|c| !is_line_separator(**c))
        .collect();
    let width = text.chars().count() as f64 * advance;
    BrokenLine {
        text,
        width,
        start,
        end,
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Greedy: each line takes as many characters as fit and then backs up to
/// the last break opportunity. A word longer than the line is split where it
/// overflows. Mandatory breaks always end the line.
pub fn break_into_lines(text: &str, max_width: f64, style: &TextStyle) -> Vec<BrokenLine> {
    if text.is_empty() {
        return Vec::new();
    }

    let advance = style.advance();
    let chars: Vec<char> = text.chars().collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(make_line(&chars, line_start, i, advance));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                // The break is *after* char i-1.
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i - 1),
                None => {}
            }
        }

        if is_line_separator(ch) {
            continue;
        }

        if line_width + advance > max_width && line_start < i {
            if let Some(bp) = last_break_point.filter(|bp| *bp >= line_start) {
                lines.push(make_line(&chars, line_start, bp + 1, advance));
                line_start = bp + 1;
                line_width = chars[line_start..=i]
                    .iter()
                    .filter(|c| !is_line_separator(**c))
                    .count() as f64
                    * advance;
            } else {
                // No break opportunity on this line: split the word here.
                lines.push(make_line(&chars, line_start, i, advance));
                line_start = i;
                line_width = advance;
            }
            last_break_point = None;
            continue;
        }

        line_width += advance;
    }

    if line_start < chars.len() {
        lines.push(make_line(&chars, line_start, chars.len(), advance));
    }

    lines
}
