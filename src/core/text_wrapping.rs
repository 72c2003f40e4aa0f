//! Display-width aware wrapping for rendered code lines.
//!
//! Lines are broken at whitespace when possible and hard-split when a single
//! word is wider than the target. Leading indentation is kept as typed, and
//! whitespace that falls on a break is dropped.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const TAB_WIDTH: usize = 4;

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

pub fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Wrap one line (no `\n` inside) to at most `width` columns.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if display_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for (segment, is_space) in segments(line) {
        let segment_width = display_width(segment);
        if current_width + segment_width <= width {
            current.push_str(segment);
            current_width += segment_width;
            continue;
        }

        if is_space {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                current_width = 0;
            }
            continue;
        }

        if !current.trim().is_empty() {
            let line = std::mem::take(&mut current);
            wrapped.push(line.trim_end().to_string());
            current_width = 0;
        }

        if current_width + segment_width <= width {
            current.push_str(segment);
            current_width += segment_width;
            continue;
        }

        for ch in segment.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if current_width + ch_width > width && !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(ch);
            current_width += ch_width;
        }
    }

    if !current.is_empty() || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

/// Alternating runs of whitespace and non-whitespace.
fn segments(line: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in line.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                out.push((&line[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if let Some(space) = in_space {
        out.push((&line[start..], space));
    }
    out
}
