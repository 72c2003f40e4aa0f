//! Incremental prose/code segmentation of a streamed reply.
//!
//! [`StreamSegmenter`] is fed fragments as they arrive and splits them at
//! triple-backtick fences. Prose is handed back right away; code is buffered
//! until its closing fence and then returned as a rendered [`CodeSegment`].
//! Up to two trailing backticks of a fragment are held back until the next
//! call so that a fence split across fragments is still recognised, which
//! makes the output independent of how the stream was chunked.

use super::text_wrapping::{expand_tabs, wrap_line};

pub const FENCE: &str = "```";

/// Render width used when the terminal size is unknown.
pub const DEFAULT_RENDER_WIDTH: usize = 74;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentState {
    #[default]
    Prose,
    CodeBody,
}

/// A finished fenced region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSegment {
    /// Language tag from the opening fence line, if present.
    pub language: Option<String>,
    /// Everything between the fences, exactly as streamed.
    pub raw: String,
    /// Display form: fence and language tag removed, blank edges trimmed,
    /// long lines wrapped.
    pub rendered: String,
    /// False when the stream ended before the closing fence arrived.
    pub closed: bool,
}

impl CodeSegment {
    /// The streamed text this segment was cut from, fences included.
    pub fn source(&self) -> String {
        let closing = if self.closed { FENCE } else { "" };
        format!("{FENCE}{}{closing}", self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEvent {
    Prose(String),
    CodeBlockClosed(CodeSegment),
}

#[derive(Debug, Clone)]
pub struct StreamSegmenter {
    state: SegmentState,
    code_buffer: String,
    pending: String,
    render_width: usize,
}

impl Default for StreamSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_WIDTH)
    }
}

impl StreamSegmenter {
    pub fn new(render_width: usize) -> Self {
        Self {
            state: SegmentState::Prose,
            code_buffer: String::new(),
            pending: String::new(),
            render_width: render_width.max(1),
        }
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    pub fn in_code_block(&self) -> bool {
        self.state == SegmentState::CodeBody
    }

    /// Consume one fragment of the stream.
    pub fn feed(&mut self, fragment: &str) -> Vec<SegmentEvent> {
        let mut input = std::mem::take(&mut self.pending);
        input.push_str(fragment);

        // Backticks ending the input may be the start of a fence.
        let trailing = input.len() - input.trim_end_matches('`').len();
        let held = trailing % FENCE.len();
        let split = input.len() - held;
        self.pending = input[split..].to_string();

        let mut events = Vec::new();
        let mut rest = &input[..split];

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(FENCE) {
                rest = after;
                self.toggle(&mut events);
                continue;
            }

            let next_fence = rest.find(FENCE).unwrap_or(rest.len());
            match self.state {
                SegmentState::Prose => {
                    events.push(SegmentEvent::Prose(rest[..next_fence].to_string()));
                    rest = &rest[next_fence..];
                }
                SegmentState::CodeBody => {
                    let take = rest[..next_fence]
                        .find('\n')
                        .map(|pos| pos + 1)
                        .unwrap_or(next_fence);
                    self.code_buffer.push_str(&rest[..take]);
                    rest = &rest[take..];
                }
            }
        }

        events
    }

    /// End of stream: release held text and force-finalize an unclosed block.
    pub fn flush(&mut self) -> Option<SegmentEvent> {
        let pending = std::mem::take(&mut self.pending);
        match self.state {
            SegmentState::Prose => (!pending.is_empty()).then_some(SegmentEvent::Prose(pending)),
            SegmentState::CodeBody => {
                self.state = SegmentState::Prose;
                self.code_buffer.push_str(&pending);
                if self.code_buffer.is_empty() {
                    return None;
                }
                Some(SegmentEvent::CodeBlockClosed(self.finish(false)))
            }
        }
    }

    fn toggle(&mut self, events: &mut Vec<SegmentEvent>) {
        match self.state {
            SegmentState::Prose => self.state = SegmentState::CodeBody,
            SegmentState::CodeBody => {
                self.state = SegmentState::Prose;
                if !self.code_buffer.is_empty() {
                    events.push(SegmentEvent::CodeBlockClosed(self.finish(true)));
                }
            }
        }
    }

    fn finish(&mut self, closed: bool) -> CodeSegment {
        let raw = std::mem::take(&mut self.code_buffer);
        let (language, rendered) = render_code(&raw, self.render_width);
        CodeSegment {
            language,
            raw,
            rendered,
            closed,
        }
    }
}

/// Split off a language tag and produce the display body of a code block.
pub fn render_code(raw: &str, width: usize) -> (Option<String>, String) {
    let (language, code) = match raw.split_once('\n') {
        Some((first, rest)) if is_language_tag(first.trim()) => {
            (Some(first.trim().to_string()), rest)
        }
        _ => (None, raw),
    };

    let lines: Vec<&str> = code.lines().collect();
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |pos| pos + 1);

    let rendered = lines[start..end]
        .iter()
        .flat_map(|line| wrap_line(&expand_tabs(line), width))
        .collect::<Vec<_>>()
        .join("\n");
    (language, rendered)
}

fn is_language_tag(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '+' | '-' | '#' | '.' | '_'))
}
