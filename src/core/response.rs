use super::code_blocks::CodeBlockRegistry;
use super::segmenter::{CodeSegment, SegmentEvent, StreamSegmenter};

/// Displayable output for one streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseEvent {
    Prose(String),
    /// A finished code block and its 1-based registry index.
    Code { index: usize, segment: CodeSegment },
}

/// State for a single streamed reply: the segmenter plus the full text seen
/// so far. Completed code blocks are registered as they close.
pub struct ResponseStream<'a> {
    segmenter: StreamSegmenter,
    full_response: String,
    registry: &'a mut CodeBlockRegistry,
}

impl<'a> ResponseStream<'a> {
    pub fn new(registry: &'a mut CodeBlockRegistry, render_width: usize) -> Self {
        Self {
            segmenter: StreamSegmenter::new(render_width),
            full_response: String::new(),
            registry,
        }
    }

    pub fn push(&mut self, fragment: &str) -> Vec<ResponseEvent> {
        self.full_response.push_str(fragment);
        let events = self.segmenter.feed(fragment);
        events.into_iter().map(|event| self.register(event)).collect()
    }

    /// Finish the reply, force-finalizing any unclosed code block.
    /// Returns the trailing event, if any, and the complete response text.
    pub fn finish(mut self) -> (Option<ResponseEvent>, String) {
        let last = self.segmenter.flush().map(|event| self.register(event));
        (last, self.full_response)
    }

    pub fn full_response(&self) -> &str {
        &self.full_response
    }

    fn register(&mut self, event: SegmentEvent) -> ResponseEvent {
        match event {
            SegmentEvent::Prose(text) => ResponseEvent::Prose(text),
            SegmentEvent::CodeBlockClosed(segment) => {
                if !segment.closed {
                    tracing::debug!("Stream ended inside a code block; keeping partial block");
                }
                let index = self.registry.append(segment.rendered.clone());
                ResponseEvent::Code { index, segment }
            }
        }
    }
}
