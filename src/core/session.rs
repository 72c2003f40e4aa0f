use std::fmt;

use super::code_blocks::CodeBlockRegistry;
use super::message::{Message, Role};
use super::persona::Persona;
use crate::project::ProjectIndex;

pub const CONTEXT_BAR_CELLS: usize = 12;

/// Everything one conversation owns. Sessions never share state.
#[derive(Debug)]
pub struct ChatSession {
    persona: Persona,
    messages: Vec<Message>,
    pub project: ProjectIndex,
    pub code_blocks: CodeBlockRegistry,
}

impl ChatSession {
    pub fn new(persona: Persona) -> Self {
        Self {
            persona,
            messages: vec![Message::system(persona.description)],
            project: ProjectIndex::default(),
            code_blocks: CodeBlockRegistry::new(),
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Drop the last message if it is an unanswered user turn.
    pub fn pop_unanswered(&mut self) -> Option<Message> {
        match self.messages.last() {
            Some(message) if message.role == Role::User => self.messages.pop(),
            _ => None,
        }
    }

    /// Back to just the persona message. The loaded project is kept.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        self.code_blocks.clear();
    }

    /// History length excluding the system message.
    pub fn context_size(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }

    pub fn context_usage(&self, max_messages: usize) -> ContextUsage {
        ContextUsage::new(self.context_size(), max_messages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextUsage {
    pub ratio: f64,
}

impl ContextUsage {
    pub fn new(used: usize, max: usize) -> Self {
        let ratio = if max == 0 {
            1.0
        } else {
            (used as f64 / max as f64).min(1.0)
        };
        Self { ratio }
    }

    pub fn filled_cells(&self) -> usize {
        (CONTEXT_BAR_CELLS as f64 * self.ratio) as usize
    }

    pub fn percent(&self) -> u32 {
        (self.ratio * 100.0) as u32
    }

    pub fn level(&self) -> UsageLevel {
        if self.ratio <= 0.4 {
            UsageLevel::Low
        } else if self.ratio <= 0.75 {
            UsageLevel::Medium
        } else {
            UsageLevel::High
        }
    }
}

impl fmt::Display for ContextUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.filled_cells();
        write!(
            f,
            "[{}{}] {}%",
            "█".repeat(filled),
            "░".repeat(CONTEXT_BAR_CELLS - filled),
            self.percent()
        )
    }
}
