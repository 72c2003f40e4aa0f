use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Requested position is outside `1..=count`.
    IndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::IndexOutOfRange { index, count } if *count == 0 => {
                write!(f, "Invalid code block number {index}: no code blocks yet")
            }
            RegistryError::IndexOutOfRange { index, count } => {
                write!(f, "Invalid code block number {index} (valid: 1-{count})")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Append-only list of rendered code blocks from assistant replies,
/// addressed by 1-based position.
#[derive(Debug, Default, Clone)]
pub struct CodeBlockRegistry {
    blocks: Vec<String>,
}

impl CodeBlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` and return its 1-based index.
    pub fn append(&mut self, body: String) -> usize {
        self.blocks.push(body);
        self.blocks.len()
    }

    pub fn get(&self, index: usize) -> Result<&str, RegistryError> {
        index
            .checked_sub(1)
            .and_then(|idx| self.blocks.get(idx))
            .map(String::as_str)
            .ok_or(RegistryError::IndexOutOfRange {
                index,
                count: self.blocks.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
