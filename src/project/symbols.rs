//! Line-scanning symbol and import extraction.
//!
//! This is a heuristic, not a parser. Every line whose trimmed form opens a
//! definition starts a new block, whatever its indentation, and the block runs
//! until the next definition line or end of file. Blocks never nest: a method
//! inside a class closes the class block and opens its own.

use std::path::Path;

/// Characters kept from a file that is indexed as a single whole-file block.
pub const DEFAULT_FILE_SCOPE_LIMIT: usize = 8000;

/// Display label for blocks that carry no symbol name.
pub const FILE_SCOPE_LABEL: &str = "file_scope";

const DEFINITION_KEYWORDS: &[&str] = &["async def ", "def ", "class "];
const IMPORT_PREFIXES: &[&str] = &["import ", "from ", "#include"];

/// How a file's text is split into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Definitions can be recognised line by line.
    Structured,
    /// The whole (truncated) file is one block.
    Opaque,
}

impl SourceKind {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("py") => SourceKind::Structured,
            _ => SourceKind::Opaque,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Symbol name, or `None` for a whole-file block.
    pub name: Option<String>,
    pub body: String,
}

impl CodeBlock {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(FILE_SCOPE_LABEL)
    }
}

pub fn extract_blocks(content: &str, kind: SourceKind, file_scope_limit: usize) -> Vec<CodeBlock> {
    match kind {
        SourceKind::Structured => extract_definitions(content),
        SourceKind::Opaque => vec![CodeBlock {
            name: None,
            body: content.chars().take(file_scope_limit).collect(),
        }],
    }
}

fn extract_definitions(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(name) = definition_name(line.trim()) {
            if let Some((name, lines)) = current.take() {
                blocks.push(finish_block(name, &lines));
            }
            current = Some((name, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((name, lines)) = current {
        blocks.push(finish_block(name, &lines));
    }
    blocks
}

fn finish_block(name: String, lines: &[&str]) -> CodeBlock {
    CodeBlock {
        name: Some(name),
        body: lines.join("\n"),
    }
}

/// Name defined by `trimmed`, if the line opens a definition.
fn definition_name(trimmed: &str) -> Option<String> {
    let rest = DEFINITION_KEYWORDS
        .iter()
        .find_map(|keyword| trimmed.strip_prefix(keyword))?;
    let end = rest.find(['(', ':']).unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Import and include lines, trimmed, in file order. Duplicates are kept.
pub fn extract_imports(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| IMPORT_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .map(str::to_string)
        .collect()
}
