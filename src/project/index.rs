use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::chunker::{chunk_text, ContentChunk, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use super::error::{FileSkip, ProjectError};
use super::symbols::{
    extract_blocks, extract_imports, CodeBlock, SourceKind, DEFAULT_FILE_SCOPE_LIMIT,
    FILE_SCOPE_LABEL,
};

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "html", "css", "json", "lua", "c", "cpp", "md",
];

/// Knobs for [`ProjectIndex::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// File extensions to index, without the leading dot.
    pub allowed_extensions: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub file_scope_limit: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            file_scope_limit: DEFAULT_FILE_SCOPE_LIMIT,
        }
    }
}

impl IndexOptions {
    fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// One successfully decoded file. Never mutated after indexing.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Length of the file text in chars.
    pub size: usize,
    pub chunks: Vec<ContentChunk>,
    pub blocks: Vec<CodeBlock>,
    pub imports: Vec<String>,
}

/// A block in the flattened, cross-file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry<'a> {
    pub path: &'a str,
    pub name: Option<&'a str>,
    pub body: &'a str,
}

impl BlockEntry<'_> {
    pub fn display_name(&self) -> &str {
        self.name.unwrap_or(FILE_SCOPE_LABEL)
    }
}

/// Per-file counts shown by `/project list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: String,
    pub size: usize,
    pub blocks: usize,
    pub chunks: usize,
    pub imports: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockId {
    file: usize,
    block: usize,
}

/// In-memory index of one project tree.
///
/// Owns the indexed files plus two derived views: every block in walk order,
/// and a map from symbol name to every block defining it. Replaced wholesale
/// by each build; there is no partial update.
#[derive(Debug, Default)]
pub struct ProjectIndex {
    root: Option<PathBuf>,
    files: Vec<IndexedFile>,
    by_path: HashMap<String, usize>,
    blocks: Vec<BlockId>,
    symbols: HashMap<String, Vec<BlockId>>,
}

impl ProjectIndex {
    /// Walk `root` and index every allowed file that reads as UTF-8.
    ///
    /// Unreadable or undecodable files are skipped. Fails only when `root`
    /// is not a directory.
    pub fn build(root: impl AsRef<Path>, options: &IndexOptions) -> Result<Self, ProjectError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ProjectError::DirectoryNotFound(root.to_path_buf()));
        }

        let mut index = ProjectIndex {
            root: Some(root.to_path_buf()),
            ..Default::default()
        };
        let mut skipped = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Failed to read directory entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !options.allows(entry.path()) {
                continue;
            }

            match read_text(entry.path()) {
                Ok(content) => {
                    let rel = relative_path(root, entry.path());
                    index.insert(rel, entry.path(), &content, options);
                }
                Err(reason) => {
                    skipped += 1;
                    debug!("Skipping {}: {reason}", entry.path().display());
                }
            }
        }

        info!(
            "Indexed {} files, {} code blocks ({} skipped) under {}",
            index.files.len(),
            index.blocks.len(),
            skipped,
            root.display()
        );
        Ok(index)
    }

    fn insert(&mut self, rel: String, path: &Path, content: &str, options: &IndexOptions) {
        if self.by_path.contains_key(&rel) {
            return;
        }

        let blocks = extract_blocks(content, SourceKind::for_path(path), options.file_scope_limit);
        let file_idx = self.files.len();

        for (block_idx, block) in blocks.iter().enumerate() {
            let id = BlockId {
                file: file_idx,
                block: block_idx,
            };
            self.blocks.push(id);
            if let Some(name) = &block.name {
                self.symbols.entry(name.clone()).or_default().push(id);
            }
        }

        self.by_path.insert(rel.clone(), file_idx);
        self.files.push(IndexedFile {
            path: rel,
            size: content.chars().count(),
            chunks: chunk_text(content, options.chunk_size, options.chunk_overlap),
            blocks,
            imports: extract_imports(content),
        });
    }

    /// Drop everything, leaving an unloaded index.
    pub fn remove(&mut self) {
        *self = ProjectIndex::default();
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    /// True when there are no blocks to retrieve from.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.files.iter().map(|file| file.chunks.len()).sum()
    }

    pub fn files(&self) -> &[IndexedFile] {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&IndexedFile> {
        self.by_path.get(path).map(|&idx| &self.files[idx])
    }

    /// Every block across all files, in index order.
    pub fn blocks(&self) -> impl Iterator<Item = BlockEntry<'_>> + '_ {
        self.blocks.iter().map(|&id| self.entry(id))
    }

    /// Every block defining `name`, in index order.
    pub fn symbol(&self, name: &str) -> Vec<BlockEntry<'_>> {
        self.symbols
            .get(name)
            .map(|ids| ids.iter().map(|&id| self.entry(id)).collect())
            .unwrap_or_default()
    }

    pub fn symbol_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.keys().map(String::as_str)
    }

    pub fn list(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|file| FileSummary {
                path: file.path.clone(),
                size: file.size,
                blocks: file.blocks.len(),
                chunks: file.chunks.len(),
                imports: file.imports.len(),
            })
            .collect()
    }

    fn entry(&self, id: BlockId) -> BlockEntry<'_> {
        let file = &self.files[id.file];
        let block = &file.blocks[id.block];
        BlockEntry {
            path: &file.path,
            name: block.name.as_deref(),
            body: &block.body,
        }
    }
}

fn read_text(path: &Path) -> Result<String, FileSkip> {
    let bytes = fs::read(path).map_err(FileSkip::Unreadable)?;
    String::from_utf8(bytes).map_err(|_| FileSkip::NotUtf8)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::write_tree;
    use tempfile::TempDir;

    fn sample_project() -> TempDir {
        write_tree(&[
            ("app.py", "import os\n\ndef login(user):\n    return user\n\nclass Session:\n    pass\n"),
            ("web/routes.py", "from app import login\n\ndef login(req):\n    return req\n"),
            ("web/style.css", "body { color: red; }\n"),
            ("notes.txt", "not indexed\n"),
        ])
    }

    #[test]
    fn build_indexes_allowed_files_in_walk_order() {
        let dir = sample_project();
        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();

        let paths: Vec<_> = index.files().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["app.py", "web/routes.py", "web/style.css"]);
        assert_eq!(index.block_count(), 4);
        assert!(index.file("notes.txt").is_none());
        assert_eq!(index.root(), Some(dir.path()));

        let names: Vec<_> = index.blocks().map(|b| b.display_name().to_string()).collect();
        assert_eq!(names, vec!["login", "Session", "login", "file_scope"]);
    }

    #[test]
    fn symbol_index_keeps_every_definition() {
        let dir = sample_project();
        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();

        let hits = index.symbol("login");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "app.py");
        assert_eq!(hits[1].path, "web/routes.py");
        assert!(index.symbol("file_scope").is_empty());
        assert!(index.symbol("missing").is_empty());
    }

    #[test]
    fn list_reports_counts_per_file() {
        let dir = sample_project();
        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        let app = &index.list()[0];
        assert_eq!(app.path, "app.py");
        assert_eq!(app.blocks, 2);
        assert_eq!(app.chunks, 1);
        assert_eq!(app.imports, 1);
    }

    #[test]
    fn undecodable_files_are_skipped() {
        let dir = write_tree(&[("good.py", "def ok():\n    pass\n")]);
        fs::write(dir.path().join("bad.py"), [0xff, 0xfe, 0x00, 0x61]).unwrap();

        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(index.file_count(), 1);
        assert!(index.file("good.py").is_some());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = ProjectIndex::build(&missing, &IndexOptions::default()).unwrap_err();
        assert!(matches!(err, ProjectError::DirectoryNotFound(path) if path == missing));
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let dir = write_tree(&[("a.py", "")]);
        let err = ProjectIndex::build(dir.path().join("a.py"), &IndexOptions::default());
        assert!(err.is_err());
    }

    #[test]
    fn remove_clears_everything() {
        let dir = sample_project();
        let mut index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        index.remove();
        assert!(!index.is_loaded());
        assert!(index.is_empty());
        assert_eq!(index.file_count(), 0);
        assert!(index.list().is_empty());
        assert_eq!(index.symbol_names().count(), 0);
    }

    #[test]
    fn extension_filter_is_configurable() {
        let dir = sample_project();
        let options = IndexOptions {
            allowed_extensions: vec![".css".to_string()],
            ..Default::default()
        };
        let index = ProjectIndex::build(dir.path(), &options).unwrap();
        assert_eq!(index.file_count(), 1);
        assert_eq!(index.files()[0].path, "web/style.css");
    }

    #[test]
    fn large_files_are_chunked() {
        let body = "x".repeat(9000);
        let dir = write_tree(&[("big.md", body.as_str())]);
        let index = ProjectIndex::build(dir.path(), &IndexOptions::default()).unwrap();
        let file = index.file("big.md").unwrap();
        assert_eq!(file.size, 9000);
        // ceil((9000 - 200) / 1000)
        assert_eq!(file.chunks.len(), 9);
        assert_eq!(file.blocks[0].body.len(), DEFAULT_FILE_SCOPE_LIMIT);
        assert_eq!(index.chunk_count(), 9);
    }
}
