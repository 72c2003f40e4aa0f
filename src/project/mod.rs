//! Project indexing and heuristic retrieval.
//!
//! A directory is walked once into a [`ProjectIndex`]: each readable file is
//! split into overlapping [`ContentChunk`]s and into named [`CodeBlock`]s, with
//! its import lines kept alongside. A [`Retriever`] then scores every block
//! against a free-text question and packs the best ones into a bounded
//! context injection.

pub mod chunker;
pub mod error;
pub mod index;
pub mod retriever;
pub mod symbols;

pub use chunker::{chunk_text, ContentChunk};
pub use error::{FileSkip, ProjectError};
pub use index::{BlockEntry, FileSummary, IndexOptions, IndexedFile, ProjectIndex};
pub use retriever::{
    detect_traceback_target, score_block, RankedSection, Retrieval, Retriever, ScoreWeights,
};
pub use symbols::{extract_blocks, extract_imports, CodeBlock, SourceKind};
