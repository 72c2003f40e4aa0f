//! Fixed-size, overlapping text windows.
//!
//! Windows are measured in `char`s so multi-byte text never splits inside a
//! code point. Each [`ContentChunk`] remembers where it starts, which lets
//! callers stitch the original text back together by dropping the overlap
//! prefix from every chunk after the first.

/// Default window size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;
/// Default number of characters shared with the previous window.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// Offset of the first character of this chunk, in chars.
    pub offset: usize,
    pub text: String,
}

impl ContentChunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into windows of `size` chars, each sharing `overlap` chars with
/// the one before it.
///
/// Requires `0 < overlap < size`; out-of-range values are clamped so the
/// window always advances. Empty input yields no chunks, and input no longer
/// than `size` yields exactly one.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<ContentChunk> {
    let size = size.max(1);
    let overlap = overlap.min(size - 1);
    let step = size - overlap;

    // Byte offset of every char start, plus the end of the string.
    let mut bounds: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
    let char_len = bounds.len();
    bounds.push(text.len());

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < char_len {
        let end = (start + size).min(char_len);
        chunks.push(ContentChunk {
            offset: start,
            text: text[bounds[start]..bounds[end]].to_string(),
        });
        if end == char_len {
            break;
        }
        start += step;
    }
    chunks
}

/// Number of chunks [`chunk_text`] produces for a text of `len` chars.
pub fn expected_chunk_count(len: usize, size: usize, overlap: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if len <= size {
        return 1;
    }
    let step = size - overlap;
    (len - overlap).div_ceil(step)
}

/// Rebuild the original text from chunks produced with the given `overlap`.
pub fn reassemble(chunks: &[ContentChunk], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(&chunk.text);
        } else {
            out.extend(chunk.text.chars().skip(overlap));
        }
    }
    out
}
