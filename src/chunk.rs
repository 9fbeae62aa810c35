//! Fixed-size overlapping text chunker.
//!
//! Splits extracted document text into [`Chunk`]s of `chunk_size` characters,
//! with consecutive chunks sharing `overlap` characters. Sizes and offsets
//! are counted in `char`s, so multi-byte text is never cut inside a code
//! point.
//!
//! # Algorithm
//!
//! 1. Reject `chunk_size <= overlap` with [`DocragError::InvalidConfig`].
//! 2. Starting at offset 0, take up to `chunk_size` chars.
//! 3. Advance the offset by the stride `chunk_size - overlap` and repeat
//!    while the offset is inside the text.
//! 4. Stamp every chunk with the same `total_chunks`, chosen by
//!    [`TotalChunks`].
//!
//! # Example
//!
//! ```rust
//! use docrag::chunk::{chunk_text, TotalChunks};
//!
//! let chunks = chunk_text("abcdef", "a.pdf", 4, 2, TotalChunks::Exact).unwrap();
//! let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
//! assert_eq!(texts, ["abcd", "cdef", "ef"]);
//! ```

use serde::Deserialize;

use crate::error::{DocragError, Result};
use crate::models::{Chunk, ChunkMetadata};

/// How `metadata.total_chunks` is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalChunks {
    /// `floor(len / stride) + 1`. Overstates the emitted count by one when
    /// `len` is an exact multiple of the stride (including empty text).
    /// Matches chunk files written by earlier versions.
    #[default]
    Estimate,
    /// The number of chunks actually emitted.
    Exact,
}

impl TotalChunks {
    fn compute(self, len: usize, stride: usize) -> usize {
        match self {
            TotalChunks::Estimate => len / stride + 1,
            TotalChunks::Exact => len.div_ceil(stride),
        }
    }
}

/// Check the chunking precondition `chunk_size > overlap`.
pub fn validate(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size <= overlap {
        return Err(DocragError::invalid_config(format!(
            "chunk_size ({}) must be greater than overlap ({})",
            chunk_size, overlap
        )));
    }
    Ok(())
}

/// Split `text` into overlapping fixed-size chunks tagged with `source`.
///
/// Empty text yields no chunks. The output is a pure function of the
/// arguments.
pub fn chunk_text(
    text: &str,
    source: &str,
    chunk_size: usize,
    overlap: usize,
    total: TotalChunks,
) -> Result<Vec<Chunk>> {
    validate(chunk_size, overlap)?;

    // Byte offset of every char boundary, plus the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = bounds.len() - 1;
    if len == 0 {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let total_chunks = total.compute(len, stride);

    let mut chunks = Vec::with_capacity(len.div_ceil(stride));
    let mut start = 0;
    while start < len {
        let end = (start + chunk_size).min(len);
        let piece = &text[bounds[start]..bounds[end]];
        if !piece.is_empty() {
            chunks.push(Chunk {
                text: piece.to_string(),
                metadata: ChunkMetadata {
                    source: source.to_string(),
                    chunk_index: chunks.len(),
                    total_chunks,
                },
            });
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
        chunk_text(text, "doc.pdf", size, overlap, TotalChunks::Estimate).unwrap()
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(chunk("", 1000, 100).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk("ab", 1000, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "ab");
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[0].metadata.source, "doc.pdf");
    }

    #[test]
    fn test_rejects_overlap_not_below_size() {
        let err = chunk_text("abc", "s", 100, 100, TotalChunks::Estimate).unwrap_err();
        assert!(matches!(err, DocragError::InvalidConfig(_)));
        assert!(chunk_text("abc", "s", 0, 0, TotalChunks::Exact).is_err());
        assert!(chunk_text("abc", "s", 10, 20, TotalChunks::Exact).is_err());
    }

    #[test]
    fn test_offsets_advance_by_stride_without_gaps() {
        let text: String = (0..2_345).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chars: Vec<char> = text.chars().collect();
        let (size, overlap) = (1000, 100);
        let stride = size - overlap;
        let chunks = chunk(&text, size, overlap);

        let mut covered = vec![false; chars.len()];
        for (i, c) in chunks.iter().enumerate() {
            let start = i * stride;
            let end = (start + size).min(chars.len());
            let expected: String = chars[start..end].iter().collect();
            assert_eq!(c.text, expected, "chunk {} does not start at {}", i, start);
            assert_eq!(c.metadata.chunk_index, i);
            covered[start..end].iter_mut().for_each(|slot| *slot = true);
        }
        assert!(covered.iter().all(|&c| c), "some characters were not chunked");
    }

    #[test]
    fn test_overlap_shared_between_neighbours() {
        let chunks = chunk("0123456789", 4, 1);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["0123", "3456", "6789", "9"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma delta epsilon zeta eta theta.".repeat(40);
        assert_eq!(chunk(&text, 100, 10), chunk(&text, 100, 10));
    }

    #[test]
    fn test_total_chunks_constant_across_document() {
        let text = "x".repeat(2_500);
        let chunks = chunk(&text, 1000, 100);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.metadata.total_chunks == 3));
    }

    #[test]
    fn test_estimate_diverges_on_exact_multiple_of_stride() {
        let text = "y".repeat(900);
        let estimated = chunk_text(&text, "s", 1000, 100, TotalChunks::Estimate).unwrap();
        let exact = chunk_text(&text, "s", 1000, 100, TotalChunks::Exact).unwrap();
        assert_eq!(estimated.len(), 1);
        assert_eq!(estimated[0].metadata.total_chunks, 2);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].metadata.total_chunks, 1);
    }

    #[test]
    fn test_multibyte_text_split_on_char_boundaries() {
        let text = "héllo wörld • ünïcode ✓".repeat(3);
        let chunks = chunk(&text, 7, 2);
        let stride = 5;
        let chars: Vec<char> = text.chars().collect();
        for (i, c) in chunks.iter().enumerate() {
            let start = i * stride;
            let end = (start + 7).min(chars.len());
            assert_eq!(c.text, chars[start..end].iter().collect::<String>());
        }
    }
}
