//! Text chunking
//!
//! Splits extracted document text into ordered, bounded-size chunks. The
//! bound is measured either in whitespace-delimited words or in Unicode
//! characters; both policies produce `ceil(units / size)` chunks with only
//! the last one allowed to be short.

mod trace;

pub use trace::ChunkTrace;

use crate::error::InvalidArgument;
use serde::{Deserialize, Serialize};

/// Unit a chunk's size bound is measured in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChunkUnit {
    /// Whitespace-delimited words, rejoined with single spaces
    #[default]
    Words,
    /// Unicode scalar values, sliced verbatim
    Characters,
}

impl ChunkUnit {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Characters => "characters",
        }
    }
}

/// A contiguous slice of a document's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position within the document
    pub index: usize,
    pub content: String,
}

/// Splits text into chunks of at most `size` units
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    size: usize,
    unit: ChunkUnit,
}

impl Chunker {
    pub fn new(size: usize, unit: ChunkUnit) -> Result<Self, InvalidArgument> {
        if size == 0 {
            return Err(InvalidArgument("chunk size must be greater than zero".into()));
        }
        Ok(Self { size, unit })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn unit(&self) -> ChunkUnit {
        self.unit
    }

    /// Number of units in `text` under this chunker's policy
    pub fn unit_count(&self, text: &str) -> usize {
        match self.unit {
            ChunkUnit::Words => text.split_whitespace().count(),
            ChunkUnit::Characters => text.chars().count(),
        }
    }

    /// Number of chunks `chunk` will return for `text`
    pub fn expected_chunks(&self, text: &str) -> usize {
        self.unit_count(text).div_ceil(self.size)
    }

    /// Split `text` into ordered chunks. Empty text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let pieces = match self.unit {
            ChunkUnit::Words => self.split_words(text),
            ChunkUnit::Characters => self.split_chars(text),
        };

        pieces
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk { index, content })
            .collect()
    }

    fn split_words(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words.chunks(self.size).map(|group| group.join(" ")).collect()
    }

    fn split_chars(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::with_capacity(self.expected_chunks(text));
        let mut start = 0;

        for (count, (offset, _)) in text.char_indices().enumerate() {
            if count > 0 && count % self.size == 0 {
                pieces.push(text[start..offset].to_string());
                start = offset;
            }
        }

        if start < text.len() {
            pieces.push(text[start..].to_string());
        }

        pieces
    }
}
