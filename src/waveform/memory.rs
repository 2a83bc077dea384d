use crate::error::WaveformError;
use crate::registers::SNP_MEM_SIZE;

use super::sequence::Sequence;
use super::snippet::Snippet;

pub const MAX_SNIPPETS: usize = 15;
pub const MAX_SEQUENCES: usize = 16;

/// Staging copy of the chip's snippet memory.
///
/// Holds up to 100 bytes. Whether each byte is read as a signed or unsigned
/// level depends on `DeviceConfig::mem_data_signed`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct SnippetMemory {
    data: [u8; SNP_MEM_SIZE],
    len: usize,
}

impl SnippetMemory {
    pub const CAPACITY: usize = SNP_MEM_SIZE;

    pub const fn new() -> Self {
        Self {
            data: [0; SNP_MEM_SIZE],
            len: 0,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, WaveformError> {
        if bytes.len() > SNP_MEM_SIZE {
            return Err(WaveformError::Full(bytes.len()));
        }
        let mut memory = Self::new();
        memory.as_mut_bytes(bytes.len()).copy_from_slice(bytes);
        Ok(memory)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub(crate) fn as_mut_bytes(&mut self, len: usize) -> &mut [u8] {
        self.len = len.min(SNP_MEM_SIZE);
        &mut self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SnippetMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for SnippetMemory {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for SnippetMemory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnippetMemory")
            .field("data", &self.as_bytes())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SnippetMemory {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SnippetMemory data={=[u8]:x}", self.as_bytes())
    }
}

/// Assembles snippets and sequences into the layout the playback engine reads:
///
/// ```text
/// [0]     number of snippets
/// [1]     number of sequences
/// [2..]   one end pointer per snippet, then one per sequence
/// [..]    snippet bytes
/// [..]    sequence bytes
/// ```
///
/// An end pointer is the absolute index of the last byte of its item.
#[derive(Debug, Copy, Clone)]
pub struct WaveformMemoryBuilder {
    snippet_bytes: [u8; SNP_MEM_SIZE],
    snippet_ends: [usize; MAX_SNIPPETS],
    snippets: usize,
    sequence_bytes: [u8; SNP_MEM_SIZE],
    sequence_ends: [usize; MAX_SEQUENCES],
    sequences: usize,
}

impl Default for WaveformMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformMemoryBuilder {
    pub fn new() -> Self {
        Self {
            snippet_bytes: [0; SNP_MEM_SIZE],
            snippet_ends: [0; MAX_SNIPPETS],
            snippets: 0,
            sequence_bytes: [0; SNP_MEM_SIZE],
            sequence_ends: [0; MAX_SEQUENCES],
            sequences: 0,
        }
    }

    fn snippet_len(&self) -> usize {
        self.snippets
            .checked_sub(1)
            .map_or(0, |last| self.snippet_ends[last])
    }

    fn sequence_len(&self) -> usize {
        self.sequences
            .checked_sub(1)
            .map_or(0, |last| self.sequence_ends[last])
    }

    /// Size of the memory image with what has been added so far, header
    /// included.
    pub fn encoded_len(&self) -> usize {
        2 + self.snippets + self.sequences + self.snippet_len() + self.sequence_len()
    }

    /// Adds a snippet and returns the id frames use to play it (1..=15).
    pub fn add_snippet(&mut self, snippet: &Snippet) -> Result<u8, WaveformError> {
        if self.snippets == MAX_SNIPPETS {
            return Err(WaveformError::TooManySnippets);
        }
        let needed = self.encoded_len() + 1 + snippet.len();
        if needed > SNP_MEM_SIZE {
            return Err(WaveformError::Full(needed));
        }
        let start = self.snippet_len();
        for (slot, byte) in self.snippet_bytes[start..].iter_mut().zip(snippet.bytes()) {
            *slot = byte;
        }
        self.snippet_ends[self.snippets] = start + snippet.len();
        self.snippets += 1;
        Ok(self.snippets as u8)
    }

    /// Adds a sequence and returns its id (0..=15), as used by
    /// `set_sequence_id` and the GPI configuration.
    pub fn add_sequence(&mut self, sequence: &Sequence) -> Result<u8, WaveformError> {
        if self.sequences == MAX_SEQUENCES {
            return Err(WaveformError::TooManySequences);
        }
        let needed = self.encoded_len() + 1 + sequence.len();
        if needed > SNP_MEM_SIZE {
            return Err(WaveformError::Full(needed));
        }
        let start = self.sequence_len();
        self.sequence_bytes[start..start + sequence.len()].copy_from_slice(sequence.as_bytes());
        self.sequence_ends[self.sequences] = start + sequence.len();
        self.sequences += 1;
        Ok((self.sequences - 1) as u8)
    }

    pub fn build(&self) -> Result<SnippetMemory, WaveformError> {
        if self.snippets == 0 {
            return Err(WaveformError::EmptySnippet);
        }
        if self.sequences == 0 {
            return Err(WaveformError::EmptySequence);
        }

        let mut memory = SnippetMemory::new();
        let out = memory.as_mut_bytes(self.encoded_len());
        out[0] = self.snippets as u8;
        out[1] = self.sequences as u8;

        let data_start = 2 + self.snippets + self.sequences;
        let snippet_len = self.snippet_len();
        let ends = self.snippet_ends[..self.snippets]
            .iter()
            .copied()
            .chain(
                self.sequence_ends[..self.sequences]
                    .iter()
                    .map(|end| end + snippet_len),
            );
        for (slot, end) in out[2..data_start].iter_mut().zip(ends) {
            *slot = (data_start + end - 1) as u8;
        }

        let sequence_start = data_start + snippet_len;
        out[data_start..sequence_start].copy_from_slice(&self.snippet_bytes[..snippet_len]);
        out[sequence_start..].copy_from_slice(&self.sequence_bytes[..self.sequence_len()]);

        Ok(memory)
    }
}
