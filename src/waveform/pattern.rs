use crate::error::WaveformError;
use crate::registers::SNP_MEM_SIZE;

use super::memory::SnippetMemory;

/// The all-zero level. Runs of it separate effects.
pub const SILENCE: u8 = 0;

/// Byte level builder for raw snippet memory contents.
///
/// Levels past the 100 byte capacity are counted but not stored, so an
/// oversized pattern is reported by [`build`](Self::build) rather than at the
/// call that overflowed it.
///
/// ```
/// use da728x::waveform::PatternBuilder;
///
/// let mut pattern = PatternBuilder::new();
/// pattern.extend_from_slice(&[0x40, 0x7f]).repeat(2, 3)?.silence(4);
/// let memory = pattern.build()?;
/// assert_eq!(memory.len(), 12);
/// # Ok::<(), da728x::WaveformError>(())
/// ```
#[derive(Debug, Copy, Clone)]
pub struct PatternBuilder {
    levels: [u8; SNP_MEM_SIZE],
    len: usize,
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternBuilder {
    pub const fn new() -> Self {
        Self {
            levels: [SILENCE; SNP_MEM_SIZE],
            len: 0,
        }
    }

    /// Number of levels pushed so far, including any past capacity.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, level: u8) -> &mut Self {
        if let Some(slot) = self.levels.get_mut(self.len) {
            *slot = level;
        }
        self.len = self.len.saturating_add(1);
        self
    }

    /// Push a level for memory configured with signed samples.
    pub fn push_signed(&mut self, level: i8) -> &mut Self {
        self.push(level as u8)
    }

    pub fn extend_from_slice(&mut self, levels: &[u8]) -> &mut Self {
        for &level in levels {
            self.push(level);
        }
        self
    }

    pub fn silence(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.push(SILENCE);
        }
        self
    }

    /// Append the last `count` levels `times` more times.
    pub fn repeat(&mut self, count: usize, times: usize) -> Result<&mut Self, WaveformError> {
        if count == 0 || count > self.len {
            return Err(WaveformError::InvalidRepeat(count));
        }
        let start = self.len - count;
        let added = count.saturating_mul(times);
        if self.len.saturating_add(added) > SNP_MEM_SIZE {
            // Too long to build either way, only the count matters.
            self.len = self.len.saturating_add(added);
            return Ok(self);
        }
        for _ in 0..times {
            for i in start..start + count {
                let level = self.levels[i];
                self.push(level);
            }
        }
        Ok(self)
    }

    pub fn build(&self) -> Result<SnippetMemory, WaveformError> {
        if self.len > SNP_MEM_SIZE {
            return Err(WaveformError::Full(self.len));
        }
        SnippetMemory::from_slice(&self.levels[..self.len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_expands_in_place() {
        let mut pattern = PatternBuilder::new();
        pattern.extend_from_slice(&[1, 2, 3]).repeat(2, 2).unwrap();
        assert_eq!(pattern.build().unwrap().as_bytes(), &[1, 2, 3, 2, 3, 2, 3]);
    }

    #[test]
    fn silence_and_signed_levels() {
        let mut pattern = PatternBuilder::new();
        pattern.push_signed(-1).silence(2).push_signed(64);
        assert_eq!(pattern.build().unwrap().as_bytes(), &[0xff, 0, 0, 0x40]);
    }

    #[test]
    fn repeat_needs_existing_levels() {
        let mut pattern = PatternBuilder::new();
        assert_eq!(pattern.repeat(1, 1).unwrap_err(), WaveformError::InvalidRepeat(1));
        pattern.push(9);
        assert_eq!(pattern.repeat(0, 4).unwrap_err(), WaveformError::InvalidRepeat(0));
        assert_eq!(pattern.repeat(2, 4).unwrap_err(), WaveformError::InvalidRepeat(2));
    }

    #[test]
    fn exact_capacity_builds() {
        let mut pattern = PatternBuilder::new();
        pattern.push(5).repeat(1, 99).unwrap();
        let memory = pattern.build().unwrap();
        assert_eq!(memory.len(), 100);
        assert!(memory.as_bytes().iter().all(|&b| b == 5));
    }

    #[test]
    fn overflow_is_reported_at_build() {
        let mut pattern = PatternBuilder::new();
        pattern.silence(60).repeat(30, 3).unwrap();
        assert_eq!(pattern.len(), 150);
        assert_eq!(pattern.build().unwrap_err(), WaveformError::Full(150));
    }

    #[test]
    fn accepts_a_built_waveform_image() {
        use crate::waveform::{FrameBuilder, SequenceBuilder, SnippetBuilder, WaveformMemoryBuilder};

        let snippet = SnippetBuilder::new().step(1, 15).unwrap().build().unwrap();
        let mut image = WaveformMemoryBuilder::new();
        let id = image.add_snippet(&snippet).unwrap();
        let sequence = SequenceBuilder::new()
            .add_frame(FrameBuilder::new(id).unwrap().build())
            .unwrap()
            .build()
            .unwrap();
        image.add_sequence(&sequence).unwrap();
        let image = image.build().unwrap();

        let mut pattern = PatternBuilder::new();
        pattern.extend_from_slice(image.as_bytes());
        assert_eq!(pattern.build().unwrap(), image);
    }
}
