use crate::error::WaveformError;

use super::frame::Frame;

pub const MAX_FRAMES_PER_SEQUENCE: usize = 32;
pub const MAX_SEQUENCE_BYTES: usize = 96;

/// Frames played back to back when the sequence is triggered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sequence {
    bytes: [u8; MAX_SEQUENCE_BYTES],
    len: usize,
    frames: usize,
}

impl Sequence {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn frame_count(&self) -> usize {
        self.frames
    }
}

#[derive(Debug, Copy, Clone)]
pub struct SequenceBuilder {
    sequence: Sequence,
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self {
            sequence: Sequence {
                bytes: [0; MAX_SEQUENCE_BYTES],
                len: 0,
                frames: 0,
            },
        }
    }

    pub fn add_frame(mut self, frame: Frame) -> Result<Self, WaveformError> {
        let seq = &mut self.sequence;
        if seq.frames == MAX_FRAMES_PER_SEQUENCE {
            return Err(WaveformError::TooManyFrames);
        }
        let end = seq.len + frame.len();
        if end > MAX_SEQUENCE_BYTES {
            return Err(WaveformError::Full(end));
        }
        seq.bytes[seq.len..end].copy_from_slice(frame.as_bytes());
        seq.len = end;
        seq.frames += 1;
        Ok(self)
    }

    pub fn build(self) -> Result<Sequence, WaveformError> {
        if self.sequence.frames == 0 {
            return Err(WaveformError::EmptySequence);
        }
        Ok(self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::FrameBuilder;

    #[test]
    fn frames_are_concatenated() {
        let sequence = SequenceBuilder::new()
            .add_frame(FrameBuilder::new(1).unwrap().build())
            .unwrap()
            .add_frame(FrameBuilder::new(2).unwrap().loop_count(1).unwrap().build())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(sequence.frame_count(), 2);
        assert_eq!(sequence.as_bytes(), &[0x01, 0x02, 0x88]);
    }

    #[test]
    fn frame_limit() {
        let frame = FrameBuilder::new(3).unwrap().build();
        let mut builder = SequenceBuilder::new();
        for _ in 0..MAX_FRAMES_PER_SEQUENCE {
            builder = builder.add_frame(frame).unwrap();
        }
        assert_eq!(builder.add_frame(frame).unwrap_err(), WaveformError::TooManyFrames);
    }

    #[test]
    fn byte_limit() {
        let frame = FrameBuilder::new(3).unwrap().frequency_hz(200).unwrap().build();
        let mut builder = SequenceBuilder::new();
        for _ in 0..MAX_SEQUENCE_BYTES / 3 {
            builder = builder.add_frame(frame).unwrap();
        }
        // 32 three byte frames fill the sequence exactly
        assert_eq!(builder.build().unwrap().len(), MAX_SEQUENCE_BYTES);
        assert_eq!(SequenceBuilder::new().build().unwrap_err(), WaveformError::EmptySequence);
    }
}
