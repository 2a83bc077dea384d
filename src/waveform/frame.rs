use bitfield::bitfield;

use crate::error::WaveformError;

/// Attenuation applied to the snippet a frame plays.
///
/// Stored in `GAIN[6:5]` of the frame header byte, where 0 is full scale and
/// each step down attenuates further.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    #[default]
    Full = 0,
    ThreeQuarters = 1,
    Half = 2,
    Quarter = 3,
}

/// Length of one point timebase while the frame plays.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Timebase {
    #[default]
    Ms5p44 = 0,
    Ms10p88 = 1,
    Ms21p76 = 2,
    Ms43p52 = 3,
}

impl Timebase {
    pub const fn as_micros(self) -> u32 {
        5440 << (self as u32)
    }
}

bitfield! {
    struct FrameHead(u8);
    impl Debug;
    gain, set_gain: 6, 5;
    timebase, set_timebase: 4, 3;
    snippet_low, set_snippet_low: 2, 0;
}

bitfield! {
    struct FrameExt(u8);
    impl Debug;
    marker, set_marker: 7;
    loop_count, set_loop_count: 6, 3;
    freq_cmd, set_freq_cmd: 2;
    freq_high, set_freq_high: 1;
    snippet_high, set_snippet_high: 0;
}

/// An encoded frame, one to three bytes long.
///
/// The extension byte is only emitted when the snippet id needs its fourth
/// bit, a loop count is set, or the frequency is overridden.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; 3],
    len: usize,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Copy, Clone)]
pub struct FrameBuilder {
    snippet_id: u8,
    gain: Gain,
    timebase: Timebase,
    loop_count: u8,
    frequency_hz: Option<u16>,
}

impl FrameBuilder {
    /// `snippet_id` must be within 1..=15. Id 0 is the chip's built-in
    /// silence snippet and is not addressable from a frame.
    pub fn new(snippet_id: u8) -> Result<Self, WaveformError> {
        if !(1..=15).contains(&snippet_id) {
            return Err(WaveformError::InvalidSnippetId);
        }
        Ok(Self {
            snippet_id,
            gain: Gain::default(),
            timebase: Timebase::default(),
            loop_count: 0,
            frequency_hz: None,
        })
    }

    pub fn gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }

    pub fn timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = timebase;
        self
    }

    /// Extra plays of the snippet, 0..=15.
    pub fn loop_count(mut self, count: u8) -> Result<Self, WaveformError> {
        if count > 15 {
            return Err(WaveformError::InvalidLoopCount);
        }
        self.loop_count = count;
        Ok(self)
    }

    /// Override the drive frequency for this frame, up to 511 Hz.
    pub fn frequency_hz(mut self, hz: u16) -> Result<Self, WaveformError> {
        if hz > 0x1ff {
            return Err(WaveformError::InvalidFrequency);
        }
        self.frequency_hz = Some(hz);
        Ok(self)
    }

    pub fn build(self) -> Frame {
        let mut bytes = [0u8; 3];

        let mut head = FrameHead(0);
        head.set_gain(self.gain as u8);
        head.set_timebase(self.timebase as u8);
        head.set_snippet_low(self.snippet_id & 0x07);
        bytes[0] = head.0;

        let needs_ext =
            self.snippet_id > 0x07 || self.loop_count > 0 || self.frequency_hz.is_some();
        if !needs_ext {
            return Frame { bytes, len: 1 };
        }

        let mut ext = FrameExt(0);
        ext.set_marker(true);
        ext.set_loop_count(self.loop_count);
        ext.set_snippet_high(self.snippet_id & 0x08 != 0);
        let len = match self.frequency_hz {
            Some(hz) => {
                ext.set_freq_cmd(true);
                ext.set_freq_high(hz & 0x100 != 0);
                bytes[2] = hz as u8;
                3
            }
            None => 2,
        };
        bytes[1] = ext.0;

        Frame { bytes, len }
    }
}
