use bitfield::bitfield;

use crate::error::WaveformError;

pub const MAX_POINTS_PER_SNIPPET: usize = 16;

bitfield! {
    /// One piecewise linear point of a snippet.
    ///
    /// The point either ramps linearly from the previous amplitude or steps to
    /// it immediately, then holds for 1..=8 timebases.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct PwlPoint(u8);
    impl Debug;
    pub ramp, _: 7;
    _, set_ramp: 7;
    time, set_time: 6, 4;
    pub amplitude, _: 3, 0;
    _, set_amplitude: 3, 0;
}

impl PwlPoint {
    pub fn ramp_to(timebases: u8, amplitude: u8) -> Result<Self, WaveformError> {
        Self::new(true, timebases, amplitude)
    }

    pub fn step_to(timebases: u8, amplitude: u8) -> Result<Self, WaveformError> {
        Self::new(false, timebases, amplitude)
    }

    fn new(ramp: bool, timebases: u8, amplitude: u8) -> Result<Self, WaveformError> {
        if !(1..=8).contains(&timebases) {
            return Err(WaveformError::InvalidTimebase);
        }
        if amplitude > 0x0f {
            return Err(WaveformError::InvalidAmplitude);
        }
        let mut point = PwlPoint(0);
        point.set_ramp(ramp);
        point.set_time(timebases - 1);
        point.set_amplitude(amplitude);
        Ok(point)
    }

    /// Number of timebases the point lasts.
    pub fn timebases(&self) -> u8 {
        self.time() + 1
    }
}

/// A built snippet: 1 to 16 points, one byte each.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Snippet {
    points: [PwlPoint; MAX_POINTS_PER_SNIPPET],
    len: usize,
}

impl Snippet {
    pub fn points(&self) -> &[PwlPoint] {
        &self.points[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.points().iter().map(|p| p.0)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct SnippetBuilder {
    points: [PwlPoint; MAX_POINTS_PER_SNIPPET],
    len: usize,
}

impl Default for SnippetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnippetBuilder {
    pub fn new() -> Self {
        Self {
            points: [PwlPoint(0); MAX_POINTS_PER_SNIPPET],
            len: 0,
        }
    }

    /// Ramp linearly to `amplitude` over `timebases`.
    pub fn ramp(self, timebases: u8, amplitude: u8) -> Result<Self, WaveformError> {
        self.point(PwlPoint::ramp_to(timebases, amplitude)?)
    }

    /// Jump to `amplitude` and hold it for `timebases`.
    pub fn step(self, timebases: u8, amplitude: u8) -> Result<Self, WaveformError> {
        self.point(PwlPoint::step_to(timebases, amplitude)?)
    }

    pub fn point(mut self, point: PwlPoint) -> Result<Self, WaveformError> {
        let slot = self
            .points
            .get_mut(self.len)
            .ok_or(WaveformError::TooManyPoints)?;
        *slot = point;
        self.len += 1;
        Ok(self)
    }

    pub fn build(self) -> Result<Snippet, WaveformError> {
        if self.len == 0 {
            return Err(WaveformError::EmptySnippet);
        }
        Ok(Snippet {
            points: self.points,
            len: self.len,
        })
    }
}
