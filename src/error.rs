use thiserror::Error;

use crate::config::OperationMode;

/// Errors returned by the driver.
///
/// Nothing in the driver retries on its own. A `Bus` error leaves the chip in
/// whatever state the last completed register write produced.
#[derive(Debug, Error, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The transport failed.
    #[error("bus error: {0:?}")]
    Bus(E),
    /// `CHIP_REV` does not match the selected variant.
    #[error("chip revision {found:#04x} does not match expected {expected:#04x}")]
    VariantMismatch { expected: u8, found: u8 },
    /// A caller supplied parameter is out of range. Raised before any bus
    /// traffic.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The operation is not allowed in the current device state.
    #[error(transparent)]
    State(#[from] StateError),
    /// A payload does not fit the snippet memory.
    #[error("{len} bytes exceed the {capacity} byte snippet memory")]
    Capacity { len: usize, capacity: usize },
    /// A waveform could not be assembled.
    #[error(transparent)]
    Waveform(#[from] WaveformError),
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    #[error("drive current {0} uA exceeds the 252 mA ceiling")]
    CurrentTooHigh(u32),
    #[error("impedance {0} mOhm is outside 4000..=50000")]
    ImpedanceOutOfRange(u32),
    #[error("resonant frequency {0} Hz is outside 50..=300")]
    FrequencyOutOfRange(u32),
    #[error("sequence id {0} exceeds 15")]
    SequenceIdOutOfRange(u8),
    #[error("sequence loop {0} exceeds 15")]
    SequenceLoopOutOfRange(u8),
    #[error("GPI sequence id {0} exceeds 15")]
    GpiSequenceIdOutOfRange(u8),
    #[error("operation mode {0:?} cannot be activated")]
    InvalidMode(OperationMode),
    #[error("negative override value {0} with acceleration enabled")]
    OverrideValueOutOfRange(i8),
    #[error("PWM frequency {0} Hz is outside 10 kHz..=250 kHz")]
    PwmFrequencyOutOfRange(u32),
    #[error("PWM duty {0}% is below 50% with acceleration disabled")]
    PwmDutyOutOfRange(u8),
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateError {
    #[error("device has not been configured")]
    NotConfigured,
    #[error("{0:?} is already active, deactivate first")]
    AlreadyActive(OperationMode),
    #[error("override value only drives DRO mode, configured for {0:?}")]
    WrongMode(OperationMode),
    #[error("back-EMF sensing is enabled, waveform memory modes need it off")]
    BackEmfSenseEnabled,
    #[error("no waveform has been uploaded")]
    MemoryEmpty,
    #[error("device is driving, snippet memory cannot be updated")]
    Busy,
    #[error("snippet memory is locked")]
    MemoryLocked,
    #[error("pattern base address {0:#04x} is outside snippet memory")]
    InvalidBaseAddress(u8),
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveformError {
    #[error("snippet id must be within 1..=15")]
    InvalidSnippetId,
    #[error("loop count must be within 0..=15")]
    InvalidLoopCount,
    #[error("frequency override must be at most 511 Hz")]
    InvalidFrequency,
    #[error("a point lasts 1..=8 timebases")]
    InvalidTimebase,
    #[error("amplitude must be within 0..=15")]
    InvalidAmplitude,
    #[error("a snippet holds at most 16 points")]
    TooManyPoints,
    #[error("a sequence holds at most 32 frames")]
    TooManyFrames,
    #[error("at most 15 snippets fit in memory")]
    TooManySnippets,
    #[error("at most 16 sequences fit in memory")]
    TooManySequences,
    #[error("snippet has no points")]
    EmptySnippet,
    #[error("sequence has no frames")]
    EmptySequence,
    #[error("cannot repeat the last {0} levels")]
    InvalidRepeat(usize),
    #[error("{0} bytes exceed the available space")]
    Full(usize),
}
