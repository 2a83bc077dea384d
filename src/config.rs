//! Actuator and device configuration, and the register values derived from
//! them.
//!
//! Everything in here is pure: `ActuatorConfig::validate`,
//! `DeviceConfig::validate` and `Calibration::derive` never touch the bus, so
//! the driver can reject a bad configuration before writing anything.

use crate::error::ValidationError;
use crate::registers::{GpiCtlReg, Register, SeqCtl2Reg, TopCfg1Reg};

/// Maximum drive current accepted by `ACTUATOR3`, in microamps.
pub const IMAX_LIMIT_UA: u32 = 252_000;
/// Current represented by one `IMAX` code step, in microamps.
pub const IMAX_STEP_UA: u32 = 7_200;
/// Offset of the `IMAX` code, in microamps.
const IMAX_OFFSET_UA: i32 = 28_600;
/// Largest value the 5 bit `IMAX` field can hold.
pub const IMAX_CODE_MAX: u8 = 0x1f;

/// Voltage ratings at or above this fall back to the variant default code.
pub const VOLTAGE_RATE_MAX_UV: u32 = 6_000_000;
/// Voltage represented by one `ACTUATOR1`/`ACTUATOR2` step, in microvolts.
pub const VOLTAGE_STEP_UV: u32 = 23_400;

pub const IMPEDANCE_MIN_MOHM: u32 = 4_000;
pub const IMPEDANCE_MAX_MOHM: u32 = 50_000;

pub const RESONANT_FREQ_MIN_HZ: u32 = 50;
pub const RESONANT_FREQ_MAX_HZ: u32 = 300;

/// Drive frequency range when the resonance loop is not tracking.
pub const WIDEBAND_FREQ_MIN_HZ: u32 = 25;
pub const WIDEBAND_FREQ_MAX_HZ: u32 = 1023;

pub const SEQ_ID_MAX: u8 = 15;
pub const SEQ_LOOP_MAX: u8 = 15;

pub const PWM_FREQ_MIN_HZ: u32 = 10_000;
pub const PWM_FREQ_MAX_HZ: u32 = 250_000;

/// The chip variants sharing this register map.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    Da7280,
    Da7281,
    Da7282,
}

/// Per-variant constants.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VariantInfo {
    /// Expected contents of `CHIP_REV`.
    pub chip_rev: u8,
    /// `ACTUATOR1` code used when the nominal voltage is out of range.
    pub nominal_voltage_default: u8,
    /// `ACTUATOR2` code used when the absolute voltage is out of range.
    pub absolute_voltage_default: u8,
}

impl Variant {
    pub const fn info(self) -> VariantInfo {
        match self {
            Variant::Da7280 => VariantInfo {
                chip_rev: 0xba,
                nominal_voltage_default: 0x6b,
                absolute_voltage_default: 0x78,
            },
            Variant::Da7281 => VariantInfo {
                chip_rev: 0xca,
                nominal_voltage_default: 0x6b,
                absolute_voltage_default: 0x78,
            },
            Variant::Da7282 => VariantInfo {
                chip_rev: 0xda,
                nominal_voltage_default: 0x6b,
                absolute_voltage_default: 0x78,
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorKind {
    /// Linear resonant actuator
    Lra,
    /// Bar type eccentric rotating mass
    ErmBar,
    /// Coin type eccentric rotating mass
    ErmCoin,
}

impl ActuatorKind {
    /// Value of the `ACTUATOR_TYPE` bit.
    pub fn is_erm(self) -> bool {
        !matches!(self, ActuatorKind::Lra)
    }
}

/// Values of the `OPERATION_MODE` field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperationMode {
    Inactive = 0,
    /// Direct register override: the drive level comes from `TOP_CTL2`.
    Dro = 1,
    /// The drive level follows an externally generated PWM input.
    Pwm = 2,
    /// Real-time waveform memory: plays the sequence in `SEQ_CTL2`.
    Rtwm = 3,
    /// Edge-triggered waveform memory: GPI edges select the sequence.
    Etwm = 4,
}

impl OperationMode {
    /// Modes that play back from snippet memory.
    pub fn uses_waveform_memory(self) -> bool {
        self >= OperationMode::Rtwm
    }
}

impl TryFrom<u8> for OperationMode {
    type Error = u8;

    fn try_from(val: u8) -> Result<Self, u8> {
        match val {
            0 => Ok(OperationMode::Inactive),
            1 => Ok(OperationMode::Dro),
            2 => Ok(OperationMode::Pwm),
            3 => Ok(OperationMode::Rtwm),
            4 => Ok(OperationMode::Etwm),
            other => Err(other),
        }
    }
}

/// Physical description of the actuator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorConfig {
    pub kind: ActuatorKind,
    /// Nominal maximum drive voltage, in microvolts.
    pub nominal_max_uv: u32,
    /// Absolute maximum (overdrive) voltage, in microvolts.
    pub absolute_max_uv: u32,
    /// Maximum drive current, in microamps.
    pub max_current_ua: u32,
    /// Coil impedance, in milliohms.
    pub impedance_mohm: u32,
    /// Resonant frequency. Only meaningful for LRAs.
    pub resonant_frequency_hz: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            kind: ActuatorKind::Lra,
            nominal_max_uv: 1_200_000,
            absolute_max_uv: 1_400_000,
            max_current_ua: 137_000,
            impedance_mohm: 10_500,
            resonant_frequency_hz: 180,
        }
    }
}

impl ActuatorConfig {
    /// Check the physical limits of the chip.
    ///
    /// Voltages are not checked; out of range voltages are replaced by the
    /// variant default when they are converted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_current_ua > IMAX_LIMIT_UA {
            return Err(ValidationError::CurrentTooHigh(self.max_current_ua));
        }
        if !(IMPEDANCE_MIN_MOHM..=IMPEDANCE_MAX_MOHM).contains(&self.impedance_mohm) {
            return Err(ValidationError::ImpedanceOutOfRange(self.impedance_mohm));
        }
        if self.kind == ActuatorKind::Lra {
            validate_resonant_frequency(self.resonant_frequency_hz)?;
        }
        Ok(())
    }
}

fn validate_resonant_frequency(hz: u32) -> Result<(), ValidationError> {
    DrivingMode::FrequencyTrack.validate_frequency(hz)
}

/// How the LRA drive frequency is produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrivingMode {
    /// The chip follows the actuator resonance using back-EMF.
    #[default]
    FrequencyTrack,
    /// The phase loop is frozen and the actuator is driven at whatever
    /// frequency is programmed, e.g. to play tones.
    Wideband,
    /// Wideband, with the custom waveform generator shaping the drive.
    CustomWaveform,
}

impl DrivingMode {
    /// Frequencies `set_resonant_frequency` accepts in this mode.
    pub fn frequency_range(self) -> core::ops::RangeInclusive<u32> {
        match self {
            DrivingMode::FrequencyTrack => RESONANT_FREQ_MIN_HZ..=RESONANT_FREQ_MAX_HZ,
            DrivingMode::Wideband | DrivingMode::CustomWaveform => {
                WIDEBAND_FREQ_MIN_HZ..=WIDEBAND_FREQ_MAX_HZ
            }
        }
    }

    pub(crate) fn validate_frequency(self, hz: u32) -> Result<(), ValidationError> {
        if self.frequency_range().contains(&hz) {
            Ok(())
        } else {
            Err(ValidationError::FrequencyOutOfRange(hz))
        }
    }

    /// Phase shift held at zero.
    pub fn freezes_phase(self) -> bool {
        self != DrivingMode::FrequencyTrack
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GpiPolarity {
    #[default]
    RisingEdge = 0,
    FallingEdge = 1,
    BothEdges = 2,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpiMode {
    /// Every edge plays the configured sequence.
    #[default]
    SinglePattern,
    /// The three inputs together select the sequence.
    MultiPattern,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GpiPin {
    Gpi0 = 0,
    Gpi1 = 1,
    Gpi2 = 2,
}

impl GpiPin {
    pub const ALL: [GpiPin; 3] = [GpiPin::Gpi0, GpiPin::Gpi1, GpiPin::Gpi2];

    pub fn register(self) -> Register {
        match self {
            GpiPin::Gpi0 => Register::Gpi0Ctl,
            GpiPin::Gpi1 => Register::Gpi1Ctl,
            GpiPin::Gpi2 => Register::Gpi2Ctl,
        }
    }
}

/// ETWM trigger configuration for one GPI pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpiConfig {
    pub sequence_id: u8,
    pub mode: GpiMode,
    pub polarity: GpiPolarity,
}

impl GpiConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sequence_id > SEQ_ID_MAX {
            return Err(ValidationError::GpiSequenceIdOutOfRange(self.sequence_id));
        }
        Ok(())
    }

    /// `GPI_n_CTL` value.
    pub fn to_reg(&self) -> u8 {
        let mut reg = GpiCtlReg(0);
        reg.set_sequence_id(self.sequence_id);
        reg.set_mode(self.mode == GpiMode::MultiPattern);
        reg.set_polarity(self.polarity as u8);
        reg.0
    }
}

/// Operation mode and drive options.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub operation_mode: OperationMode,
    /// Anything but `FrequencyTrack` turns off back-EMF sensing, frequency
    /// tracking, acceleration and rapid stop.
    pub driving_mode: DrivingMode,
    /// Back-EMF sensing. Forced off for the waveform memory modes.
    pub bemf_sense: bool,
    pub frequency_track: bool,
    /// Forced off for coin ERMs.
    pub acceleration: bool,
    /// Forced off for coin ERMs.
    pub rapid_stop: bool,
    /// Forced off for coin ERMs.
    pub amp_pid: bool,
    /// Interpret snippet memory amplitudes as signed.
    pub mem_data_signed: bool,
    /// Sequence played in RTWM mode.
    pub sequence_id: u8,
    pub sequence_loop: u8,
    /// Initial DRO drive level written during bring-up.
    pub override_value: u8,
    /// GPI trigger setup, written during bring-up when present.
    pub gpi: Option<[GpiConfig; 3]>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::Dro,
            driving_mode: DrivingMode::FrequencyTrack,
            bemf_sense: true,
            frequency_track: true,
            acceleration: true,
            rapid_stop: true,
            amp_pid: false,
            mem_data_signed: false,
            sequence_id: 0,
            sequence_loop: 0,
            override_value: 0,
            gpi: None,
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sequence_id > SEQ_ID_MAX {
            return Err(ValidationError::SequenceIdOutOfRange(self.sequence_id));
        }
        if self.sequence_loop > SEQ_LOOP_MAX {
            return Err(ValidationError::SequenceLoopOutOfRange(self.sequence_loop));
        }
        if let Some(gpi) = &self.gpi {
            for cfg in gpi {
                cfg.validate()?;
            }
        }
        Ok(())
    }

    /// `SEQ_CTL2` value for the RTWM sequence and loop count.
    pub fn seq_ctl2(&self) -> u8 {
        let mut reg = SeqCtl2Reg(0);
        reg.set_ps_seq_id(self.sequence_id);
        reg.set_ps_seq_loop(self.sequence_loop);
        reg.0
    }

    /// Apply the device restrictions to the requested drive options.
    pub fn effective_features(&self, kind: ActuatorKind) -> Features {
        let mut features = Features {
            bemf_sense: self.bemf_sense,
            frequency_track: self.frequency_track,
            acceleration: self.acceleration,
            rapid_stop: self.rapid_stop,
            amp_pid: self.amp_pid,
        };
        if kind == ActuatorKind::ErmCoin {
            features.acceleration = false;
            features.rapid_stop = false;
            features.amp_pid = false;
        }
        if self.driving_mode.freezes_phase() {
            features.bemf_sense = false;
            features.frequency_track = false;
            features.acceleration = false;
            features.rapid_stop = false;
        }
        if self.driving_mode == DrivingMode::CustomWaveform {
            features.amp_pid = false;
        }
        if self.operation_mode.uses_waveform_memory() {
            features.bemf_sense = false;
        }
        features
    }
}

/// Drive options as they are programmed into `TOP_CFG1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Features {
    pub bemf_sense: bool,
    pub frequency_track: bool,
    pub acceleration: bool,
    pub rapid_stop: bool,
    pub amp_pid: bool,
}

impl Features {
    /// `TOP_CFG1` value for these features; apply with
    /// `TopCfg1Reg::CONFIG_MASK`.
    pub fn top_cfg1(&self, kind: ActuatorKind) -> u8 {
        let mut reg = TopCfg1Reg(0);
        reg.set_actuator_type(kind.is_erm());
        reg.set_bemf_sense_en(self.bemf_sense);
        reg.set_freq_track_en(self.frequency_track);
        reg.set_acceleration_en(self.acceleration);
        reg.set_rapid_stop_en(self.rapid_stop);
        reg.set_amp_pid_en(self.amp_pid);
        reg.0
    }
}

/// External PWM source parameters, see `Da728x::check_pwm_input`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmInput {
    pub frequency_hz: u32,
    pub duty_percent: u8,
}

/// Register values derived from an `ActuatorConfig`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// `ACTUATOR1`
    pub nominal_voltage_code: u8,
    /// `ACTUATOR2`
    pub absolute_voltage_code: u8,
    /// `ACTUATOR3.IMAX`
    pub imax_code: u8,
    /// `CALIB_V2I_H:CALIB_V2I_L`
    pub v2i_factor: u16,
    /// `FRQ_LRA_PER_H:FRQ_LRA_PER_L`, LRAs only.
    pub lra_period: Option<u16>,
}

impl Calibration {
    pub fn derive(actuator: &ActuatorConfig, variant: VariantInfo) -> Self {
        let imax_code = imax_code(actuator.max_current_ua);
        Self {
            nominal_voltage_code: voltage_code(
                actuator.nominal_max_uv,
                variant.nominal_voltage_default,
            ),
            absolute_voltage_code: voltage_code(
                actuator.absolute_max_uv,
                variant.absolute_voltage_default,
            ),
            imax_code,
            v2i_factor: v2i_factor(actuator.impedance_mohm, imax_code),
            lra_period: match actuator.kind {
                ActuatorKind::Lra => Some(lra_period(actuator.resonant_frequency_hz)),
                ActuatorKind::ErmBar | ActuatorKind::ErmCoin => None,
            },
        }
    }
}

/// `IMAX` code for a current limit: `(uA - 28600) / 7200 + 1`, clamped to
/// the 5 bit field.
pub fn imax_code(current_ua: u32) -> u8 {
    let ua = current_ua.min(IMAX_LIMIT_UA) as i32;
    let code = (ua - IMAX_OFFSET_UA) / IMAX_STEP_UA as i32 + 1;
    code.clamp(0, IMAX_CODE_MAX as i32) as u8
}

/// V2I factor: `mOhm * 1000 * (imax + 4) / 1610400`.
pub fn v2i_factor(impedance_mohm: u32, imax_code: u8) -> u16 {
    let factor = impedance_mohm as u64 * 1000 * (imax_code as u64 + 4) / 1_610_400;
    factor.min(u16::MAX as u64) as u16
}

/// LRA period register value: `1e9 / (Hz * 1333)`.
///
/// Callers validate the frequency first; zero maps to the largest period.
pub fn lra_period(frequency_hz: u32) -> u16 {
    match frequency_hz.checked_mul(1333) {
        Some(0) | None => u16::MAX,
        Some(div) => (1_000_000_000 / div).min(u16::MAX as u32) as u16,
    }
}

/// Split a period into the `FRQ_LRA_PER_H` / `FRQ_LRA_PER_L` pair.
pub fn lra_period_bytes(period: u16) -> (u8, u8) {
    (((period >> 7) & 0xff) as u8, (period & 0x7f) as u8)
}

/// Voltage rating code: `uV / 23400 + 1`, saturated to a byte. Ratings of
/// 6 V and above use `default` instead.
pub fn voltage_code(voltage_uv: u32, default: u8) -> u8 {
    if voltage_uv >= VOLTAGE_RATE_MAX_UV {
        return default;
    }
    (voltage_uv / VOLTAGE_STEP_UV + 1).min(0xff) as u8
}
