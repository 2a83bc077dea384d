use bitfield::bitfield;

/// Register addresses of the DA728x family.
///
/// The three variants share the same map; only the revision byte in
/// `ChipRev` and a handful of defaults differ.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    ChipRev = 0x00,
    IrqEvent1 = 0x03,
    IrqEventWarningDiag = 0x04,
    IrqEventPatDiag = 0x05,
    IrqStatus1 = 0x06,
    IrqMask1 = 0x07,
    CifI2c1 = 0x08,
    /// MS bits of the initial LRA resonance period.
    FrqLraPerH = 0x0a,
    /// LS 7 bits of the initial LRA resonance period.
    FrqLraPerL = 0x0b,
    /// Nominal maximum drive voltage, in 23.4 mV steps.
    Actuator1 = 0x0c,
    /// Absolute maximum drive voltage, in 23.4 mV steps.
    Actuator2 = 0x0d,
    /// Maximum drive current code.
    Actuator3 = 0x0e,
    CalibV2iH = 0x0f,
    CalibV2iL = 0x10,
    CalibImpH = 0x11,
    CalibImpL = 0x12,
    TopCfg1 = 0x13,
    TopCfg2 = 0x14,
    TopCfg3 = 0x15,
    TopCfg4 = 0x16,
    TopIntCfg1 = 0x17,
    TopIntCfg6H = 0x1c,
    TopIntCfg6L = 0x1d,
    TopIntCfg7H = 0x1e,
    TopIntCfg7L = 0x1f,
    TopIntCfg8 = 0x20,
    TopCtl1 = 0x22,
    /// Drive level used in DRO mode.
    TopCtl2 = 0x23,
    SeqCtl1 = 0x24,
    SwgC1 = 0x25,
    SwgC2 = 0x26,
    SwgC3 = 0x27,
    SeqCtl2 = 0x28,
    Gpi0Ctl = 0x29,
    Gpi1Ctl = 0x2a,
    Gpi2Ctl = 0x2b,
    /// Register address at which the pattern data in snippet memory starts.
    MemCtl1 = 0x2c,
    MemCtl2 = 0x2d,
    AdcDataH1 = 0x2e,
    AdcDataL1 = 0x2f,
    Polarity = 0x43,
    LraAvrH = 0x44,
    LraAvrL = 0x45,
    FrqLraPerActH = 0x46,
    FrqLraPerActL = 0x47,
    FrqPhaseH = 0x48,
    FrqPhaseL = 0x49,
    FrqCtl = 0x4c,
    Trim3 = 0x5f,
    Trim4 = 0x60,
    Trim6 = 0x62,
    IrqEventActuatorFault = 0x81,
    IrqStatus2 = 0x82,
    IrqMask2 = 0x83,
    /// First byte of the 100 byte snippet memory (`SNP_MEM_0`).
    SnpMem0 = 0x84,
    /// Last byte of the snippet memory (`SNP_MEM_99`).
    SnpMem99 = 0xe7,
}

/// Address of the first snippet memory byte.
pub const SNP_MEM_FIRST: u8 = Register::SnpMem0 as u8;
/// Address of the last snippet memory byte. Uploads always run up to here.
pub const SNP_MEM_LAST: u8 = Register::SnpMem99 as u8;
/// Size of the on-die snippet memory.
pub const SNP_MEM_SIZE: usize = 100;

bitfield! {
    pub struct ChipRevReg(u8);
    impl Debug;
    /// Major revision; `0xA` for every member of the family.
    pub major, _: 3, 0;
    /// Minor revision; selects between DA7280 (`0xB`), DA7281 (`0xC`) and
    /// DA7282 (`0xD`).
    pub minor, _: 7, 4;
}

bitfield! {
    /// Layout shared by `IRQ_EVENT1`, `IRQ_STATUS1` and `IRQ_MASK1`.
    ///
    /// In the event register every bit is latched and cleared by writing a 1
    /// back to it. The status register mirrors the live condition and the mask
    /// register suppresses the nIRQ line for the matching event.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct IrqFlags(u8);
    impl Debug;
    /// A sequence paused on a `SEQ_CONTINUE` frame.
    pub seq_continue, set_seq_continue: 0;
    /// The supply recovered from an under-voltage lockout.
    pub uvlo_vbat_ok, set_uvlo_vbat_ok: 1;
    /// Pattern playback completed.
    pub pat_done, set_pat_done: 2;
    /// Critical over-temperature; the output stage is shut down.
    pub overtemp_crit, set_overtemp_crit: 3;
    /// Pattern fault. Details are in `IRQ_EVENT_PAT_DIAG`. Driving must be
    /// stopped before this is cleared or it re-asserts.
    pub pat_fault, set_pat_fault: 4;
    /// Warning. Details are in `IRQ_EVENT_WARNING_DIAG`. While this is set in
    /// the status register the chip is driving and snippet memory must not be
    /// rewritten.
    pub warning, set_warning: 5;
    /// Back-EMF abnormality, typically an LRA that is not loaded.
    pub actuator_fault, set_actuator_fault: 6;
    /// Over-current on the output stage.
    pub oc_fault, set_oc_fault: 7;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct WarningDiagReg(u8);
    impl Debug;
    /// The die temperature crossed the warning threshold.
    pub overtemp_warn, _: 3;
    /// Snippet memory contents do not match `MEM_DATA_SIGNED`.
    pub mem_type, _: 4;
    /// Drive level clipped while acceleration is enabled.
    pub lim_drive_acc, _: 6;
    /// Drive level clipped at the configured maximum.
    pub lim_drive, _: 7;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct PatDiagReg(u8);
    impl Debug;
    /// PWM input is missing or out of range in PWM mode.
    pub pwm_fault, _: 5;
    /// Snippet memory layout is invalid.
    pub mem_fault, _: 6;
    /// The requested sequence id does not exist in snippet memory.
    pub seq_id_fault, _: 7;
}

bitfield! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct ActuatorFaultReg(u8);
    impl Debug;
    /// The back-EMF ADC saturated.
    pub adc_sat_fault, _: 2;
}

bitfield! {
    pub struct TopCfg1Reg(u8);
    impl Debug;
    /// Amplitude PID control (ERM only).
    pub amp_pid_en, set_amp_pid_en: 0;
    /// Active braking at the end of a pattern.
    pub rapid_stop_en, set_rapid_stop_en: 1;
    /// Acceleration mode; drive levels become magnitude only.
    pub acceleration_en, set_acceleration_en: 2;
    /// LRA resonance frequency tracking.
    pub freq_track_en, set_freq_track_en: 3;
    /// Back-EMF sensing.
    pub bemf_sense_en, set_bemf_sense_en: 4;
    /// 0: LRA, 1: ERM
    pub actuator_type, set_actuator_type: 5;
    pub embedded_mode, set_embedded_mode: 7;
}

impl TopCfg1Reg {
    pub const AMP_PID_EN: u8 = 1 << 0;
    pub const RAPID_STOP_EN: u8 = 1 << 1;
    pub const ACCELERATION_EN: u8 = 1 << 2;
    pub const FREQ_TRACK_EN: u8 = 1 << 3;
    pub const BEMF_SENSE_EN: u8 = 1 << 4;
    pub const ACTUATOR_TYPE: u8 = 1 << 5;

    /// Every bit `configure` owns in this register.
    pub const CONFIG_MASK: u8 = Self::ACTUATOR_TYPE
        | Self::BEMF_SENSE_EN
        | Self::FREQ_TRACK_EN
        | Self::ACCELERATION_EN
        | Self::RAPID_STOP_EN
        | Self::AMP_PID_EN;
}

bitfield! {
    pub struct TopCfg2Reg(u8);
    impl Debug;
    pub full_brake_thr, set_full_brake_thr: 3, 0;
    /// 0: snippet memory amplitudes are unsigned, 1: signed
    pub mem_data_signed, set_mem_data_signed: 4;
}

impl TopCfg2Reg {
    pub const MEM_DATA_SIGNED: u8 = 1 << 4;
}

bitfield! {
    pub struct TopCfg4Reg(u8);
    impl Debug;
    /// Disables impedance calibration during playback.
    pub tst_calib_impedance_dis, set_tst_calib_impedance_dis: 6;
    /// Freezes the V2I factor at the programmed value.
    pub v2i_factor_freeze, set_v2i_factor_freeze: 7;
}

impl TopCfg4Reg {
    pub const TST_CALIB_IMPEDANCE_DIS: u8 = 1 << 6;
    pub const V2I_FACTOR_FREEZE: u8 = 1 << 7;
}

bitfield! {
    pub struct TopIntCfg1Reg(u8);
    impl Debug;
    /// Back-EMF fault threshold. Zero disables back-EMF fault detection.
    pub bemf_fault_lim, set_bemf_fault_lim: 1, 0;
    pub frq_locked_lim, set_frq_locked_lim: 7, 2;
}

impl TopIntCfg1Reg {
    pub const BEMF_FAULT_LIM: u8 = 0b0000_0011;
}

bitfield! {
    pub struct TopCtl1Reg(u8);
    impl Debug;
    /// Raw `OPERATION_MODE` field, see `OperationMode`.
    pub operation_mode, set_operation_mode: 2, 0;
    /// 1: device ready, 0: standby.
    pub standby_en, set_standby_en: 3;
    /// Starts sequence playback in PWM and RTWM modes.
    pub seq_start, set_seq_start: 4;
}

impl TopCtl1Reg {
    pub const OPERATION_MODE: u8 = 0b0000_0111;
    pub const STANDBY_EN: u8 = 1 << 3;
    pub const SEQ_START: u8 = 1 << 4;
}

bitfield! {
    pub struct SeqCtl1Reg(u8);
    impl Debug;
    pub seq_continue, set_seq_continue: 0;
    /// Drive from the custom waveform generator instead of the resonance
    /// loop.
    pub wavegen_mode, set_wavegen_mode: 1;
    pub freq_waveform_timebase, set_freq_waveform_timebase: 2;
}

impl SeqCtl1Reg {
    pub const WAVEGEN_MODE: u8 = 1 << 1;
}

bitfield! {
    pub struct SeqCtl2Reg(u8);
    impl Debug;
    /// Sequence played by RTWM mode.
    pub ps_seq_id, set_ps_seq_id: 3, 0;
    /// Number of extra times the sequence is repeated.
    pub ps_seq_loop, set_ps_seq_loop: 7, 4;
}

impl SeqCtl2Reg {
    pub const PS_SEQ_ID: u8 = 0b0000_1111;
    pub const PS_SEQ_LOOP: u8 = 0b1111_0000;
}

bitfield! {
    /// Layout shared by `GPI_0_CTL`, `GPI_1_CTL` and `GPI_2_CTL`.
    pub struct GpiCtlReg(u8);
    impl Debug;
    /// 0: rising edge, 1: falling edge, 2: both edges
    pub polarity, set_polarity: 1, 0;
    /// 0: single pattern, 1: multi pattern
    pub mode, set_mode: 2;
    /// Sequence triggered by this input in ETWM mode.
    pub sequence_id, set_sequence_id: 6, 3;
}

bitfield! {
    pub struct MemCtl2Reg(u8);
    impl Debug;
    /// Inverted sense: snippet memory may only be written while this reads 1.
    pub pattern_mem_lock, set_pattern_mem_lock: 7;
}

impl MemCtl2Reg {
    pub const PATTERN_MEM_LOCK: u8 = 1 << 7;
}

bitfield! {
    pub struct FrqPhaseLReg(u8);
    impl Debug;
    /// Low bits of the phase shift, high byte in `FRQ_PHASE_H`.
    pub phase_shift_l, set_phase_shift_l: 2, 0;
    /// Holds the phase shift at its programmed value.
    pub phase_shift_freeze, set_phase_shift_freeze: 7;
}

impl FrqPhaseLReg {
    pub const PHASE_SHIFT_L: u8 = 0b0000_0111;
    pub const PHASE_SHIFT_FREEZE: u8 = 1 << 7;
}
