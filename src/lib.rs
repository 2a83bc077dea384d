/*!
A platform agnostic, async Rust driver for the DA7280, DA7281 and DA7282
haptic drivers, based on the [`embedded-hal-async`] traits.

The driver owns the I2C bus handle and a delay source. It validates actuator
parameters before anything is written, programs the derived calibration values,
walks the chip through its operation modes and manages the 100 byte snippet
memory used by the waveform memory modes.

```no_run
# async fn run<I2C, D>(i2c: I2C, delay: D) -> Result<(), da728x::Error<I2C::Error>>
# where
#     I2C: embedded_hal_async::i2c::I2c,
#     D: embedded_hal_async::delay::DelayNs,
# {
use da728x::{ActuatorConfig, Da728x, DeviceConfig, OperationMode, Variant};

let mut haptic = Da728x::new(i2c, delay, Variant::Da7280).await?;
haptic
    .configure(&ActuatorConfig::default(), &DeviceConfig::default())
    .await?;

haptic.set_override_value(0x60).await?;
haptic.activate(OperationMode::Dro).await?;
// ...
haptic.deactivate().await?;
# Ok(())
# }
```

[`embedded-hal-async`]: https://docs.rs/embedded-hal-async
*/
#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
mod error;
mod events;
mod log;
pub mod registers;
mod state;
pub mod waveform;

pub use config::{
    ActuatorConfig, ActuatorKind, Calibration, DeviceConfig, DrivingMode, Features, GpiConfig,
    GpiMode, GpiPin, GpiPolarity, OperationMode, PwmInput, Variant, VariantInfo,
};
pub use error::{Error, StateError, ValidationError, WaveformError};
pub use events::EventReport;
pub use registers::{IrqFlags, Register};
pub use state::{Configured, DeviceState};
pub use waveform::{PatternBuilder, SnippetMemory};

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::{
    lra_period, lra_period_bytes, IMAX_CODE_MAX, PWM_FREQ_MAX_HZ, PWM_FREQ_MIN_HZ, SEQ_ID_MAX,
    SEQ_LOOP_MAX,
};
use crate::log::{debug, info, warn};
use crate::registers::{
    ChipRevReg, FrqPhaseLReg, MemCtl2Reg, SeqCtl1Reg, SeqCtl2Reg, TopCfg1Reg, TopCfg2Reg,
    TopCfg4Reg, TopCtl1Reg, TopIntCfg1Reg, SNP_MEM_FIRST, SNP_MEM_LAST, SNP_MEM_SIZE,
};

/// 7-bit I2C address shared by the whole family.
pub const DEFAULT_ADDRESS: u8 = 0x4a;

/// One step of a register script, see [`Da728x::run_script`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Write a whole register.
    Write(Register, u8),
    /// Read-modify-write: `(register, mask, value)`.
    Update(Register, u8, u8),
    /// Wait this many milliseconds.
    Delay(u32),
}

pub struct Da728x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    variant: Variant,
    state: DeviceState,
}

impl<I2C, D, E> Da728x<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Checks `CHIP_REV` against `variant` and takes the chip out of standby.
    pub async fn new(i2c: I2C, delay: D, variant: Variant) -> Result<Self, Error<E>> {
        Self::new_with_address(i2c, delay, variant, DEFAULT_ADDRESS).await
    }

    pub async fn new_with_address(
        i2c: I2C,
        delay: D,
        variant: Variant,
        address: u8,
    ) -> Result<Self, Error<E>> {
        let mut haptic = Self {
            i2c,
            delay,
            address,
            variant,
            state: DeviceState::new(),
        };
        haptic.check_variant().await?;
        haptic.resume().await?;
        info!("DA728x ready at {=u8:#x}", address);
        Ok(haptic)
    }

    /// Give back the bus and the delay source.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.state.mode
    }

    pub fn is_suspended(&self) -> bool {
        self.state.suspended
    }

    /// Values derived by the last successful `configure`.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.state.configured.as_ref().map(|c| &c.calibration)
    }

    async fn check_variant(&mut self) -> Result<(), Error<E>> {
        let expected = self.variant.info().chip_rev;
        let found = self.read(Register::ChipRev).await?;
        if found != expected {
            warn!("unexpected CHIP_REV {=u8:#x}", found);
            return Err(Error::VariantMismatch { expected, found });
        }
        Ok(())
    }

    pub async fn chip_revision(&mut self) -> Result<ChipRevReg, Error<E>> {
        self.read(Register::ChipRev).await.map(ChipRevReg)
    }

    /// Read an 8-bit value from the register
    pub async fn read(&mut self, register: Register) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register as u8], &mut buf)
            .await
            .map_err(Error::Bus)?;
        Ok(buf[0])
    }

    /// Write `value` to `register`
    pub async fn write(&mut self, register: Register, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &[register as u8, value])
            .await
            .map_err(Error::Bus)
    }

    /// Clear the `mask` bits of `register` and set `value & mask`.
    ///
    /// The register is written back even when nothing changes.
    pub async fn update_bits(
        &mut self,
        register: Register,
        mask: u8,
        value: u8,
    ) -> Result<(), Error<E>> {
        let current = self.read(register).await?;
        self.write(register, (current & !mask) | (value & mask))
            .await
    }

    /// Write `data` to consecutive registers starting at `start`, in a single
    /// bus transaction. At most 100 bytes.
    pub async fn bulk_write(&mut self, start: u8, data: &[u8]) -> Result<(), Error<E>> {
        let mut buf = [0u8; SNP_MEM_SIZE + 1];
        let frame = buf.get_mut(..data.len() + 1).ok_or(Error::Capacity {
            len: data.len(),
            capacity: SNP_MEM_SIZE,
        })?;
        frame[0] = start;
        frame[1..].copy_from_slice(data);
        self.i2c.write(self.address, frame).await.map_err(Error::Bus)
    }

    /// Fill `buf` from consecutive registers starting at `start`.
    pub async fn bulk_read(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write_read(self.address, &[start], buf)
            .await
            .map_err(Error::Bus)
    }

    /// Run `script` in order, stopping at the first failed step.
    ///
    /// Dropping the returned future between steps leaves the registers written
    /// so far in place.
    pub async fn run_script(&mut self, script: &[Step]) -> Result<(), Error<E>> {
        for step in script {
            match *step {
                Step::Write(register, value) => self.write(register, value).await?,
                Step::Update(register, mask, value) => {
                    self.update_bits(register, mask, value).await?
                }
                Step::Delay(ms) => self.delay.delay_ms(ms).await,
            }
        }
        Ok(())
    }

    /// Validate `actuator` and `device`, then program the chip.
    ///
    /// Nothing is written unless both validate and no mode is active. The
    /// operation mode is not changed; call [`activate`](Self::activate)
    /// afterwards.
    pub async fn configure(
        &mut self,
        actuator: &ActuatorConfig,
        device: &DeviceConfig,
    ) -> Result<(), Error<E>> {
        actuator.validate()?;
        device.validate()?;
        if self.state.mode != OperationMode::Inactive {
            return Err(StateError::AlreadyActive(self.state.mode).into());
        }

        let features = device.effective_features(actuator.kind);
        let calibration = Calibration::derive(actuator, self.variant.info());
        debug!("calibration {}", calibration);

        match actuator.kind {
            ActuatorKind::Lra => {
                if let Some(period) = calibration.lra_period {
                    self.write_lra_period(period).await?;
                }
            }
            ActuatorKind::ErmCoin => {
                self.update_bits(Register::TopIntCfg1, TopIntCfg1Reg::BEMF_FAULT_LIM, 0)
                    .await?;
                let freeze = TopCfg4Reg::TST_CALIB_IMPEDANCE_DIS | TopCfg4Reg::V2I_FACTOR_FREEZE;
                self.update_bits(Register::TopCfg4, freeze, freeze).await?;
            }
            ActuatorKind::ErmBar => {}
        }

        self.update_bits(
            Register::TopCfg1,
            TopCfg1Reg::CONFIG_MASK,
            features.top_cfg1(actuator.kind),
        )
        .await?;

        self.update_bits(Register::Actuator3, IMAX_CODE_MAX, calibration.imax_code)
            .await?;
        let [v2i_h, v2i_l] = calibration.v2i_factor.to_be_bytes();
        self.write(Register::CalibV2iL, v2i_l).await?;
        self.write(Register::CalibV2iH, v2i_h).await?;

        self.write(Register::Actuator1, calibration.nominal_voltage_code)
            .await?;
        self.write(Register::Actuator2, calibration.absolute_voltage_code)
            .await?;

        let signed = if device.mem_data_signed {
            TopCfg2Reg::MEM_DATA_SIGNED
        } else {
            0
        };
        self.update_bits(Register::TopCfg2, TopCfg2Reg::MEM_DATA_SIGNED, signed)
            .await?;

        // Frequency tracking is the reset state; only touch the phase loop
        // when entering or leaving the other modes.
        let previous = self
            .state
            .configured
            .as_ref()
            .map_or(DrivingMode::FrequencyTrack, |c| c.device.driving_mode);
        if device.driving_mode.freezes_phase() || previous.freezes_phase() {
            self.write_driving_mode(device.driving_mode, actuator.kind)
                .await?;
        }

        let gpi = device.gpi.unwrap_or_default();
        let bring_up = [
            Step::Write(Register::IrqEvent1, 0xff),
            Step::Write(Register::TopCtl2, device.override_value),
            Step::Write(Register::SeqCtl2, device.seq_ctl2()),
            Step::Write(GpiPin::Gpi0.register(), gpi[0].to_reg()),
            Step::Write(GpiPin::Gpi1.register(), gpi[1].to_reg()),
            Step::Write(GpiPin::Gpi2.register(), gpi[2].to_reg()),
        ];
        let steps = if device.gpi.is_some() { 6 } else { 3 };
        self.run_script(&bring_up[..steps]).await?;

        self.state.configured = Some(Configured {
            actuator: *actuator,
            device: *device,
            features,
            calibration,
        });
        info!("configured {}", actuator.kind);
        Ok(())
    }

    async fn write_driving_mode(
        &mut self,
        mode: DrivingMode,
        kind: ActuatorKind,
    ) -> Result<(), Error<E>> {
        let phase = if mode.freezes_phase() {
            FrqPhaseLReg::PHASE_SHIFT_FREEZE
        } else {
            0
        };
        let custom = mode == DrivingMode::CustomWaveform;
        let wavegen = if custom { SeqCtl1Reg::WAVEGEN_MODE } else { 0 };
        // coin ERMs always run with the V2I factor frozen
        let v2i_freeze = if custom || kind == ActuatorKind::ErmCoin {
            TopCfg4Reg::V2I_FACTOR_FREEZE
        } else {
            0
        };
        let steps = [
            Step::Write(Register::FrqPhaseH, 0),
            Step::Update(
                Register::FrqPhaseL,
                FrqPhaseLReg::PHASE_SHIFT_L | FrqPhaseLReg::PHASE_SHIFT_FREEZE,
                phase,
            ),
            Step::Update(Register::SeqCtl1, SeqCtl1Reg::WAVEGEN_MODE, wavegen),
            Step::Update(Register::TopCfg4, TopCfg4Reg::V2I_FACTOR_FREEZE, v2i_freeze),
        ];
        self.run_script(&steps).await?;
        debug!("driving mode {}", mode);
        Ok(())
    }

    async fn write_lra_period(&mut self, period: u16) -> Result<(), Error<E>> {
        let (high, low) = lra_period_bytes(period);
        self.write(Register::FrqLraPerH, high).await?;
        self.write(Register::FrqLraPerL, low).await
    }

    /// Reprogram the LRA drive period for `hz`.
    ///
    /// Accepts 50..=300 Hz while tracking resonance and 25..=1023 Hz in the
    /// wideband and custom waveform driving modes. Before `configure` the
    /// tracking range applies.
    pub async fn set_resonant_frequency(&mut self, hz: u32) -> Result<(), Error<E>> {
        self.state
            .configured
            .as_ref()
            .map_or(DrivingMode::FrequencyTrack, |c| c.device.driving_mode)
            .validate_frequency(hz)?;
        let period = lra_period(hz);
        self.write_lra_period(period).await?;
        if let Some(configured) = self.state.configured.as_mut() {
            configured.actuator.resonant_frequency_hz = hz;
            configured.calibration.lra_period = Some(period);
        }
        Ok(())
    }

    /// Sequence played by RTWM mode.
    pub async fn set_sequence_id(&mut self, id: u8) -> Result<(), Error<E>> {
        if id > SEQ_ID_MAX {
            return Err(ValidationError::SequenceIdOutOfRange(id).into());
        }
        self.update_bits(Register::SeqCtl2, SeqCtl2Reg::PS_SEQ_ID, id)
            .await?;
        if let Some(configured) = self.state.configured.as_mut() {
            configured.device.sequence_id = id;
        }
        Ok(())
    }

    /// Number of extra plays of the RTWM sequence.
    pub async fn set_sequence_loop(&mut self, count: u8) -> Result<(), Error<E>> {
        if count > SEQ_LOOP_MAX {
            return Err(ValidationError::SequenceLoopOutOfRange(count).into());
        }
        self.update_bits(Register::SeqCtl2, SeqCtl2Reg::PS_SEQ_LOOP, count << 4)
            .await?;
        if let Some(configured) = self.state.configured.as_mut() {
            configured.device.sequence_loop = count;
        }
        Ok(())
    }

    pub async fn configure_gpi(&mut self, pin: GpiPin, config: GpiConfig) -> Result<(), Error<E>> {
        config.validate()?;
        self.write(pin.register(), config.to_reg()).await?;
        if let Some(configured) = self.state.configured.as_mut() {
            let mut gpi = configured.device.gpi.unwrap_or_default();
            gpi[pin as usize] = config;
            configured.device.gpi = Some(gpi);
        }
        Ok(())
    }

    /// Drive level for DRO mode.
    ///
    /// Only allowed when configured for DRO. With acceleration enabled the
    /// level is unsigned, so negative values are rejected.
    pub async fn set_override_value(&mut self, value: i8) -> Result<(), Error<E>> {
        let configured = self
            .state
            .configured
            .as_ref()
            .ok_or(StateError::NotConfigured)?;
        if configured.device.operation_mode != OperationMode::Dro {
            return Err(StateError::WrongMode(configured.device.operation_mode).into());
        }
        if configured.features.acceleration && value < 0 {
            return Err(ValidationError::OverrideValueOutOfRange(value).into());
        }
        self.write(Register::TopCtl2, value as u8).await
    }

    /// Check an external PWM source against the chip's input limits.
    pub fn check_pwm_input(&self, input: PwmInput) -> Result<(), Error<E>> {
        let configured = self
            .state
            .configured
            .as_ref()
            .ok_or(StateError::NotConfigured)?;
        if !(PWM_FREQ_MIN_HZ..=PWM_FREQ_MAX_HZ).contains(&input.frequency_hz) {
            return Err(ValidationError::PwmFrequencyOutOfRange(input.frequency_hz).into());
        }
        if !configured.features.acceleration && input.duty_percent < 50 {
            return Err(ValidationError::PwmDutyOutOfRange(input.duty_percent).into());
        }
        Ok(())
    }

    /// Lock or unlock snippet memory. The lock field is inverted: it reads 0
    /// while locked.
    pub async fn set_memory_lock(&mut self, locked: bool) -> Result<(), Error<E>> {
        let value = if locked { 0 } else { MemCtl2Reg::PATTERN_MEM_LOCK };
        self.update_bits(Register::MemCtl2, MemCtl2Reg::PATTERN_MEM_LOCK, value)
            .await
    }

    /// Set bits in `mask` keep the matching events off the nIRQ line.
    pub async fn set_irq_mask(&mut self, mask: IrqFlags) -> Result<(), Error<E>> {
        self.write(Register::IrqMask1, mask.0).await
    }

    /// Start driving in `mode`.
    ///
    /// For PWM mode the external PWM signal must already be running. PWM and
    /// RTWM also get `SEQ_START` set.
    pub async fn activate(&mut self, mode: OperationMode) -> Result<(), Error<E>> {
        if mode == OperationMode::Inactive {
            return Err(ValidationError::InvalidMode(mode).into());
        }
        let bemf_sense = self
            .state
            .configured
            .as_ref()
            .ok_or(StateError::NotConfigured)?
            .features
            .bemf_sense;
        if self.state.mode != OperationMode::Inactive {
            return Err(StateError::AlreadyActive(self.state.mode).into());
        }
        if mode.uses_waveform_memory() {
            if bemf_sense {
                return Err(StateError::BackEmfSenseEnabled.into());
            }
            if !self.state.memory_loaded {
                return Err(StateError::MemoryEmpty.into());
            }
        }

        self.update_bits(Register::TopCtl1, TopCtl1Reg::OPERATION_MODE, mode as u8)
            .await?;
        self.state.mode = mode;

        if matches!(mode, OperationMode::Pwm | OperationMode::Rtwm) {
            self.update_bits(Register::TopCtl1, TopCtl1Reg::SEQ_START, TopCtl1Reg::SEQ_START)
                .await?;
        }
        debug!("activated {}", mode);
        Ok(())
    }

    /// Stop driving and return the mode that was active.
    ///
    /// `OPERATION_MODE` is cleared even if the driver thinks nothing is
    /// active. When this returns [`OperationMode::Pwm`] the external PWM source
    /// may be stopped; stopping it earlier can latch a fault.
    pub async fn deactivate(&mut self) -> Result<OperationMode, Error<E>> {
        let previous = self.state.mode;
        self.update_bits(Register::TopCtl1, TopCtl1Reg::OPERATION_MODE, 0)
            .await?;
        self.state.mode = OperationMode::Inactive;
        if previous == OperationMode::Pwm {
            debug!("PWM mode left, PWM input can be stopped");
        }
        Ok(previous)
    }

    /// Enter standby. Does nothing if already suspended.
    pub async fn suspend(&mut self) -> Result<(), Error<E>> {
        if self.state.suspended {
            return Ok(());
        }
        self.update_bits(Register::TopCtl1, TopCtl1Reg::STANDBY_EN, 0)
            .await?;
        self.state.suspended = true;
        debug!("standby");
        Ok(())
    }

    /// Leave standby. Does nothing if not suspended.
    pub async fn resume(&mut self) -> Result<(), Error<E>> {
        if !self.state.suspended {
            return Ok(());
        }
        self.update_bits(Register::TopCtl1, TopCtl1Reg::STANDBY_EN, TopCtl1Reg::STANDBY_EN)
            .await?;
        self.state.suspended = false;
        debug!("ready");
        Ok(())
    }

    /// Base address of the pattern data, checked against the snippet memory
    /// window.
    async fn memory_base(&mut self) -> Result<u8, Error<E>> {
        let base = self.read(Register::MemCtl1).await?;
        if !(SNP_MEM_FIRST..=SNP_MEM_LAST).contains(&base) {
            return Err(StateError::InvalidBaseAddress(base).into());
        }
        Ok(base)
    }

    /// Write `data` to snippet memory.
    ///
    /// The write starts at the base address in `MEM_CTL1` and always runs to
    /// the end of snippet memory; bytes past `data` are written as zero. Fails
    /// while the chip is driving or the memory is locked. An empty `data`
    /// clears the memory and leaves nothing to play.
    pub async fn upload(&mut self, data: &[u8]) -> Result<(), Error<E>> {
        if data.len() > SNP_MEM_SIZE {
            return Err(Error::Capacity {
                len: data.len(),
                capacity: SNP_MEM_SIZE,
            });
        }

        let status = IrqFlags(self.read(Register::IrqStatus1).await?);
        if status.warning() {
            return Err(StateError::Busy.into());
        }
        let lock = MemCtl2Reg(self.read(Register::MemCtl2).await?);
        if !lock.pattern_mem_lock() {
            return Err(StateError::MemoryLocked.into());
        }

        let base = self.memory_base().await?;
        let available = (SNP_MEM_LAST - base) as usize + 1;
        if data.len() > available {
            return Err(Error::Capacity {
                len: data.len(),
                capacity: available,
            });
        }

        let mut staged = [0u8; SNP_MEM_SIZE];
        staged[..data.len()].copy_from_slice(data);
        self.bulk_write(base, &staged[..available]).await?;
        self.state.memory_loaded = !data.is_empty();
        debug!("uploaded {=usize} bytes at {=u8:#x}", data.len(), base);
        Ok(())
    }

    /// Read `count` bytes of snippet memory from the base address in
    /// `MEM_CTL1`.
    pub async fn read_memory(&mut self, count: usize) -> Result<SnippetMemory, Error<E>> {
        if count > SNP_MEM_SIZE {
            return Err(Error::Capacity {
                len: count,
                capacity: SNP_MEM_SIZE,
            });
        }
        let base = self.memory_base().await?;
        let available = (SNP_MEM_LAST - base) as usize + 1;
        if count > available {
            return Err(Error::Capacity {
                len: count,
                capacity: available,
            });
        }
        let mut memory = SnippetMemory::new();
        self.bulk_read(base, memory.as_mut_bytes(count)).await?;
        Ok(memory)
    }

    /// Live `IRQ_STATUS1`.
    pub async fn read_status(&mut self) -> Result<IrqFlags, Error<E>> {
        self.read(Register::IrqStatus1).await.map(IrqFlags)
    }

    /// Read and clear pending events.
    ///
    /// A pattern fault stops driving before the events are cleared, otherwise
    /// the fault asserts again. Only the bits that were read as set are
    /// written back. An empty report is a normal result when the nIRQ line is
    /// shared.
    pub async fn read_events(&mut self) -> Result<EventReport, Error<E>> {
        let mut raw = [0u8; 3];
        self.bulk_read(Register::IrqEvent1 as u8, &mut raw).await?;
        let actuator = self.read(Register::IrqEventActuatorFault).await?;

        let mut report = EventReport::new(raw, actuator);
        if report.is_empty() {
            return Ok(report);
        }

        if report.pattern_fault() {
            warn!("pattern fault {=u8:#x}, stopping", report.pattern.0);
            self.update_bits(Register::TopCtl1, TopCtl1Reg::OPERATION_MODE, 0)
                .await?;
            self.state.mode = OperationMode::Inactive;
            report.stopped_driving = true;
        }

        if report.events.0 != 0 {
            self.write(Register::IrqEvent1, report.events.0).await?;
        }
        if report.actuator.0 != 0 {
            self.write(Register::IrqEventActuatorFault, report.actuator.0)
                .await?;
        }
        debug!("events {}", report);
        Ok(report)
    }
}
