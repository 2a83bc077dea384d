use crate::config::{ActuatorConfig, Calibration, DeviceConfig, Features, OperationMode};

/// Driver side mirror of the chip state.
///
/// Only the driver mutates this. It reflects what the driver last wrote, not a
/// fresh read of the chip.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Mode last written to `OPERATION_MODE`.
    pub mode: OperationMode,
    /// `STANDBY_EN` is clear.
    pub suspended: bool,
    pub configured: Option<Configured>,
    /// Snippet memory has been written since construction.
    pub memory_loaded: bool,
}

impl DeviceState {
    pub(crate) const fn new() -> Self {
        Self {
            mode: OperationMode::Inactive,
            suspended: true,
            configured: None,
            memory_loaded: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }
}

/// The configuration accepted by the last successful `configure`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configured {
    pub actuator: ActuatorConfig,
    pub device: DeviceConfig,
    /// Drive options after device restrictions were applied.
    pub features: Features,
    pub calibration: Calibration,
}
