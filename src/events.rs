use crate::registers::{ActuatorFaultReg, IrqFlags, PatDiagReg, WarningDiagReg};

/// Snapshot of the interrupt event registers taken by `Da728x::read_events`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EventReport {
    /// `IRQ_EVENT1`
    pub events: IrqFlags,
    /// `IRQ_EVENT_WARNING_DIAG`
    pub warning: WarningDiagReg,
    /// `IRQ_EVENT_PAT_DIAG`
    pub pattern: PatDiagReg,
    /// `IRQ_EVENT_ACTUATOR_FAULT`
    pub actuator: ActuatorFaultReg,
    /// Driving was stopped because of a pattern fault before the events were
    /// cleared.
    pub stopped_driving: bool,
}

impl EventReport {
    pub(crate) fn new(raw: [u8; 3], actuator: u8) -> Self {
        Self {
            events: IrqFlags(raw[0]),
            warning: WarningDiagReg(raw[1]),
            pattern: PatDiagReg(raw[2]),
            actuator: ActuatorFaultReg(actuator),
            stopped_driving: false,
        }
    }

    /// Nothing was pending. The nIRQ line may be shared, so this is a normal
    /// outcome of a poll.
    pub fn is_empty(&self) -> bool {
        self.events.0 == 0 && self.warning.0 == 0 && self.pattern.0 == 0 && self.actuator.0 == 0
    }

    pub fn pattern_fault(&self) -> bool {
        self.events.pat_fault()
    }

    /// Back-EMF abnormality. This is a warning: whether to stop driving is up
    /// to the caller.
    pub fn actuator_fault(&self) -> bool {
        self.events.actuator_fault() || self.actuator.adc_sat_fault()
    }

    pub fn over_current(&self) -> bool {
        self.events.oc_fault()
    }

    pub fn over_temperature(&self) -> bool {
        self.events.overtemp_crit() || self.warning.overtemp_warn()
    }

    pub fn pattern_done(&self) -> bool {
        self.events.pat_done()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventReport {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "events={=u8:#x} warning={=u8:#x} pattern={=u8:#x} actuator={=u8:#x} stopped_driving={=bool}",
            self.events.0,
            self.warning.0,
            self.pattern.0,
            self.actuator.0,
            self.stopped_driving
        )
    }
}
