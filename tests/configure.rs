mod common;

use common::{haptic, FakeChip};
use da728x::{
    ActuatorConfig, ActuatorKind, Da728x, DeviceConfig, DrivingMode, Error, GpiConfig, GpiMode,
    GpiPolarity, OperationMode, Register, StateError, ValidationError, Variant,
};
use embedded_hal_mock::eh1::delay::NoopDelay;

#[tokio::test]
async fn construction_checks_revision_and_leaves_standby() {
    let (haptic, chip) = haptic().await;
    assert_eq!(haptic.variant(), Variant::Da7280);
    assert_eq!(chip.get(Register::TopCtl1), 0x08);

    let err = Da728x::new(FakeChip::new(0xda), NoopDelay, Variant::Da7281)
        .await
        .err()
        .unwrap();
    assert_eq!(
        err,
        Error::VariantMismatch {
            expected: 0xca,
            found: 0xda
        }
    );
}

#[tokio::test]
async fn other_addresses_are_not_acknowledged() {
    let chip = FakeChip::new(0xba);
    let result = Da728x::new_with_address(chip, NoopDelay, Variant::Da7280, 0x4b).await;
    assert!(matches!(result, Err(Error::Bus(_))));
}

#[tokio::test]
async fn reference_lra_register_values() {
    let (mut haptic, chip) = haptic().await;
    chip.set(Register::IrqEvent1, 0x06);
    haptic
        .configure(&ActuatorConfig::default(), &DeviceConfig::default())
        .await
        .unwrap();

    assert_eq!(chip.get(Register::FrqLraPerH), 0x20);
    assert_eq!(chip.get(Register::FrqLraPerL), 0x47);
    assert_eq!(chip.get(Register::TopCfg1), 0x1e);
    assert_eq!(chip.get(Register::Actuator3), 16);
    assert_eq!(chip.get(Register::CalibV2iH), 0);
    assert_eq!(chip.get(Register::CalibV2iL), 130);
    assert_eq!(chip.get(Register::Actuator1), 0x34);
    assert_eq!(chip.get(Register::Actuator2), 0x3c);
    // bring-up clears pending events
    assert_eq!(chip.get(Register::IrqEvent1), 0);
    assert!(!chip.was_written(Register::Gpi0Ctl));
    // frequency tracking leaves the phase loop at its reset state
    assert!(!chip.was_written(Register::FrqPhaseL));
    assert!(!chip.was_written(Register::SeqCtl1));
    assert!(haptic.state().is_configured());
}

#[tokio::test]
async fn configure_keeps_bits_it_does_not_own() {
    let (mut haptic, chip) = haptic().await;
    chip.set(Register::TopCfg1, 0x80);
    chip.set(Register::Actuator3, 0xe0);
    chip.set(Register::TopCfg2, 0x05);
    haptic
        .configure(
            &ActuatorConfig::default(),
            &DeviceConfig {
                mem_data_signed: true,
                ..DeviceConfig::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(chip.get(Register::TopCfg1), 0x9e);
    assert_eq!(chip.get(Register::Actuator3), 0xf0);
    assert_eq!(chip.get(Register::TopCfg2), 0x15);
}

#[tokio::test]
async fn coin_erm_quirks() {
    let (mut haptic, chip) = haptic().await;
    chip.set(Register::TopIntCfg1, 0x57);
    let actuator = ActuatorConfig {
        kind: ActuatorKind::ErmCoin,
        nominal_max_uv: 2_000_000,
        absolute_max_uv: 2_500_000,
        max_current_ua: 100_000,
        impedance_mohm: 25_000,
        resonant_frequency_hz: 0,
    };
    haptic
        .configure(&actuator, &DeviceConfig::default())
        .await
        .unwrap();

    assert_eq!(chip.get(Register::TopIntCfg1), 0x54);
    assert_eq!(chip.get(Register::TopCfg4), 0xc0);
    assert_eq!(chip.get(Register::TopCfg1), 0x38);
    assert!(!chip.was_written(Register::FrqLraPerH));
    assert!(!chip.was_written(Register::FrqLraPerL));
}

#[tokio::test]
async fn voltage_ratings_out_of_range_use_defaults() {
    let (mut haptic, chip) = haptic().await;
    let actuator = ActuatorConfig {
        nominal_max_uv: 6_000_000,
        absolute_max_uv: 7_500_000,
        ..ActuatorConfig::default()
    };
    haptic
        .configure(&actuator, &DeviceConfig::default())
        .await
        .unwrap();
    assert_eq!(chip.get(Register::Actuator1), 0x6b);
    assert_eq!(chip.get(Register::Actuator2), 0x78);
}

#[tokio::test]
async fn bring_up_writes_sequence_and_gpi() {
    let (mut haptic, chip) = haptic().await;
    let gpi = GpiConfig {
        sequence_id: 2,
        mode: GpiMode::MultiPattern,
        polarity: GpiPolarity::FallingEdge,
    };
    let device = DeviceConfig {
        operation_mode: OperationMode::Etwm,
        sequence_id: 9,
        sequence_loop: 3,
        override_value: 0x40,
        gpi: Some([gpi, GpiConfig::default(), gpi]),
        ..DeviceConfig::default()
    };
    haptic
        .configure(&ActuatorConfig::default(), &device)
        .await
        .unwrap();

    assert_eq!(chip.get(Register::SeqCtl2), 0x39);
    assert_eq!(chip.get(Register::TopCtl2), 0x40);
    assert_eq!(chip.get(Register::Gpi0Ctl), 0x15);
    assert_eq!(chip.get(Register::Gpi1Ctl), 0x00);
    assert_eq!(chip.get(Register::Gpi2Ctl), 0x15);
    // back-EMF sensing is dropped for the waveform memory modes
    assert_eq!(chip.get(Register::TopCfg1), 0x0e);
}

#[tokio::test]
async fn rejected_configuration_leaves_chip_untouched() {
    let (mut haptic, chip) = haptic().await;
    let writes = chip.write_count();
    let actuator = ActuatorConfig {
        max_current_ua: 252_001,
        ..ActuatorConfig::default()
    };
    assert_eq!(
        haptic.configure(&actuator, &DeviceConfig::default()).await,
        Err(Error::Validation(ValidationError::CurrentTooHigh(252_001)))
    );
    let actuator = ActuatorConfig {
        resonant_frequency_hz: 301,
        ..ActuatorConfig::default()
    };
    assert_eq!(
        haptic.configure(&actuator, &DeviceConfig::default()).await,
        Err(Error::Validation(ValidationError::FrequencyOutOfRange(301)))
    );
    assert_eq!(chip.write_count(), writes);
    assert_eq!(
        haptic.activate(OperationMode::Dro).await,
        Err(Error::State(StateError::NotConfigured))
    );
}

#[tokio::test]
async fn dro_drive_cycle() {
    let (mut haptic, chip) = haptic().await;
    haptic
        .configure(&ActuatorConfig::default(), &DeviceConfig::default())
        .await
        .unwrap();
    haptic.set_override_value(0x60).await.unwrap();
    haptic.activate(OperationMode::Dro).await.unwrap();
    assert_eq!(chip.get(Register::TopCtl2), 0x60);
    assert_eq!(chip.get(Register::TopCtl1), 0x09);

    assert_eq!(haptic.deactivate().await.unwrap(), OperationMode::Dro);
    assert_eq!(chip.get(Register::TopCtl1), 0x08);

    haptic.suspend().await.unwrap();
    assert_eq!(chip.get(Register::TopCtl1), 0x00);
    let writes = chip.write_count();
    haptic.suspend().await.unwrap();
    assert_eq!(chip.write_count(), writes);
    haptic.resume().await.unwrap();
    assert_eq!(chip.get(Register::TopCtl1), 0x08);
}

#[tokio::test]
async fn pwm_mode_leaves_pattern_memory_alone() {
    let (mut haptic, chip) = haptic().await;
    haptic
        .configure(&ActuatorConfig::default(), &DeviceConfig::default())
        .await
        .unwrap();
    let before = chip.write_count();
    haptic.activate(OperationMode::Pwm).await.unwrap();
    assert_eq!(chip.get(Register::TopCtl1), 0x1a);
    assert_eq!(haptic.deactivate().await.unwrap(), OperationMode::Pwm);
    assert_eq!(chip.get(Register::TopCtl1) & 0x07, 0);

    let touched_memory = chip.writes()[before..]
        .iter()
        .any(|&(addr, _)| addr == 0x2c || addr == 0x2d || addr >= 0x84);
    assert!(!touched_memory);
}

#[tokio::test]
async fn configure_refused_while_driving() {
    let (mut haptic, chip) = haptic().await;
    haptic
        .configure(&ActuatorConfig::default(), &DeviceConfig::default())
        .await
        .unwrap();
    haptic.activate(OperationMode::Dro).await.unwrap();

    chip.set(Register::IrqEvent1, 0x10);
    let writes = chip.write_count();
    let device = DeviceConfig {
        operation_mode: OperationMode::Rtwm,
        ..DeviceConfig::default()
    };
    assert_eq!(
        haptic.configure(&ActuatorConfig::default(), &device).await,
        Err(Error::State(StateError::AlreadyActive(OperationMode::Dro)))
    );
    assert_eq!(chip.write_count(), writes);
    // the latched fault is still there and the drive options are untouched
    assert_eq!(chip.get(Register::IrqEvent1), 0x10);
    assert_eq!(chip.get(Register::TopCfg1), 0x1e);
    assert_eq!(haptic.state().mode, OperationMode::Dro);

    haptic.deactivate().await.unwrap();
    haptic
        .configure(&ActuatorConfig::default(), &device)
        .await
        .unwrap();
    assert_eq!(chip.get(Register::TopCfg1), 0x0e);
}

#[tokio::test]
async fn wideband_freezes_the_phase_loop() {
    let (mut haptic, chip) = haptic().await;
    chip.set(Register::FrqPhaseH, 0x12);
    chip.set(Register::FrqPhaseL, 0x05);
    let device = DeviceConfig {
        driving_mode: DrivingMode::Wideband,
        ..DeviceConfig::default()
    };
    haptic
        .configure(&ActuatorConfig::default(), &device)
        .await
        .unwrap();

    assert_eq!(chip.get(Register::FrqPhaseH), 0x00);
    assert_eq!(chip.get(Register::FrqPhaseL), 0x80);
    assert_eq!(chip.get(Register::SeqCtl1) & 0x02, 0);
    assert_eq!(chip.get(Register::TopCfg4) & 0x80, 0);
    // no back-EMF sense, tracking, acceleration or rapid stop
    assert_eq!(chip.get(Register::TopCfg1), 0x00);

    // tones outside the resonance window
    haptic.set_resonant_frequency(440).await.unwrap();
    assert_eq!(chip.get(Register::FrqLraPerH), 0x0d);
    assert_eq!(chip.get(Register::FrqLraPerL), 0x28);
    assert_eq!(
        haptic.set_resonant_frequency(1024).await,
        Err(Error::Validation(ValidationError::FrequencyOutOfRange(1024)))
    );
}

#[tokio::test]
async fn custom_waveform_then_back_to_tracking() {
    let (mut haptic, chip) = haptic().await;
    let device = DeviceConfig {
        driving_mode: DrivingMode::CustomWaveform,
        amp_pid: true,
        ..DeviceConfig::default()
    };
    haptic
        .configure(&ActuatorConfig::default(), &device)
        .await
        .unwrap();
    assert_eq!(chip.get(Register::FrqPhaseL), 0x80);
    assert_eq!(chip.get(Register::SeqCtl1), 0x02);
    assert_eq!(chip.get(Register::TopCfg4), 0x80);
    assert_eq!(chip.get(Register::TopCfg1), 0x00);

    haptic
        .configure(&ActuatorConfig::default(), &DeviceConfig::default())
        .await
        .unwrap();
    assert_eq!(chip.get(Register::FrqPhaseL), 0x00);
    assert_eq!(chip.get(Register::SeqCtl1), 0x00);
    assert_eq!(chip.get(Register::TopCfg4), 0x00);
    assert_eq!(chip.get(Register::TopCfg1), 0x1e);
    assert_eq!(
        haptic.set_resonant_frequency(440).await,
        Err(Error::Validation(ValidationError::FrequencyOutOfRange(440)))
    );
}
