use core::sync::atomic::Ordering;

use embassy_time::{Duration, Ticker, Timer};
use shared_definitions::{
    config::{ArmSettings, StickDirection},
    controller::InputRole,
};

use crate::{
    communication_interfaces::configuration::ConfigurationPort,
    config::store::{start_parameter_store, ParameterStore},
    control::{
        arming::start_arming_supervisor,
        control_loops::{start_flight_controllers, MainControlLoopOutCommands},
    },
    drivers::record_flash::FlashRecordStore,
    output::motors_state_manager::MotorsStateManager,
    shared_core_values::{ArmedWriter, DisarmAuthority, SharedState},
    simulation::{
        run_simulated_estimator, LogIndicator, RamFlash, RecordingOutputs, SimulatedRadio,
    },
};

const TELEMETRY_PERIOD_MS: u64 = 1000;

#[embassy_executor::task]
pub async fn arming_thread(
    shared: &'static SharedState,
    armed: ArmedWriter<'static>,
    radio: &'static SimulatedRadio,
) {
    start_arming_supervisor(shared, armed, radio, Some(LogIndicator::default())).await
}

#[embassy_executor::task]
pub async fn flight_thread(
    shared: &'static SharedState,
    radio: &'static SimulatedRadio,
    mut motors_manager: MotorsStateManager<RecordingOutputs>,
) {
    let output_handler = move |command: MainControlLoopOutCommands| match command {
        MainControlLoopOutCommands::KillMotors => motors_manager.kill_motors(),
        MainControlLoopOutCommands::UpdateOutputs(values) => motors_manager.set_motor_power(values),
    };
    start_flight_controllers(shared, radio, output_handler).await
}

#[embassy_executor::task]
pub async fn parameter_store_thread(
    shared: &'static SharedState,
    store: ParameterStore<FlashRecordStore<RamFlash>>,
) {
    start_parameter_store(shared, store).await
}

#[embassy_executor::task]
pub async fn estimator_thread(shared: &'static SharedState) {
    run_simulated_estimator(shared).await
}

#[embassy_executor::task]
pub async fn telemetry_thread(shared: &'static SharedState) {
    let port = ConfigurationPort::new(shared);
    let telemetry = &shared.telemetry;
    let mut ticker = Ticker::every(Duration::from_millis(TELEMETRY_PERIOD_MS));
    loop {
        let reference = port.control_reference();
        log::info!(
            "
                Mode: {:?} armed: {}
                Iteration time: {}us cycles: {}
                Throttle: {:.3}
                PWM: {:?}
                Faults: {:?}",
            reference.mode,
            port.is_armed(),
            telemetry.loop_exec_time_us.load(Ordering::Relaxed),
            telemetry.control_cycles.load(Ordering::Relaxed),
            telemetry.throttle.load(Ordering::Relaxed),
            reference.pwm_out,
            port.faults(),
        );
        ticker.next().await;
    }
}

/// Scripted pilot and ground tool for the host build: arms with the yaw
/// gesture, flies a short throttle sweep, saves the parameters and ends
/// with a forced disarm.
#[embassy_executor::task]
pub async fn ground_station_thread(
    shared: &'static SharedState,
    radio: &'static SimulatedRadio,
    authority: DisarmAuthority<'static>,
) {
    let port = ConfigurationPort::new(shared);
    let mut settings = port.arm_settings();
    if settings.stick_direction == StickDirection::None {
        settings = ArmSettings {
            stick_threshold: 0.05,
            armed_min_throttle: 0.05,
            stick_direction: StickDirection::YawMin,
            arm_stick_time: 1,
            arm_zero_throttle_timeout: 10,
        };
        port.set_arm_settings(settings);
    }

    log::info!("Holding arm gesture");
    radio.set_level(InputRole::Throttle, 0.0);
    radio.set_level(
        gesture_role(settings.stick_direction),
        gesture_level(settings.stick_direction),
    );
    Timer::after(Duration::from_secs(settings.arm_stick_time as u64 + 1)).await;
    radio.set_level(gesture_role(settings.stick_direction), 0.0);

    for step in 1..=5 {
        radio.set_level(InputRole::Throttle, step as f32 * 0.1);
        radio.set_level(InputRole::Pitch, 0.2);
        Timer::after(Duration::from_millis(500)).await;
    }
    radio.set_level(InputRole::Pitch, 0.0);

    port.request_save();
    Timer::after(Duration::from_secs(1)).await;

    log::info!("Ground station requesting disarm");
    port.force_disarm(&authority);
    radio.set_level(InputRole::Throttle, 0.0);
}

fn gesture_role(direction: StickDirection) -> InputRole {
    match direction {
        StickDirection::PitchMin | StickDirection::PitchMax => InputRole::Pitch,
        StickDirection::RollMin | StickDirection::RollMax => InputRole::Roll,
        StickDirection::ThrottleMin | StickDirection::ThrottleMax => InputRole::Throttle,
        StickDirection::None | StickDirection::YawMin | StickDirection::YawMax => InputRole::Yaw,
    }
}

fn gesture_level(direction: StickDirection) -> f32 {
    match direction {
        StickDirection::PitchMin | StickDirection::RollMin | StickDirection::YawMin => -1.0,
        StickDirection::PitchMax | StickDirection::RollMax | StickDirection::YawMax => 1.0,
        _ => 0.0,
    }
}
