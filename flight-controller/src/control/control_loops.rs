use core::sync::atomic::Ordering;

use embassy_time::Instant;
use shared_definitions::{
    config::OUTPUT_CHANNELS,
    controller::{ControlReference, FlightMode},
};

use crate::{
    communication_interfaces::controller::{ChannelLevels, RemoteControl},
    config::constants::ESTIMATION_DT,
    control::{
        flight_controllers::{AttitudeStage, RateStage},
        reference::build_reference,
    },
    output::vehicle_movement_mappers::FlyingVehicleMovementMapper,
    shared_core_values::SharedState,
    util::{
        math::vectors::{BodyVector3D, Quaternion},
        time::elapsed_us_since,
    },
};

/// One estimator sample: attitude and body angular rates (rad/s).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AttitudeEstimate {
    pub attitude: Quaternion,
    pub rates: BodyVector3D,
}

pub enum MainControlLoopOutCommands {
    KillMotors,
    UpdateOutputs([f32; OUTPUT_CHANNELS]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    Position,
    Velocity,
    Attitude,
    Rate,
    OutputMixer,
    SendPwm,
}

/// Outermost loop first. A mode runs its entry stage and everything after it.
static CASCADE_ORDER: [CascadeStage; 6] = [
    CascadeStage::Position,
    CascadeStage::Velocity,
    CascadeStage::Attitude,
    CascadeStage::Rate,
    CascadeStage::OutputMixer,
    CascadeStage::SendPwm,
];

fn entry_stage(mode: FlightMode) -> Option<CascadeStage> {
    match mode {
        FlightMode::Disarmed => None,
        FlightMode::Position => Some(CascadeStage::Position),
        FlightMode::Velocity => Some(CascadeStage::Velocity),
        FlightMode::Attitude => Some(CascadeStage::Attitude),
        FlightMode::Rate => Some(CascadeStage::Rate),
        FlightMode::DirectControl => Some(CascadeStage::OutputMixer),
        FlightMode::DirectPwm => Some(CascadeStage::SendPwm),
    }
}

/// Stages executed for `mode`, in order. Empty when disarmed.
pub fn stages_for(mode: FlightMode) -> &'static [CascadeStage] {
    match entry_stage(mode) {
        Some(entry) => {
            let start = CASCADE_ORDER
                .iter()
                .position(|stage| *stage == entry)
                .unwrap_or(CASCADE_ORDER.len());
            &CASCADE_ORDER[start..]
        }
        None => &[],
    }
}

pub struct ControlCascade {
    reference: ControlReference,
    attitude_stage: AttitudeStage,
    rate_stage: RateStage,
}

impl ControlCascade {
    pub const fn new() -> Self {
        Self {
            reference: ControlReference::new(),
            attitude_stage: AttitudeStage::new(),
            rate_stage: RateStage::new(),
        }
    }

    pub fn reference(&self) -> &ControlReference {
        &self.reference
    }

    /// One control cycle. Publishes the resulting reference snapshot and
    /// returns what the output stage has to do.
    pub fn update(
        &mut self,
        shared: &SharedState,
        levels: &ChannelLevels,
        estimate: &AttitudeEstimate,
        iteration_time: f32,
    ) -> MainControlLoopOutCommands {
        let armed = shared.armed().is_armed() && !shared.faults.is_halted();
        let limits = shared.control_limits.read();
        let parameters = shared.controller_parameters.read();
        let previous_mode = self.reference.mode;

        build_reference(
            &mut self.reference,
            armed,
            shared.flight_mode_selector.read(),
            levels,
            &limits,
            &shared.arm_settings.read(),
        );
        if self.reference.mode != previous_mode {
            log::info!(
                "Flight mode {:?} -> {:?}",
                previous_mode,
                self.reference.mode
            );
        }

        let mut command = MainControlLoopOutCommands::KillMotors;
        let stages = stages_for(self.reference.mode);
        if stages.is_empty() {
            self.reference.pwm_out = [0.0; OUTPUT_CHANNELS];
            self.attitude_stage.reset();
            self.rate_stage.reset();
        }

        for stage in stages {
            match stage {
                // Reserved outer loops
                CascadeStage::Position | CascadeStage::Velocity => {}
                CascadeStage::Attitude => self.attitude_stage.update(
                    &mut self.reference,
                    &estimate.attitude,
                    &parameters,
                    &limits,
                    iteration_time,
                ),
                CascadeStage::Rate => self.rate_stage.update(
                    &mut self.reference,
                    &estimate.rates,
                    &parameters,
                    iteration_time,
                ),
                CascadeStage::OutputMixer => {
                    self.reference.pwm_out = shared
                        .output_mixer
                        .read()
                        .map_controller_output_to_actuators_input(
                            &self.reference.actuator_desired,
                        );
                }
                CascadeStage::SendPwm => {
                    command = MainControlLoopOutCommands::UpdateOutputs(self.reference.pwm_out);
                }
            }
        }

        shared.control_reference.write(self.reference);
        command
    }
}

impl Default for ControlCascade {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one cascade cycle per estimator signal, forever.
pub async fn start_flight_controllers<R: RemoteControl>(
    shared: &SharedState,
    remote: &R,
    mut controllers_out_callback: impl FnMut(MainControlLoopOutCommands),
) -> ! {
    let mut cascade = ControlCascade::new();
    log::info!("Control cascade waiting for estimates");

    loop {
        let estimate = shared.new_estimate.wait().await;
        let cycle_start = Instant::now();

        let levels = ChannelLevels::sample(remote);
        let command = cascade.update(shared, &levels, &estimate, ESTIMATION_DT);
        controllers_out_callback(command);

        let telemetry = &shared.telemetry;
        telemetry
            .loop_exec_time_us
            .store(elapsed_us_since(cycle_start), Ordering::Relaxed);
        telemetry.control_cycles.fetch_add(1, Ordering::Relaxed);
        telemetry.throttle.store(
            cascade.reference().actuator_desired.throttle,
            Ordering::Relaxed,
        );
    }
}
