use shared_definitions::{
    config::{ControlLimits, ControllerParameters},
    controller::ControlReference,
};

use super::pid::PiController;
use crate::{
    config::constants::RATE_FILTER_ALPHA,
    util::math::{
        constraint_value,
        vectors::{BodyVector3D, Quaternion, RotationVector3D},
    },
};

/// Angle loop: orientation error to a bounded rate reference. Yaw is left to
/// the pilot's rate command.
pub struct AttitudeStage {
    pitch_controller: PiController,
    roll_controller: PiController,
}

impl AttitudeStage {
    pub const fn new() -> Self {
        Self {
            pitch_controller: PiController::new(),
            roll_controller: PiController::new(),
        }
    }

    pub fn update(
        &mut self,
        reference: &mut ControlReference,
        attitude: &Quaternion,
        parameters: &ControllerParameters,
        limits: &ControlLimits,
        iteration_time: f32,
    ) {
        let measured = attitude.calculate_orientation_angles();

        // Both axes track the pitch reference, the roll estimate is mirrored
        let roll_error = reference.attitude_reference.pitch + measured.roll;
        let pitch_error = reference.attitude_reference.pitch - measured.pitch;

        let pitch_output =
            self.pitch_controller
                .update(&parameters.attitude_pitch, pitch_error, iteration_time);
        let roll_output =
            self.roll_controller
                .update(&parameters.attitude_roll, roll_error, iteration_time);

        reference.rate_reference.pitch =
            constraint_value(pitch_output, limits.max_rate_attitude.pitch);
        reference.rate_reference.roll =
            constraint_value(roll_output, limits.max_rate_attitude.roll);
    }

    pub fn reset(&mut self) {
        self.pitch_controller.reset();
        self.roll_controller.reset();
    }

    pub fn accumulated(&self) -> (f32, f32) {
        (
            self.pitch_controller.accumulated(),
            self.roll_controller.accumulated(),
        )
    }
}

/// Rate loop: smoothed gyro rates against the rate reference, producing the
/// torque part of the actuator intent.
pub struct RateStage {
    filtered_rates: BodyVector3D,
    pitch_controller: PiController,
    roll_controller: PiController,
    yaw_controller: PiController,
}

impl RateStage {
    pub const fn new() -> Self {
        Self {
            filtered_rates: BodyVector3D {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            pitch_controller: PiController::new(),
            roll_controller: PiController::new(),
            yaw_controller: PiController::new(),
        }
    }

    fn filter(&mut self, rates: &BodyVector3D) -> RotationVector3D {
        let filter_axis = |previous: f32, sample: f32| {
            RATE_FILTER_ALPHA * sample + (1.0 - RATE_FILTER_ALPHA) * previous
        };
        self.filtered_rates = BodyVector3D {
            x: filter_axis(self.filtered_rates.x, rates.x),
            y: filter_axis(self.filtered_rates.y, rates.y),
            z: filter_axis(self.filtered_rates.z, rates.z),
        };
        self.filtered_rates.as_rotation_rates()
    }

    pub fn update(
        &mut self,
        reference: &mut ControlReference,
        rates: &BodyVector3D,
        parameters: &ControllerParameters,
        iteration_time: f32,
    ) {
        let measured = self.filter(rates);
        let error = RotationVector3D::from(reference.rate_reference) - measured;

        let pitch_output =
            self.pitch_controller
                .update(&parameters.rate_pitch, error.pitch, iteration_time);
        let roll_output = self
            .roll_controller
            .update(&parameters.rate_roll, error.roll, iteration_time);
        let yaw_output = self
            .yaw_controller
            .update(&parameters.rate_yaw, error.yaw, iteration_time);

        reference.actuator_desired.pitch = constraint_value(pitch_output, 1.0);
        reference.actuator_desired.roll = constraint_value(roll_output, 1.0);
        reference.actuator_desired.yaw = constraint_value(yaw_output, 1.0);
    }

    /// Clears the integrators. The rate filter keeps tracking the gyro.
    pub fn reset(&mut self) {
        self.pitch_controller.reset();
        self.roll_controller.reset();
        self.yaw_controller.reset();
    }

    pub fn filtered_rates(&self) -> BodyVector3D {
        self.filtered_rates
    }
}
