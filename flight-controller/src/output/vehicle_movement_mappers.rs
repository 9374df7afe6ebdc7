use shared_definitions::{
    config::{OutputMixer, OUTPUT_CHANNELS},
    controller::ActuatorDesired,
};

use crate::util::math::constraint_value;

pub trait FlyingVehicleMovementMapper<TActuator> {
    fn map_controller_output_to_actuators_input(&self, desired: &ActuatorDesired) -> TActuator;
}

/// Weighted sum per channel, each channel clamped on its own to `[-1, 1]`.
impl FlyingVehicleMovementMapper<[f32; OUTPUT_CHANNELS]> for OutputMixer {
    fn map_controller_output_to_actuators_input(
        &self,
        desired: &ActuatorDesired,
    ) -> [f32; OUTPUT_CHANNELS] {
        self.weights.map(|[throttle, pitch, roll, yaw]| {
            let sum = desired.throttle * throttle
                + desired.pitch * pitch
                + desired.roll * roll
                + desired.yaw * yaw;
            constraint_value(sum, 1.0)
        })
    }
}
