use shared_definitions::{
    config::{ArmSettings, ControlLimits},
    controller::{ActuatorDesired, ControlReference, FlightMode},
};

use crate::{communication_interfaces::controller::ChannelLevels, config::constants::DEG2RAD};

/// Turns pilot sticks into the references of the selected mode. Disarmed
/// leaves the references alone but zeroes the actuator intent.
pub fn build_reference(
    reference: &mut ControlReference,
    armed: bool,
    mode_selector: FlightMode,
    levels: &ChannelLevels,
    limits: &ControlLimits,
    arm_settings: &ArmSettings,
) {
    if !armed {
        reference.mode = FlightMode::Disarmed;
        reference.actuator_desired = ActuatorDesired::zero();
        return;
    }

    match mode_selector {
        FlightMode::Rate => {
            reference.mode = FlightMode::Rate;
            reference.rate_reference.pitch = limits.max_rate.pitch * DEG2RAD * levels.pitch;
            reference.rate_reference.roll = limits.max_rate.roll * DEG2RAD * levels.roll;
        }
        FlightMode::DirectControl => {
            reference.mode = FlightMode::DirectControl;
            reference.actuator_desired.pitch = levels.pitch.clamp(-1.0, 1.0);
            reference.actuator_desired.roll = levels.roll.clamp(-1.0, 1.0);
            reference.actuator_desired.yaw = levels.yaw.clamp(-1.0, 1.0);
        }
        _ => {
            reference.mode = match mode_selector {
                FlightMode::Position | FlightMode::Velocity => mode_selector,
                _ => FlightMode::Attitude,
            };
            reference.attitude_reference.pitch = limits.max_angle.pitch * DEG2RAD * levels.pitch;
            reference.attitude_reference.roll = limits.max_angle.roll * DEG2RAD * levels.roll;
        }
    }

    reference.rate_reference.yaw = limits.max_rate.yaw * DEG2RAD * levels.yaw;
    reference.actuator_desired.throttle = levels.throttle.max(arm_settings.armed_min_throttle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use shared_definitions::config::{PitchRoll, PitchRollYaw};

    fn limits() -> ControlLimits {
        ControlLimits {
            max_angle: PitchRoll {
                pitch: 30.0,
                roll: 45.0,
            },
            max_rate: PitchRollYaw {
                pitch: 180.0,
                roll: 90.0,
                yaw: 360.0,
            },
            max_rate_attitude: PitchRoll {
                pitch: 2.0,
                roll: 2.0,
            },
        }
    }

    fn sticks() -> ChannelLevels {
        ChannelLevels {
            throttle: 0.4,
            pitch: 0.5,
            roll: -1.0,
            yaw: 0.25,
            emergency_stop: 1.0,
        }
    }

    #[test]
    fn disarmed_zeroes_actuator_intent() {
        let mut reference = ControlReference::new();
        reference.mode = FlightMode::Attitude;
        reference.actuator_desired.throttle = 0.7;

        build_reference(
            &mut reference,
            false,
            FlightMode::Attitude,
            &sticks(),
            &limits(),
            &ArmSettings::new(),
        );

        assert_eq!(reference.mode, FlightMode::Disarmed);
        assert_eq!(reference.actuator_desired, ActuatorDesired::zero());
    }

    #[test]
    fn attitude_mode_scales_by_max_angle() {
        let mut reference = ControlReference::new();

        build_reference(
            &mut reference,
            true,
            FlightMode::Attitude,
            &sticks(),
            &limits(),
            &ArmSettings::new(),
        );

        assert_eq!(reference.mode, FlightMode::Attitude);
        assert!(value_close(15.0 * DEG2RAD, reference.attitude_reference.pitch));
        assert!(value_close(-45.0 * DEG2RAD, reference.attitude_reference.roll));
        assert!(value_close(90.0 * DEG2RAD, reference.rate_reference.yaw));
        assert!(value_close(0.4, reference.actuator_desired.throttle));
    }

    #[test]
    fn rate_mode_scales_by_max_rate() {
        let mut reference = ControlReference::new();

        build_reference(
            &mut reference,
            true,
            FlightMode::Rate,
            &sticks(),
            &limits(),
            &ArmSettings::new(),
        );

        assert_eq!(reference.mode, FlightMode::Rate);
        assert!(value_close(90.0 * DEG2RAD, reference.rate_reference.pitch));
        assert!(value_close(-90.0 * DEG2RAD, reference.rate_reference.roll));
        assert_eq!(reference.attitude_reference, PitchRoll::zero());
    }

    #[test]
    fn throttle_floor_applies_while_armed() {
        let mut reference = ControlReference::new();
        let settings = ArmSettings {
            armed_min_throttle: 0.1,
            ..ArmSettings::new()
        };
        let mut levels = sticks();
        levels.throttle = 0.02;

        build_reference(
            &mut reference,
            true,
            FlightMode::Attitude,
            &levels,
            &limits(),
            &settings,
        );

        assert!(value_close(0.1, reference.actuator_desired.throttle));
    }

    #[test]
    fn direct_control_passes_sticks_through() {
        let mut reference = ControlReference::new();

        build_reference(
            &mut reference,
            true,
            FlightMode::DirectControl,
            &sticks(),
            &limits(),
            &ArmSettings::new(),
        );

        assert_eq!(reference.mode, FlightMode::DirectControl);
        assert!(vector_close(
            &[0.4, 0.5, -1.0, 0.25],
            &[
                reference.actuator_desired.throttle,
                reference.actuator_desired.pitch,
                reference.actuator_desired.roll,
                reference.actuator_desired.yaw,
            ],
        ));
    }

    #[test]
    fn unused_selectors_fall_back_to_attitude() {
        let mut reference = ControlReference::new();

        build_reference(
            &mut reference,
            true,
            FlightMode::DirectPwm,
            &sticks(),
            &limits(),
            &ArmSettings::new(),
        );

        assert_eq!(reference.mode, FlightMode::Attitude);
    }
}
