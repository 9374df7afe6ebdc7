use crate::config::{PitchRoll, PitchRollYaw, OUTPUT_CHANNELS};

/// Logical roles of the radio input channels. Stick levels are normalized to
/// `[-1, 1]`, throttle to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Throttle,
    Pitch,
    Roll,
    Yaw,
    /// Emergency stop switch. A level below 0.5 means "stop".
    Aux1,
    Aux2,
    Aux3,
}

/// Flight modes, in cascade order from the outermost loop to the raw outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightMode {
    #[default]
    Disarmed,
    Position,
    Velocity,
    Attitude,
    Rate,
    DirectControl,
    DirectPwm,
}

/// What the outer loops point the vehicle at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSelector {
    #[default]
    Goal,
    Direction,
    Velocity,
    Fixed,
}

/// Desired throttle and torque intent, each a bounded fraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorDesired {
    pub throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl ActuatorDesired {
    pub const fn zero() -> Self {
        Self {
            throttle: 0.0,
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }
}

/// The control blackboard: what the cascade is asked to do this cycle and
/// what it produced. Angles are in radians, rates in radians per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlReference {
    pub mode: FlightMode,
    pub target: TargetSelector,
    pub attitude_reference: PitchRoll,
    pub rate_reference: PitchRollYaw,
    pub actuator_desired: ActuatorDesired,
    /// Final bounded fraction per output channel.
    pub pwm_out: [f32; OUTPUT_CHANNELS],
}

impl ControlReference {
    pub const fn new() -> Self {
        Self {
            mode: FlightMode::Disarmed,
            target: TargetSelector::Goal,
            attitude_reference: PitchRoll::zero(),
            rate_reference: PitchRollYaw::zero(),
            actuator_desired: ActuatorDesired::zero(),
            pwm_out: [0.0; OUTPUT_CHANNELS],
        }
    }
}

impl Default for ControlReference {
    fn default() -> Self {
        Self::new()
    }
}
