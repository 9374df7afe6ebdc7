/// Stick extreme that has to be held, with zero throttle, to arm. Holding the
/// opposite extreme disarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StickDirection {
    #[default]
    None = 0,
    PitchMin = 1,
    PitchMax = 2,
    RollMin = 3,
    RollMax = 4,
    YawMin = 5,
    YawMax = 6,
    ThrottleMin = 7,
    ThrottleMax = 8,
}

impl TryFrom<u8> for StickDirection {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StickDirection::None),
            1 => Ok(StickDirection::PitchMin),
            2 => Ok(StickDirection::PitchMax),
            3 => Ok(StickDirection::RollMin),
            4 => Ok(StickDirection::RollMax),
            5 => Ok(StickDirection::YawMin),
            6 => Ok(StickDirection::YawMax),
            7 => Ok(StickDirection::ThrottleMin),
            8 => Ok(StickDirection::ThrottleMax),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmSettings {
    /// Fraction of stick travel (0-1) counted as "at the extreme".
    pub stick_threshold: f32,
    /// Throttle floor applied while armed.
    pub armed_min_throttle: f32,
    pub stick_direction: StickDirection,
    /// Seconds the gesture must be held.
    pub arm_stick_time: u8,
    /// Seconds at zero throttle before an automatic disarm, 0 disables it.
    pub arm_zero_throttle_timeout: u8,
}

impl ArmSettings {
    pub const fn new() -> Self {
        Self {
            stick_threshold: 0.0,
            armed_min_throttle: 0.0,
            stick_direction: StickDirection::None,
            arm_stick_time: 5,
            arm_zero_throttle_timeout: 30,
        }
    }
}

impl Default for ArmSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchRoll {
    pub pitch: f32,
    pub roll: f32,
}

impl PitchRoll {
    pub const fn zero() -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchRollYaw {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl PitchRollYaw {
    pub const fn zero() -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }
}

/// Angles and rates are configured in degrees and degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlLimits {
    pub max_angle: PitchRoll,
    pub max_rate: PitchRollYaw,
    /// Bound on the rate reference produced by the attitude stage.
    pub max_rate_attitude: PitchRoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PiGains {
    pub proportional: f32,
    pub integral: f32,
}

impl PiGains {
    pub const fn new(proportional: f32, integral: f32) -> Self {
        Self {
            proportional,
            integral,
        }
    }
}

/// Gain-only view of every cascade controller, the part that gets persisted
/// and exchanged with ground tools.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerParameters {
    pub attitude_pitch: PiGains,
    pub attitude_roll: PiGains,
    pub rate_pitch: PiGains,
    pub rate_roll: PiGains,
    pub rate_yaw: PiGains,
}

pub const OUTPUT_CHANNELS: usize = 8;

/// Row per output channel, columns are throttle, pitch, roll, yaw weights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutputMixer {
    pub weights: [[f32; 4]; OUTPUT_CHANNELS],
}
