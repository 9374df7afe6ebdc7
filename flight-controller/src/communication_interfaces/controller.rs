use shared_definitions::controller::InputRole;

/// Normalized radio input. Implementations own the sampling and scaling of
/// the raw receiver frames.
pub trait RemoteControl {
    fn has_active_link(&self) -> bool;

    /// Level of the channel mapped to `role`, `[-1, 1]` for sticks and
    /// switches, `[0, 1]` for throttle.
    fn channel_level(&self, role: InputRole) -> f32;
}

/// One consistent read of every channel the core looks at.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ChannelLevels {
    pub throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub emergency_stop: f32,
}

impl ChannelLevels {
    pub fn sample(remote: &impl RemoteControl) -> Self {
        Self {
            throttle: remote.channel_level(InputRole::Throttle),
            pitch: remote.channel_level(InputRole::Pitch),
            roll: remote.channel_level(InputRole::Roll),
            yaw: remote.channel_level(InputRole::Yaw),
            emergency_stop: remote.channel_level(InputRole::Aux1),
        }
    }
}
