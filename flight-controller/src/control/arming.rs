use embassy_time::{Duration, Ticker};
use shared_definitions::{
    config::{ArmSettings, StickDirection},
    status::FaultFlags,
};

use crate::{
    communication_interfaces::controller::{ChannelLevels, RemoteControl},
    config::constants::{ARM_RATE_HZ, EMERGENCY_STOP_LEVEL},
    shared_core_values::{ArmedWriter, SharedState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickRegion {
    Arm,
    Disarm,
    /// Neither gesture is being held.
    Neutral,
}

/// Which arming edge happened and why, for the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingCause {
    Gesture,
    ZeroThrottleTimeout,
    LinkLost,
    EmergencyStop,
    Fault,
    /// Configuration boundary request, never raised by the supervisor.
    Forced,
}

/// Driven by the supervisor every tick, e.g. the armed LED.
pub trait StatusIndicator {
    fn set_armed(&mut self, armed: bool);
}

pub fn classify(settings: &ArmSettings, levels: &ChannelLevels) -> StickRegion {
    if levels.throttle > settings.stick_threshold {
        return StickRegion::Neutral;
    }

    let (level, arm_at_min) = match settings.stick_direction {
        StickDirection::PitchMin => (levels.pitch, true),
        StickDirection::PitchMax => (levels.pitch, false),
        StickDirection::RollMin => (levels.roll, true),
        StickDirection::RollMax => (levels.roll, false),
        StickDirection::YawMin => (levels.yaw, true),
        StickDirection::YawMax => (levels.yaw, false),
        _ => return StickRegion::Neutral,
    };

    // Throttle spans half the range of the other sticks, double the margin
    let threshold = 1.0 - 2.0 * settings.stick_threshold;
    let (at_min, at_max) = (level <= -threshold, level >= threshold);

    match (arm_at_min, at_min, at_max) {
        (true, true, _) | (false, _, true) => StickRegion::Arm,
        (true, _, true) | (false, true, _) => StickRegion::Disarm,
        _ => StickRegion::Neutral,
    }
}

fn elapsed_seconds(ticks: u16) -> f32 {
    ticks as f32 / ARM_RATE_HZ as f32
}

/// Arm/disarm debounce state. The only writer of the armed flag.
pub struct ArmingSupervisor<'a> {
    armed: ArmedWriter<'a>,
    arm_ticks: u16,
    disarm_ticks: u16,
    timeout_ticks: u16,
}

impl<'a> ArmingSupervisor<'a> {
    pub fn new(armed: ArmedWriter<'a>) -> Self {
        Self {
            armed,
            arm_ticks: 0,
            disarm_ticks: 0,
            timeout_ticks: 0,
        }
    }

    /// Arm, disarm and timeout tick counters.
    pub fn counters(&self) -> (u16, u16, u16) {
        (self.arm_ticks, self.disarm_ticks, self.timeout_ticks)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_armed()
    }

    /// One supervisor period. Returns the armed state after the tick.
    pub fn tick(
        &mut self,
        link_active: bool,
        levels: &ChannelLevels,
        settings: &ArmSettings,
        faults: FaultFlags,
    ) -> bool {
        if faults.is_fatal() {
            self.force_disarmed(ArmingCause::Fault);
        } else if !link_active || settings.stick_direction == StickDirection::None {
            self.force_disarmed(ArmingCause::LinkLost);
        } else if levels.emergency_stop < EMERGENCY_STOP_LEVEL {
            self.force_disarmed(ArmingCause::EmergencyStop);
        } else {
            match classify(settings, levels) {
                StickRegion::Arm => {
                    self.arm_ticks = self.arm_ticks.saturating_add(1);
                    self.disarm_ticks = 0;
                    self.timeout_ticks = 0;
                    if elapsed_seconds(self.arm_ticks) >= settings.arm_stick_time as f32 {
                        self.arm();
                    }
                }
                StickRegion::Disarm => {
                    self.disarm_ticks = self.disarm_ticks.saturating_add(1);
                    self.arm_ticks = 0;
                    self.timeout_ticks = 0;
                    if elapsed_seconds(self.disarm_ticks) >= settings.arm_stick_time as f32 {
                        self.disarm(ArmingCause::Gesture);
                    }
                }
                StickRegion::Neutral => {
                    self.arm_ticks = 0;
                    self.disarm_ticks = 0;
                    if settings.arm_zero_throttle_timeout == 0
                        || levels.throttle > settings.stick_threshold
                    {
                        self.timeout_ticks = 0;
                    } else {
                        self.timeout_ticks = self.timeout_ticks.saturating_add(1);
                        if elapsed_seconds(self.timeout_ticks)
                            >= settings.arm_zero_throttle_timeout as f32
                        {
                            self.disarm(ArmingCause::ZeroThrottleTimeout);
                        }
                    }
                }
            }
        }

        self.armed.is_armed()
    }

    fn arm(&mut self) {
        if !self.armed.set(true) {
            log::info!("Armed ({:?})", ArmingCause::Gesture);
        }
    }

    fn disarm(&mut self, cause: ArmingCause) {
        if self.armed.set(false) {
            match cause {
                ArmingCause::LinkLost => log::warn!("Disarmed ({:?})", cause),
                _ => log::info!("Disarmed ({:?})", cause),
            }
        }
    }

    fn force_disarmed(&mut self, cause: ArmingCause) {
        self.arm_ticks = 0;
        self.disarm_ticks = 0;
        self.timeout_ticks = 0;
        self.disarm(cause);
    }
}

pub async fn start_arming_supervisor<R, I>(
    shared: &SharedState,
    armed: ArmedWriter<'_>,
    remote: &R,
    mut indicator: Option<I>,
) -> !
where
    R: RemoteControl,
    I: StatusIndicator,
{
    let mut supervisor = ArmingSupervisor::new(armed);
    let mut ticker = Ticker::every(Duration::from_hz(ARM_RATE_HZ as u64));
    log::info!("Arming supervisor running at {} Hz", ARM_RATE_HZ);

    loop {
        let levels = ChannelLevels::sample(remote);
        let armed = supervisor.tick(
            remote.has_active_link(),
            &levels,
            &shared.arm_settings.read(),
            shared.faults.current(),
        );
        if let Some(indicator) = indicator.as_mut() {
            indicator.set_armed(armed);
        }
        ticker.next().await;
    }
}
