//! Host stand-ins for the hardware collaborators: radio, estimator, PWM
//! outputs, flash and the armed LED.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_time::{Duration, Ticker};
use embedded_storage::{ReadStorage, Storage};
use shared_definitions::{config::OUTPUT_CHANNELS, controller::InputRole};

use crate::{
    communication_interfaces::controller::RemoteControl,
    config::constants::ESTIMATION_RATE_HZ,
    control::{arming::StatusIndicator, control_loops::AttitudeEstimate},
    output::motors_state_manager::OutputBoundary,
    shared_core_values::{AtomicF32, SharedState},
    util::error::InitError,
};

const RAM_FLASH_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamFlashError {
    OutOfBounds,
    WriteProtected,
}

/// Byte-addressable flash image, erased to `0xFF`.
pub struct RamFlash {
    memory: Vec<u8>,
    write_protected: bool,
}

impl RamFlash {
    pub fn new() -> Self {
        Self {
            memory: vec![0xFF; RAM_FLASH_SIZE],
            write_protected: false,
        }
    }

    /// Flips every bit of the byte at `offset`.
    pub fn corrupt(&mut self, offset: usize) {
        if let Some(byte) = self.memory.get_mut(offset) {
            *byte = !*byte;
        }
    }

    pub fn set_write_protected(&mut self, protected: bool) {
        self.write_protected = protected;
    }

    fn range(&self, offset: u32, length: usize) -> Result<core::ops::Range<usize>, RamFlashError> {
        let start = offset as usize;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= self.memory.len())
            .ok_or(RamFlashError::OutOfBounds)?;
        Ok(start..end)
    }
}

impl Default for RamFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStorage for RamFlash {
    type Error = RamFlashError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.memory[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.memory.len()
    }
}

impl Storage for RamFlash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.write_protected {
            return Err(RamFlashError::WriteProtected);
        }
        let range = self.range(offset, bytes.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }
}

/// Radio whose link and channel levels are set by the host.
pub struct SimulatedRadio {
    link: AtomicBool,
    throttle: AtomicF32,
    pitch: AtomicF32,
    roll: AtomicF32,
    yaw: AtomicF32,
    aux: [AtomicF32; 3],
}

impl SimulatedRadio {
    /// Link up, sticks centered, throttle down, emergency stop released.
    pub const fn new() -> Self {
        Self {
            link: AtomicBool::new(true),
            throttle: AtomicF32::new(0.0),
            pitch: AtomicF32::new(0.0),
            roll: AtomicF32::new(0.0),
            yaw: AtomicF32::new(0.0),
            aux: [AtomicF32::new(1.0), AtomicF32::new(0.0), AtomicF32::new(0.0)],
        }
    }

    pub fn set_link(&self, active: bool) {
        self.link.store(active, Ordering::Relaxed);
    }

    pub fn set_level(&self, role: InputRole, level: f32) {
        self.channel(role).store(level, Ordering::Relaxed);
    }

    fn channel(&self, role: InputRole) -> &AtomicF32 {
        match role {
            InputRole::Throttle => &self.throttle,
            InputRole::Pitch => &self.pitch,
            InputRole::Roll => &self.roll,
            InputRole::Yaw => &self.yaw,
            InputRole::Aux1 => &self.aux[0],
            InputRole::Aux2 => &self.aux[1],
            InputRole::Aux3 => &self.aux[2],
        }
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteControl for SimulatedRadio {
    fn has_active_link(&self) -> bool {
        self.link.load(Ordering::Relaxed)
    }

    fn channel_level(&self, role: InputRole) -> f32 {
        self.channel(role).load(Ordering::Relaxed)
    }
}

/// Output boundary that remembers the last value of every channel.
pub struct RecordingOutputs {
    channels: [f32; OUTPUT_CHANNELS],
    writes: usize,
    fail_init: bool,
}

impl RecordingOutputs {
    pub fn new() -> Self {
        Self {
            channels: [0.0; OUTPUT_CHANNELS],
            writes: 0,
            fail_init: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::new()
        }
    }

    pub fn channels(&self) -> [f32; OUTPUT_CHANNELS] {
        self.channels
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Default for RecordingOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBoundary for RecordingOutputs {
    fn init(&mut self) -> Result<(), InitError> {
        if self.fail_init {
            return Err(InitError::OutputInit("simulated output failure"));
        }
        log::debug!("Simulated outputs ready");
        Ok(())
    }

    fn set_channel(&mut self, index: usize, fraction: f32) {
        if let Some(channel) = self.channels.get_mut(index) {
            *channel = fraction;
            self.writes += 1;
            log::trace!("PWM {} = {:.3}", index, fraction);
        }
    }
}

/// Armed LED that only writes to the log.
#[derive(Default)]
pub struct LogIndicator {
    armed: bool,
}

impl StatusIndicator for LogIndicator {
    fn set_armed(&mut self, armed: bool) {
        if armed != self.armed {
            self.armed = armed;
            log::info!("Armed LED {}", if armed { "on" } else { "off" });
        }
    }
}

/// Publishes a level, motionless estimate at the estimator rate.
pub async fn run_simulated_estimator(shared: &SharedState) -> ! {
    let mut ticker = Ticker::every(Duration::from_hz(ESTIMATION_RATE_HZ as u64));
    loop {
        shared.new_estimate.signal(AttitudeEstimate::default());
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_flash_rejects_out_of_range_access() {
        let mut flash = RamFlash::new();
        let mut buffer = [0_u8; 8];
        assert_eq!(
            flash.read(RAM_FLASH_SIZE as u32 - 4, &mut buffer),
            Err(RamFlashError::OutOfBounds)
        );
    }

    #[test]
    fn write_protected_flash_fails_writes() {
        let mut flash = RamFlash::new();
        flash.set_write_protected(true);
        assert_eq!(flash.write(0, &[1, 2]), Err(RamFlashError::WriteProtected));
    }

    #[test]
    fn radio_reports_set_levels() {
        let radio = SimulatedRadio::new();
        radio.set_level(InputRole::Yaw, -0.85);
        radio.set_link(false);

        assert_eq!(radio.channel_level(InputRole::Yaw), -0.85);
        assert_eq!(radio.channel_level(InputRole::Aux1), 1.0);
        assert!(!radio.has_active_link());
    }
}
