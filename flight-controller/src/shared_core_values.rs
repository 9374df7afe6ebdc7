use core::{
    cell::Cell,
    sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
};

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    signal::Signal,
};
use shared_definitions::{
    config::{ArmSettings, ControlLimits, ControllerParameters, OutputMixer},
    controller::{ControlReference, FlightMode},
    status::FaultFlags,
};

use crate::control::{arming::ArmingCause, control_loops::AttitudeEstimate};

pub struct AtomicF32(AtomicU32);
impl AtomicF32 {
    pub const fn new(val: f32) -> Self {
        Self(AtomicU32::new(val.to_bits()))
    }
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }
    pub fn store(&self, val: f32, order: Ordering) {
        self.0.store(val.to_bits(), order)
    }
}

/// Copy-in/copy-out cell. Readers always see a whole value written by a
/// single `write`, never a mix of two.
pub struct Snapshot<T: Copy> {
    cell: Mutex<CriticalSectionRawMutex, Cell<T>>,
}

impl<T: Copy> Snapshot<T> {
    pub const fn new(value: T) -> Self {
        Self {
            cell: Mutex::new(Cell::new(value)),
        }
    }

    pub fn read(&self) -> T {
        self.cell.lock(|cell| cell.get())
    }

    pub fn write(&self, value: T) {
        self.cell.lock(|cell| cell.set(value))
    }
}

pub struct ArmedFlag(AtomicBool);

impl ArmedFlag {
    const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    fn load(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn swap(&self, armed: bool) -> bool {
        self.0.swap(armed, Ordering::AcqRel)
    }
}

/// The only handle that can arm. Owned by the arming supervisor.
pub struct ArmedWriter<'a>(&'a ArmedFlag);

impl<'a> ArmedWriter<'a> {
    pub fn is_armed(&self) -> bool {
        self.0.load()
    }

    /// Returns the previous state.
    pub fn set(&self, armed: bool) -> bool {
        self.0.swap(armed)
    }
}

#[derive(Clone, Copy)]
pub struct ArmedReader<'a>(&'a ArmedFlag);

impl<'a> ArmedReader<'a> {
    pub fn is_armed(&self) -> bool {
        self.0.load()
    }
}

/// Capability to disarm from outside the supervisor. Only one exists.
pub struct DisarmAuthority<'a>(&'a ArmedFlag);

impl<'a> DisarmAuthority<'a> {
    /// Clears the armed flag. The supervisor counters are left alone, so an
    /// arm gesture still being held re-arms on the next supervisor tick.
    pub fn force_disarm(&self) {
        if self.0.swap(false) {
            log::warn!("Disarmed ({:?})", ArmingCause::Forced);
        } else {
            log::warn!("Forced disarm requested while already disarmed");
        }
    }
}

/// Sticky fault bits, cleared only by a reboot.
pub struct FaultLatch(AtomicU8);

impl FaultLatch {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn raise(&self, fault: FaultFlags) {
        let previous =
            FaultFlags::from_bits_truncate(self.0.fetch_or(fault.bits(), Ordering::AcqRel));
        if !previous.contains(fault) {
            if fault.is_fatal() {
                log::error!("Fatal fault latched: {:?}, actuation halted", fault);
            } else {
                log::error!("Fault latched: {:?}", fault);
            }
        }
    }

    pub fn current(&self) -> FaultFlags {
        FaultFlags::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    pub fn is_halted(&self) -> bool {
        self.current().is_fatal()
    }
}

pub struct AtomicTelemetry {
    pub loop_exec_time_us: AtomicU32,
    pub control_cycles: AtomicU32,
    pub throttle: AtomicF32,
}

impl AtomicTelemetry {
    pub const fn new() -> Self {
        AtomicTelemetry {
            loop_exec_time_us: AtomicU32::new(0),
            control_cycles: AtomicU32::new(0),
            throttle: AtomicF32::new(0.0),
        }
    }
}

/// Everything the three tasks share. Lives in a `StaticCell` for the life of
/// the process.
pub struct SharedState {
    armed: ArmedFlag,
    arming_handles_taken: AtomicBool,
    pub faults: FaultLatch,
    pub arm_settings: Snapshot<ArmSettings>,
    pub control_limits: Snapshot<ControlLimits>,
    pub controller_parameters: Snapshot<ControllerParameters>,
    pub output_mixer: Snapshot<OutputMixer>,
    pub flight_mode_selector: Snapshot<FlightMode>,
    pub control_reference: Snapshot<ControlReference>,
    pub new_estimate: Signal<CriticalSectionRawMutex, AttitudeEstimate>,
    pub save_request: Signal<CriticalSectionRawMutex, ()>,
    pub telemetry: AtomicTelemetry,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            armed: ArmedFlag::new(),
            arming_handles_taken: AtomicBool::new(false),
            faults: FaultLatch::new(),
            arm_settings: Snapshot::new(ArmSettings::new()),
            control_limits: Snapshot::new(ControlLimits::default()),
            controller_parameters: Snapshot::new(ControllerParameters::default()),
            output_mixer: Snapshot::new(OutputMixer::default()),
            flight_mode_selector: Snapshot::new(FlightMode::Attitude),
            control_reference: Snapshot::new(ControlReference::new()),
            new_estimate: Signal::new(),
            save_request: Signal::new(),
            telemetry: AtomicTelemetry::new(),
        }
    }

    /// Hands out the armed writer and the disarm capability. Succeeds once.
    pub fn take_arming_handles(&self) -> Option<(ArmedWriter<'_>, DisarmAuthority<'_>)> {
        if self.arming_handles_taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((ArmedWriter(&self.armed), DisarmAuthority(&self.armed)))
    }

    pub fn armed(&self) -> ArmedReader<'_> {
        ArmedReader(&self.armed)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
