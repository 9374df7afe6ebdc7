use bitflags::bitflags;

bitflags! {
    /// Latched fault reasons, cleared only by a reboot. Only the `FATAL` bits
    /// keep the vehicle disarmed with all outputs at zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FaultFlags: u8 {
        /// The actuation boundary failed to come up.
        const OUTPUT_INIT = 0b0000_0001;
        /// A persistence write was larger than a flash page.
        const RECORD_SIZE = 0b0000_0010;
        /// A persistence write failed on the device.
        const RECORD_WRITE = 0b0000_0100;
    }
}

impl FaultFlags {
    /// Faults that must stop actuation for good.
    pub const FATAL: FaultFlags = FaultFlags::OUTPUT_INIT.union(FaultFlags::RECORD_SIZE);

    pub fn is_fatal(&self) -> bool {
        self.intersects(Self::FATAL)
    }
}
