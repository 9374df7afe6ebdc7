use shared_definitions::{
    config::{ArmSettings, ControlLimits, ControllerParameters, OutputMixer},
    status::FaultFlags,
};

use super::records::Record;
use crate::{
    config::constants::FLASH_PAGE_SIZE,
    drivers::record_flash::RecordStore,
    shared_core_values::{SharedState, Snapshot},
    util::error::{AppError, StoreError},
};

/// Moves the four parameter sets between the shared state and the record
/// store.
pub struct ParameterStore<S> {
    records: S,
}

impl<S: RecordStore> ParameterStore<S> {
    pub fn new(records: S) -> Self {
        ParameterStore { records }
    }

    pub fn into_inner(self) -> S {
        self.records
    }

    /// Startup load. Missing or invalid records leave the defaults in place.
    /// Returns how many records were restored.
    pub fn restore_all(&mut self, shared: &SharedState) -> usize {
        [
            self.restore::<ArmSettings>(&shared.arm_settings),
            self.restore::<ControllerParameters>(&shared.controller_parameters),
            self.restore::<ControlLimits>(&shared.control_limits),
            self.restore::<OutputMixer>(&shared.output_mixer),
        ]
        .into_iter()
        .filter(|restored| *restored)
        .count()
    }

    /// Writes every record. A failed record does not stop the others, the
    /// first failure is returned.
    pub fn persist_all(&mut self, shared: &SharedState) -> Result<(), AppError<StoreError>> {
        let results = [
            self.persist(&shared.arm_settings.read(), shared),
            self.persist(&shared.controller_parameters.read(), shared),
            self.persist(&shared.control_limits.read(), shared),
            self.persist(&shared.output_mixer.read(), shared),
        ];
        match results.into_iter().find_map(Result::err) {
            Some(error) => Err(AppError {
                message: "Parameter save incomplete",
                error,
            }),
            None => {
                log::info!("Parameters saved");
                Ok(())
            }
        }
    }

    fn restore<R: Record + Copy>(&mut self, target: &Snapshot<R>) -> bool {
        let mut buffer = [0_u8; FLASH_PAGE_SIZE];
        let length = match self.records.read_record(R::ID, &mut buffer) {
            Ok(length) => length,
            Err(StoreError::NotFound) => {
                log::warn!("Record {} not stored, keeping defaults", R::ID);
                return false;
            }
            Err(error) => {
                log::warn!("Record {} unreadable ({}), keeping defaults", R::ID, error);
                return false;
            }
        };

        match R::decode(&buffer[..length]) {
            Ok(record) => {
                target.write(record);
                log::info!("Restored record {}", R::ID);
                true
            }
            Err(error) => {
                log::warn!("Record {} invalid ({}), keeping defaults", R::ID, error);
                false
            }
        }
    }

    fn persist<R: Record>(&mut self, record: &R, shared: &SharedState) -> Result<(), StoreError> {
        let mut buffer = [0_u8; FLASH_PAGE_SIZE];
        let result = if R::SIZE > buffer.len() {
            Err(StoreError::RecordTooLarge {
                size: R::SIZE,
                max: buffer.len(),
            })
        } else {
            record.encode(&mut buffer[..R::SIZE]);
            self.records.write_record(R::ID, &buffer[..R::SIZE])
        };

        match result {
            Err(error @ StoreError::RecordTooLarge { .. }) => {
                log::error!("Record {} does not fit: {}", R::ID, error);
                shared.faults.raise(FaultFlags::RECORD_SIZE);
            }
            Err(error) => {
                log::error!("Record {} write failed: {}", R::ID, error);
                shared.faults.raise(FaultFlags::RECORD_WRITE);
            }
            Ok(()) => log::debug!("Record {} saved", R::ID),
        }
        result
    }
}

/// Waits for save requests and persists the current parameters. Requests
/// raised while a save is running coalesce into one more save.
pub async fn start_parameter_store<S: RecordStore>(
    shared: &SharedState,
    mut store: ParameterStore<S>,
) -> ! {
    log::info!("Parameter store waiting for save requests");
    loop {
        shared.save_request.wait().await;
        if let Err(error) = store.persist_all(shared) {
            log::error!("{}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::constants::{ARM_SETTINGS_RECORD, CONTROL_LIMITS_RECORD},
        drivers::record_flash::{FlashRecordStore, RecordId},
        simulation::RamFlash,
    };
    use shared_definitions::config::{PiGains, PitchRoll, StickDirection};

    fn tuned_state() -> SharedState {
        let state = SharedState::new();
        state.arm_settings.write(ArmSettings {
            stick_threshold: 0.1,
            armed_min_throttle: 0.05,
            stick_direction: StickDirection::YawMin,
            arm_stick_time: 2,
            arm_zero_throttle_timeout: 10,
        });
        state.controller_parameters.write(ControllerParameters {
            attitude_pitch: PiGains::new(4.0, 0.5),
            attitude_roll: PiGains::new(4.5, 0.25),
            rate_pitch: PiGains::new(0.02, 0.1),
            rate_roll: PiGains::new(0.03, 0.1),
            rate_yaw: PiGains::new(0.05, 0.2),
        });
        let mut limits = ControlLimits::default();
        limits.max_angle = PitchRoll {
            pitch: 30.0,
            roll: 30.0,
        };
        limits.max_rate.yaw = 180.0;
        state.control_limits.write(limits);
        let mut mixer = OutputMixer::default();
        mixer.weights[0] = [1.0, 1.0, -1.0, -1.0];
        mixer.weights[5] = [0.5, 0.0, 0.0, 0.25];
        state.output_mixer.write(mixer);
        state
    }

    #[test]
    fn persisted_parameters_restore_identically() {
        let source = tuned_state();
        let mut store = ParameterStore::new(FlashRecordStore::new(RamFlash::new()));
        store.persist_all(&source).unwrap();

        let restored = SharedState::new();
        assert_eq!(store.restore_all(&restored), 4);

        assert_eq!(restored.arm_settings.read(), source.arm_settings.read());
        assert_eq!(
            restored.controller_parameters.read(),
            source.controller_parameters.read()
        );
        assert_eq!(restored.control_limits.read(), source.control_limits.read());
        assert_eq!(restored.output_mixer.read(), source.output_mixer.read());
    }

    #[test]
    fn empty_flash_keeps_defaults() {
        let mut store = ParameterStore::new(FlashRecordStore::new(RamFlash::new()));
        let state = SharedState::new();

        assert_eq!(store.restore_all(&state), 0);
        assert_eq!(state.arm_settings.read(), ArmSettings::new());
    }

    #[test]
    fn invalid_record_keeps_default_and_others_restore() {
        let source = tuned_state();
        let mut records = FlashRecordStore::new(RamFlash::new());
        let mut store = ParameterStore::new(records);
        store.persist_all(&source).unwrap();
        records = store.into_inner();
        // Valid page, but the direction code is out of range
        let mut payload = [0_u8; 11];
        source.arm_settings.read().encode(&mut payload);
        payload[8] = 200;
        records.write_record(ARM_SETTINGS_RECORD, &payload).unwrap();
        let mut store = ParameterStore::new(records);

        let restored = SharedState::new();
        assert_eq!(store.restore_all(&restored), 3);
        assert_eq!(restored.arm_settings.read(), ArmSettings::new());
        assert_eq!(restored.control_limits.read(), source.control_limits.read());
    }

    struct RejectingStore {
        rejected: RecordId,
        error: StoreError,
    }

    impl RecordStore for RejectingStore {
        fn write_record(&mut self, id: RecordId, _data: &[u8]) -> Result<(), StoreError> {
            if id == self.rejected {
                Err(self.error)
            } else {
                Ok(())
            }
        }

        fn read_record(&mut self, _id: RecordId, _buffer: &mut [u8]) -> Result<usize, StoreError> {
            Err(StoreError::NotFound)
        }
    }

    #[test]
    fn oversized_record_latches_fatal_fault() {
        let state = tuned_state();
        let mut store = ParameterStore::new(RejectingStore {
            rejected: CONTROL_LIMITS_RECORD,
            error: StoreError::RecordTooLarge { size: 300, max: 244 },
        });

        let result = store.persist_all(&state);

        assert!(result.is_err());
        assert!(state.faults.current().contains(FaultFlags::RECORD_SIZE));
        assert!(state.faults.is_halted());
    }

    #[test]
    fn device_failure_is_not_fatal() {
        let state = tuned_state();
        let mut store = ParameterStore::new(RejectingStore {
            rejected: ARM_SETTINGS_RECORD,
            error: StoreError::Device("flash write failed"),
        });

        let result = store.persist_all(&state);

        assert_eq!(
            result.map_err(|error| error.error),
            Err(StoreError::Device("flash write failed"))
        );
        assert_eq!(state.faults.current(), FaultFlags::RECORD_WRITE);
        assert!(!state.faults.is_halted());
    }
}
