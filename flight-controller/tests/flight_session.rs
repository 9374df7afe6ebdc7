use flight_controller::{
    communication_interfaces::{
        configuration::ConfigurationPort,
        controller::{ChannelLevels, RemoteControl},
    },
    config::{constants::ESTIMATION_DT, store::ParameterStore},
    control::{
        arming::ArmingSupervisor,
        control_loops::{AttitudeEstimate, ControlCascade, MainControlLoopOutCommands},
    },
    drivers::record_flash::FlashRecordStore,
    output::motors_state_manager::MotorsStateManager,
    shared_core_values::SharedState,
    simulation::{RamFlash, RecordingOutputs, SimulatedRadio},
};
use shared_definitions::{
    config::{ArmSettings, OutputMixer, PiGains, StickDirection, OUTPUT_CHANNELS},
    controller::{FlightMode, InputRole},
    status::FaultFlags,
};

const ARM_TICKS: usize = 10;

fn configure(port: ConfigurationPort<'_>) {
    port.set_arm_settings(ArmSettings {
        stick_threshold: 0.1,
        armed_min_throttle: 0.05,
        stick_direction: StickDirection::YawMin,
        arm_stick_time: 1,
        arm_zero_throttle_timeout: 5,
    });
    let mut mixer = OutputMixer::default();
    for row in mixer.weights.iter_mut().take(4) {
        *row = [1.0, 0.0, 0.0, 0.0];
    }
    port.set_output_mixer(mixer);
}

struct Vehicle<'a> {
    shared: &'a SharedState,
    supervisor: ArmingSupervisor<'a>,
    cascade: ControlCascade,
    motors: MotorsStateManager<RecordingOutputs>,
}

impl<'a> Vehicle<'a> {
    fn new(shared: &'a SharedState) -> Self {
        let (armed, _) = shared.take_arming_handles().unwrap();
        Self {
            shared,
            supervisor: ArmingSupervisor::new(armed),
            cascade: ControlCascade::new(),
            motors: MotorsStateManager::new(RecordingOutputs::new()).unwrap(),
        }
    }

    fn arming_tick(&mut self, radio: &SimulatedRadio) -> bool {
        self.supervisor.tick(
            radio.has_active_link(),
            &ChannelLevels::sample(radio),
            &self.shared.arm_settings.read(),
            self.shared.faults.current(),
        )
    }

    fn control_cycle(&mut self, radio: &SimulatedRadio) {
        let command = self.cascade.update(
            self.shared,
            &ChannelLevels::sample(radio),
            &AttitudeEstimate::default(),
            ESTIMATION_DT,
        );
        match command {
            MainControlLoopOutCommands::KillMotors => self.motors.kill_motors(),
            MainControlLoopOutCommands::UpdateOutputs(values) => self.motors.set_motor_power(values),
        }
    }
}

#[test]
fn gesture_arms_flies_and_link_loss_stops_motors() {
    let shared = SharedState::new();
    configure(ConfigurationPort::new(&shared));
    let radio = SimulatedRadio::new();
    let mut vehicle = Vehicle::new(&shared);

    radio.set_level(InputRole::Yaw, -1.0);
    for _ in 1..ARM_TICKS {
        assert!(!vehicle.arming_tick(&radio));
    }
    assert!(vehicle.arming_tick(&radio));
    radio.set_level(InputRole::Yaw, 0.0);

    radio.set_level(InputRole::Throttle, 0.5);
    vehicle.arming_tick(&radio);
    vehicle.control_cycle(&radio);

    let channels = vehicle.motors.outputs().channels();
    assert_eq!(&channels[..4], &[0.5; 4]);
    assert_eq!(&channels[4..], &[0.0; 4]);
    assert_eq!(shared.control_reference.read().mode, FlightMode::Attitude);

    radio.set_link(false);
    assert!(!vehicle.arming_tick(&radio));
    vehicle.control_cycle(&radio);

    assert_eq!(vehicle.motors.outputs().channels(), [0.0; OUTPUT_CHANNELS]);
    assert_eq!(shared.control_reference.read().mode, FlightMode::Disarmed);
}

#[test]
fn armed_idle_applies_minimum_throttle() {
    let shared = SharedState::new();
    configure(ConfigurationPort::new(&shared));
    let radio = SimulatedRadio::new();
    let mut vehicle = Vehicle::new(&shared);

    radio.set_level(InputRole::Yaw, -1.0);
    for _ in 0..ARM_TICKS {
        vehicle.arming_tick(&radio);
    }
    radio.set_level(InputRole::Yaw, 0.0);
    vehicle.control_cycle(&radio);

    assert_eq!(&vehicle.motors.outputs().channels()[..4], &[0.05; 4]);
}

#[test]
fn emergency_stop_overrides_armed_flight() {
    let shared = SharedState::new();
    configure(ConfigurationPort::new(&shared));
    let radio = SimulatedRadio::new();
    let mut vehicle = Vehicle::new(&shared);

    radio.set_level(InputRole::Yaw, -1.0);
    for _ in 0..ARM_TICKS {
        vehicle.arming_tick(&radio);
    }
    radio.set_level(InputRole::Yaw, 0.0);
    radio.set_level(InputRole::Throttle, 0.7);
    radio.set_level(InputRole::Aux1, -1.0);

    assert!(!vehicle.arming_tick(&radio));
    vehicle.control_cycle(&radio);
    assert_eq!(vehicle.motors.outputs().channels(), [0.0; OUTPUT_CHANNELS]);
}

#[test]
fn fatal_fault_keeps_vehicle_on_the_ground() {
    let shared = SharedState::new();
    configure(ConfigurationPort::new(&shared));
    shared.faults.raise(FaultFlags::OUTPUT_INIT);
    let radio = SimulatedRadio::new();
    let mut vehicle = Vehicle::new(&shared);

    radio.set_level(InputRole::Yaw, -1.0);
    for _ in 0..3 * ARM_TICKS {
        assert!(!vehicle.arming_tick(&radio));
    }
}

#[test]
fn saved_parameters_survive_a_restart() {
    let shared = SharedState::new();
    let port = ConfigurationPort::new(&shared);
    configure(port);
    let mut parameters = port.controller_parameters();
    parameters.rate_roll = PiGains::new(0.04, 0.15);
    port.set_controller_parameters(parameters);

    let mut store = ParameterStore::new(FlashRecordStore::new(RamFlash::new()));
    store.persist_all(&shared).unwrap();
    let flash = store.into_inner().into_inner();

    let rebooted = SharedState::new();
    let mut store = ParameterStore::new(FlashRecordStore::new(flash));
    assert_eq!(store.restore_all(&rebooted), 4);

    let restored = ConfigurationPort::new(&rebooted);
    assert_eq!(restored.arm_settings(), port.arm_settings());
    assert_eq!(restored.controller_parameters(), parameters);
    assert_eq!(restored.output_mixer(), port.output_mixer());
    assert!(rebooted.faults.current().is_empty());
}
