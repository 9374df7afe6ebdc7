use embassy_executor::{Executor, SpawnToken, Spawner};
use flight_controller::{
    config::store::ParameterStore,
    drivers::record_flash::FlashRecordStore,
    output::motors_state_manager::MotorsStateManager,
    shared_core_values::SharedState,
    simulation::{RamFlash, RecordingOutputs, SimulatedRadio},
    threads::{
        arming_thread, estimator_thread, flight_thread, ground_station_thread,
        parameter_store_thread, telemetry_thread,
    },
};
use log::LevelFilter;
use shared_definitions::status::FaultFlags;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use static_cell::StaticCell;

static EXECUTOR: StaticCell<Executor> = StaticCell::new();
static SHARED_STATE: StaticCell<SharedState> = StaticCell::new();
static RADIO: SimulatedRadio = SimulatedRadio::new();

fn log_level() -> LevelFilter {
    std::env::var("FLIGHT_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn spawn<S>(spawner: &Spawner, name: &str, token: SpawnToken<S>) {
    if let Err(error) = spawner.spawn(token) {
        log::error!("Failed to start {}: {:?}", name, error);
    }
}

fn main() {
    if let Err(error) = TermLogger::init(
        log_level(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Logger unavailable: {}", error);
    }

    log::info!("Running");
    let shared: &'static SharedState = SHARED_STATE.init(SharedState::new());

    let mut store = ParameterStore::new(FlashRecordStore::new(RamFlash::new()));
    let restored = store.restore_all(shared);
    log::info!("Restored {} parameter records", restored);

    let motors_manager = match MotorsStateManager::new(RecordingOutputs::new()) {
        Ok(manager) => manager,
        Err(error) => {
            log::error!("{}", error);
            shared.faults.raise(FaultFlags::OUTPUT_INIT);
            std::process::exit(1);
        }
    };

    let Some((armed, disarm_authority)) = shared.take_arming_handles() else {
        log::error!("Arming handles already taken");
        std::process::exit(1);
    };

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawn(&spawner, "estimator", estimator_thread(shared));
        spawn(&spawner, "arming supervisor", arming_thread(shared, armed, &RADIO));
        spawn(
            &spawner,
            "control cascade",
            flight_thread(shared, &RADIO, motors_manager),
        );
        spawn(&spawner, "parameter store", parameter_store_thread(shared, store));
        spawn(&spawner, "telemetry", telemetry_thread(shared));
        spawn(
            &spawner,
            "ground station",
            ground_station_thread(shared, &RADIO, disarm_authority),
        );
    })
}
