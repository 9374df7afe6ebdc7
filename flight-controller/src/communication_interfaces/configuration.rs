use shared_definitions::{
    config::{ArmSettings, ControlLimits, ControllerParameters, OutputMixer},
    controller::{ControlReference, FlightMode},
    status::FaultFlags,
};

use crate::shared_core_values::{DisarmAuthority, SharedState};

/// Read/write access for ground tools and telemetry. Every getter returns a
/// consistent copy, every setter replaces the whole structure.
#[derive(Clone, Copy)]
pub struct ConfigurationPort<'a> {
    shared: &'a SharedState,
}

impl<'a> ConfigurationPort<'a> {
    pub fn new(shared: &'a SharedState) -> Self {
        Self { shared }
    }

    pub fn arm_settings(&self) -> ArmSettings {
        self.shared.arm_settings.read()
    }

    pub fn set_arm_settings(&self, settings: ArmSettings) {
        log::debug!("Arm settings updated: {:?}", settings);
        self.shared.arm_settings.write(settings);
    }

    pub fn control_limits(&self) -> ControlLimits {
        self.shared.control_limits.read()
    }

    pub fn set_control_limits(&self, limits: ControlLimits) {
        log::debug!("Control limits updated: {:?}", limits);
        self.shared.control_limits.write(limits);
    }

    /// Gains only, integrator state is never exposed.
    pub fn controller_parameters(&self) -> ControllerParameters {
        self.shared.controller_parameters.read()
    }

    pub fn set_controller_parameters(&self, parameters: ControllerParameters) {
        log::debug!("Controller gains updated: {:?}", parameters);
        self.shared.controller_parameters.write(parameters);
    }

    pub fn output_mixer(&self) -> OutputMixer {
        self.shared.output_mixer.read()
    }

    pub fn set_output_mixer(&self, mixer: OutputMixer) {
        log::debug!("Output mixer updated");
        self.shared.output_mixer.write(mixer);
    }

    pub fn flight_mode_selector(&self) -> FlightMode {
        self.shared.flight_mode_selector.read()
    }

    pub fn set_flight_mode_selector(&self, mode: FlightMode) {
        log::info!("Flight mode selector set to {:?}", mode);
        self.shared.flight_mode_selector.write(mode);
    }

    /// Snapshot published by the last control cycle.
    pub fn control_reference(&self) -> ControlReference {
        self.shared.control_reference.read()
    }

    pub fn is_armed(&self) -> bool {
        self.shared.armed().is_armed()
    }

    pub fn faults(&self) -> FaultFlags {
        self.shared.faults.current()
    }

    /// Wakes the parameter store. Repeated requests before it runs collapse
    /// into one save.
    pub fn request_save(&self) {
        self.shared.save_request.signal(());
    }

    pub fn force_disarm(&self, authority: &DisarmAuthority<'_>) {
        authority.force_disarm();
    }
}
