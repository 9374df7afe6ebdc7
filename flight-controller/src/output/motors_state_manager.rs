use shared_definitions::config::OUTPUT_CHANNELS;

use crate::util::error::InitError;

/// Actuation boundary: PWM/ESC driver behind eight channels.
pub trait OutputBoundary {
    fn init(&mut self) -> Result<(), InitError>;

    /// `fraction` is already bounded to `[-1, 1]`.
    fn set_channel(&mut self, index: usize, fraction: f32);
}

pub struct MotorsStateManager<B> {
    outputs: B,
    last_output: [f32; OUTPUT_CHANNELS],
    killed: bool,
}

impl<B: OutputBoundary> MotorsStateManager<B> {
    /// Brings the boundary up with every channel at zero. A failed init is
    /// fatal for the caller.
    pub fn new(mut outputs: B) -> Result<Self, InitError> {
        let init_result = outputs.init();
        let mut manager = MotorsStateManager {
            outputs,
            last_output: [0.0; OUTPUT_CHANNELS],
            killed: true,
        };
        manager.write_all([0.0; OUTPUT_CHANNELS]);
        init_result.map(|_| manager)
    }

    pub fn set_motor_power(&mut self, values: [f32; OUTPUT_CHANNELS]) {
        self.killed = false;
        self.write_all(values);
    }

    pub fn kill_motors(&mut self) {
        self.write_all([0.0; OUTPUT_CHANNELS]);
        if !self.killed {
            self.killed = true;
            log::info!("Killed motors");
        }
    }

    pub fn last_output(&self) -> [f32; OUTPUT_CHANNELS] {
        self.last_output
    }

    pub fn outputs(&self) -> &B {
        &self.outputs
    }

    fn write_all(&mut self, values: [f32; OUTPUT_CHANNELS]) {
        for (index, value) in values.into_iter().enumerate() {
            self.outputs.set_channel(index, value);
        }
        self.last_output = values;
    }
}
