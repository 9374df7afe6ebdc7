use shared_definitions::config::PiGains;

/// Integral state of one PI loop. Gains live in the shared parameter set and
/// are passed in on every update, so retuning never touches the accumulator.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PiController {
    accumulated: f32,
}

impl PiController {
    pub const fn new() -> Self {
        PiController { accumulated: 0.0 }
    }

    /// Unconditional integration, saturation is left to the consumer.
    pub fn update(&mut self, gains: &PiGains, error: f32, iteration_time: f32) -> f32 {
        self.accumulated += gains.integral * error * iteration_time;
        gains.proportional * error + self.accumulated
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}
