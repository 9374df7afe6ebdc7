//! Fixed-layout little-endian codec for the persisted parameter records.
//!
//! The layouts are a versioned contract with the flash pages, field order and
//! sizes must not change without bumping `RECORD_VERSION`.

use byteorder::{ByteOrder, LittleEndian};
use shared_definitions::config::{
    ArmSettings, ControlLimits, ControllerParameters, OutputMixer, PiGains, PitchRoll,
    PitchRollYaw, StickDirection, OUTPUT_CHANNELS,
};

use crate::{
    config::constants::{
        ARM_SETTINGS_RECORD, CONTROLLER_PARAMETERS_RECORD, CONTROL_LIMITS_RECORD,
        OUTPUT_MIXER_RECORD,
    },
    drivers::record_flash::RecordId,
    util::error::RecordError,
};

pub const ARM_SETTINGS_SIZE: usize = 4 * 2 + 3;
pub const CONTROLLER_PARAMETERS_SIZE: usize = 4 * 2 * 5;
pub const CONTROL_LIMITS_SIZE: usize = 4 * 7;
pub const OUTPUT_MIXER_SIZE: usize = 4 * 4 * OUTPUT_CHANNELS;

pub trait Record: Sized {
    const ID: RecordId;
    const SIZE: usize;

    /// Writes exactly `SIZE` bytes to the start of `buffer`.
    fn encode(&self, buffer: &mut [u8]);

    fn decode(buffer: &[u8]) -> Result<Self, RecordError>;
}

struct RecordWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> RecordWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    fn f32(&mut self, value: f32) {
        LittleEndian::write_f32(&mut self.buffer[self.position..self.position + 4], value);
        self.position += 4;
    }

    fn u8(&mut self, value: u8) {
        self.buffer[self.position] = value;
        self.position += 1;
    }
}

struct RecordReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> RecordReader<'a> {
    fn new(buffer: &'a [u8], expected: usize) -> Result<Self, RecordError> {
        if buffer.len() != expected {
            return Err(RecordError::WrongLength {
                expected,
                found: buffer.len(),
            });
        }
        Ok(Self {
            buffer,
            position: 0,
        })
    }

    fn f32(&mut self, field: &'static str) -> Result<f32, RecordError> {
        let value = LittleEndian::read_f32(&self.buffer[self.position..self.position + 4]);
        self.position += 4;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(RecordError::InvalidValue(field))
        }
    }

    fn fraction(&mut self, field: &'static str) -> Result<f32, RecordError> {
        let value = self.f32(field)?;
        if (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(RecordError::InvalidValue(field))
        }
    }

    fn limit(&mut self, field: &'static str) -> Result<f32, RecordError> {
        let value = self.f32(field)?;
        if value >= 0.0 {
            Ok(value)
        } else {
            Err(RecordError::InvalidValue(field))
        }
    }

    fn u8(&mut self) -> u8 {
        let value = self.buffer[self.position];
        self.position += 1;
        value
    }
}

impl Record for ArmSettings {
    const ID: RecordId = ARM_SETTINGS_RECORD;
    const SIZE: usize = ARM_SETTINGS_SIZE;

    fn encode(&self, buffer: &mut [u8]) {
        let mut writer = RecordWriter::new(buffer);
        writer.f32(self.stick_threshold);
        writer.f32(self.armed_min_throttle);
        writer.u8(self.stick_direction as u8);
        writer.u8(self.arm_stick_time);
        writer.u8(self.arm_zero_throttle_timeout);
    }

    fn decode(buffer: &[u8]) -> Result<Self, RecordError> {
        let mut reader = RecordReader::new(buffer, Self::SIZE)?;
        let stick_threshold = reader.fraction("stick_threshold")?;
        let armed_min_throttle = reader.fraction("armed_min_throttle")?;
        let stick_direction = StickDirection::try_from(reader.u8())
            .map_err(|_| RecordError::InvalidValue("stick_direction"))?;
        Ok(ArmSettings {
            stick_threshold,
            armed_min_throttle,
            stick_direction,
            arm_stick_time: reader.u8(),
            arm_zero_throttle_timeout: reader.u8(),
        })
    }
}

impl Record for ControllerParameters {
    const ID: RecordId = CONTROLLER_PARAMETERS_RECORD;
    const SIZE: usize = CONTROLLER_PARAMETERS_SIZE;

    fn encode(&self, buffer: &mut [u8]) {
        let mut writer = RecordWriter::new(buffer);
        for gains in [
            self.attitude_pitch,
            self.attitude_roll,
            self.rate_pitch,
            self.rate_roll,
            self.rate_yaw,
        ] {
            writer.f32(gains.proportional);
            writer.f32(gains.integral);
        }
    }

    fn decode(buffer: &[u8]) -> Result<Self, RecordError> {
        let mut reader = RecordReader::new(buffer, Self::SIZE)?;
        let mut gains = [PiGains::default(); 5];
        for entry in gains.iter_mut() {
            entry.proportional = reader.f32("proportional gain")?;
            entry.integral = reader.f32("integral gain")?;
        }
        let [attitude_pitch, attitude_roll, rate_pitch, rate_roll, rate_yaw] = gains;
        Ok(ControllerParameters {
            attitude_pitch,
            attitude_roll,
            rate_pitch,
            rate_roll,
            rate_yaw,
        })
    }
}

impl Record for ControlLimits {
    const ID: RecordId = CONTROL_LIMITS_RECORD;
    const SIZE: usize = CONTROL_LIMITS_SIZE;

    fn encode(&self, buffer: &mut [u8]) {
        let mut writer = RecordWriter::new(buffer);
        writer.f32(self.max_angle.pitch);
        writer.f32(self.max_angle.roll);
        writer.f32(self.max_rate.pitch);
        writer.f32(self.max_rate.roll);
        writer.f32(self.max_rate.yaw);
        writer.f32(self.max_rate_attitude.pitch);
        writer.f32(self.max_rate_attitude.roll);
    }

    fn decode(buffer: &[u8]) -> Result<Self, RecordError> {
        let mut reader = RecordReader::new(buffer, Self::SIZE)?;
        Ok(ControlLimits {
            max_angle: PitchRoll {
                pitch: reader.limit("max_angle.pitch")?,
                roll: reader.limit("max_angle.roll")?,
            },
            max_rate: PitchRollYaw {
                pitch: reader.limit("max_rate.pitch")?,
                roll: reader.limit("max_rate.roll")?,
                yaw: reader.limit("max_rate.yaw")?,
            },
            max_rate_attitude: PitchRoll {
                pitch: reader.limit("max_rate_attitude.pitch")?,
                roll: reader.limit("max_rate_attitude.roll")?,
            },
        })
    }
}

impl Record for OutputMixer {
    const ID: RecordId = OUTPUT_MIXER_RECORD;
    const SIZE: usize = OUTPUT_MIXER_SIZE;

    fn encode(&self, buffer: &mut [u8]) {
        let mut writer = RecordWriter::new(buffer);
        for row in self.weights.iter() {
            for weight in row {
                writer.f32(*weight);
            }
        }
    }

    fn decode(buffer: &[u8]) -> Result<Self, RecordError> {
        let mut reader = RecordReader::new(buffer, Self::SIZE)?;
        let mut mixer = OutputMixer::default();
        for row in mixer.weights.iter_mut() {
            for weight in row.iter_mut() {
                *weight = reader.f32("mixer weight")?;
            }
        }
        Ok(mixer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<R: Record>(record: &R) -> [u8; 128] {
        let mut buffer = [0_u8; 128];
        record.encode(&mut buffer[..R::SIZE]);
        buffer
    }

    #[test]
    fn arm_settings_layout() {
        let settings = ArmSettings {
            stick_threshold: 0.1,
            armed_min_throttle: 0.05,
            stick_direction: StickDirection::YawMin,
            arm_stick_time: 2,
            arm_zero_throttle_timeout: 15,
        };
        let buffer = encoded(&settings);
        assert_eq!(&buffer[0..4], &0.1_f32.to_le_bytes());
        assert_eq!(&buffer[4..8], &0.05_f32.to_le_bytes());
        assert_eq!(&buffer[8..11], &[5, 2, 15]);
        assert_eq!(
            ArmSettings::decode(&buffer[..ArmSettings::SIZE]),
            Ok(settings)
        );
    }

    #[test]
    fn controller_parameters_keep_controller_order() {
        let parameters = ControllerParameters {
            attitude_pitch: PiGains::new(1.0, 2.0),
            attitude_roll: PiGains::new(3.0, 4.0),
            rate_pitch: PiGains::new(5.0, 6.0),
            rate_roll: PiGains::new(7.0, 8.0),
            rate_yaw: PiGains::new(9.0, 10.0),
        };
        let buffer = encoded(&parameters);
        for (index, expected) in (1..=10).enumerate() {
            let value = LittleEndian::read_f32(&buffer[index * 4..index * 4 + 4]);
            assert_eq!(value, expected as f32);
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(
            ControlLimits::decode(&[0_u8; 27]),
            Err(RecordError::WrongLength {
                expected: 28,
                found: 27
            })
        );
    }

    #[test]
    fn unknown_stick_direction_is_rejected() {
        let mut buffer = encoded(&ArmSettings::new());
        buffer[8] = 42;
        assert_eq!(
            ArmSettings::decode(&buffer[..ArmSettings::SIZE]),
            Err(RecordError::InvalidValue("stick_direction"))
        );
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let settings = ArmSettings {
            stick_threshold: 1.5,
            ..ArmSettings::new()
        };
        let buffer = encoded(&settings);
        assert_eq!(
            ArmSettings::decode(&buffer[..ArmSettings::SIZE]),
            Err(RecordError::InvalidValue("stick_threshold"))
        );
    }

    #[test]
    fn non_finite_mixer_weight_is_rejected() {
        let mut mixer = OutputMixer::default();
        mixer.weights[3][2] = f32::NAN;
        let buffer = encoded(&mixer);
        assert_eq!(
            OutputMixer::decode(&buffer[..OutputMixer::SIZE]),
            Err(RecordError::InvalidValue("mixer weight"))
        );
    }

    #[test]
    fn negative_limit_is_rejected() {
        let mut limits = ControlLimits::default();
        limits.max_rate.yaw = -10.0;
        let buffer = encoded(&limits);
        assert_eq!(
            ControlLimits::decode(&buffer[..ControlLimits::SIZE]),
            Err(RecordError::InvalidValue("max_rate.yaw"))
        );
    }
}
