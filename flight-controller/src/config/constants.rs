use crate::drivers::record_flash::RecordId;

// Arming supervisor
pub const ARM_RATE_HZ: u32 = 10;
pub const EMERGENCY_STOP_LEVEL: f32 = 0.5;

// Estimator trigger period, the control cascade runs once per estimate
pub const ESTIMATION_RATE_HZ: u32 = 400;
pub const ESTIMATION_DT: f32 = 1.0 / ESTIMATION_RATE_HZ as f32;

// Rate stage gyro smoothing
pub const RATE_FILTER_ALPHA: f32 = 0.2;

pub const DEG2RAD: f32 = core::f32::consts::PI / 180.0;

// Persisted records
pub const ARM_SETTINGS_RECORD: RecordId = RecordId::new(*b"CONA");
pub const CONTROLLER_PARAMETERS_RECORD: RecordId = RecordId::new(*b"CONP");
pub const CONTROL_LIMITS_RECORD: RecordId = RecordId::new(*b"CONL");
pub const OUTPUT_MIXER_RECORD: RecordId = RecordId::new(*b"CONM");
pub const RECORD_VERSION: u8 = 1;

// Flash layout, one page per record tag
pub const FLASH_RECORDS_ADDR: u32 = 0x9000;
pub const FLASH_PAGE_SIZE: usize = 256;
pub const RECORD_TAGS: [RecordId; 4] = [
    ARM_SETTINGS_RECORD,
    CONTROLLER_PARAMETERS_RECORD,
    CONTROL_LIMITS_RECORD,
    OUTPUT_MIXER_RECORD,
];
