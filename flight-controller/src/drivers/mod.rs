pub mod record_flash;
