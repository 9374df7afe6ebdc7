pub mod constants;
pub mod records;
pub mod store;
