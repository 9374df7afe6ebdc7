pub mod configuration;
pub mod controller;
