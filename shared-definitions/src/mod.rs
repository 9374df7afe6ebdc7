#![no_std]

pub mod config;
pub mod controller;
pub mod status;
