#![cfg_attr(not(feature = "std"), no_std)]

pub mod communication_interfaces;
pub mod config;
pub mod control;
pub mod drivers;
pub mod output;
pub mod shared_core_values;
#[cfg(feature = "std")]
pub mod simulation;
#[cfg(feature = "std")]
pub mod threads;
pub mod util;

#[cfg(test)]
mod test_utils;
